use oneiro_types::models::Language;

/// What the interpreter needs to know about a dream.
#[derive(Debug, Clone)]
pub struct DreamPrompt {
    pub title: String,
    pub description: String,
    pub mood: Option<String>,
    pub is_lucid: bool,
    pub language: Language,
}

fn target_language(language: Language) -> &'static str {
    match language {
        Language::Pt => "Portuguese (Brazil)",
        _ => "English",
    }
}

pub fn interpretation(dream: &DreamPrompt) -> String {
    let mood = dream.mood.as_deref().filter(|m| !m.trim().is_empty()).unwrap_or("Not specified");
    let lucid = if dream.is_lucid { "Yes" } else { "No" };

    format!(
        "Act as a professional psychologist and dream interpreter (Jungian approach).
Analyze the following dream.

Title: {title}
Description: {description}

Additional Context:
- Dreamer's Emotion: {mood}
- Was it a Lucid Dream?: {lucid}

TASK:
Provide a VERY concise interpretation (max 100 words).
1. Briefly interpret the dominant emotion.
2. Identify the meaning of key symbols.
3. Give one gentle, actionable advice.

IMPORTANT CONSTRAINTS:
- OUTPUT LANGUAGE: Respond strictly in {target}.
- FORMAT: Plain text, use emojis. Keep it short for a mobile app screen.",
        title = dream.title,
        description = dream.description,
        target = target_language(dream.language),
    )
}

pub fn tags(description: &str) -> String {
    format!(
        "Generate 3 to 5 single-word tags for this dream description. \
         Return ONLY the tags separated by commas, no other text. Dream: {description}"
    )
}

pub fn image(title: &str, description: &str) -> String {
    format!(
        "Based on this dream, write a concise but highly visual artistic prompt for an AI image generator.
Dream Title: {title}
Description: {description}
Return ONLY the prompt text, no explanations. Max 40 words.
Style keywords: Surrealism, Dreamcore, Ethereal, Digital Art."
    )
}

/// Message shown when the model answered with nothing usable.
pub fn empty_reply_message(language: Language) -> &'static str {
    match language {
        Language::Pt => "As brumas estão densas demais agora. Tente novamente.",
        _ => "The mists are too thick to see clearly right now. Please try again later.",
    }
}

/// Message shown when the model could not be reached at all.
pub fn unreachable_message(language: Language) -> &'static str {
    match language {
        Language::Pt => "Não foi possível conectar ao reino dos sonhos.",
        _ => "Could not connect to the dream realm.",
    }
}

/// Split a comma-separated model reply into trimmed, non-empty tags.
pub fn parse_tags(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
