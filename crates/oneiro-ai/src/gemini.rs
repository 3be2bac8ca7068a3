use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::prompts::{self, DreamPrompt};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

const FALLBACK_TAGS: [&str; 2] = ["Dream", "Mystery"];

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("model returned no text")]
    EmptyReply,
}

/// The generative operations the app relies on.
///
/// Only `interpret` reports failure; tags and image prompts degrade to fixed
/// fallbacks because callers always have something sensible to show.
#[async_trait]
pub trait Interpreter: Send + Sync + 'static {
    async fn interpret(&self, dream: &DreamPrompt) -> Result<String, AiError>;

    async fn generate_tags(&self, description: &str) -> Vec<String>;

    async fn image_prompt(&self, title: &str, description: &str) -> String;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn generate(&self, prompt: &str, config: Option<GenerationConfig>) -> Result<String, AiError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: config,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Gemini request");
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AiError::Status { status, message });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.text().ok_or(AiError::EmptyReply)
    }
}

#[async_trait]
impl Interpreter for GeminiClient {
    async fn interpret(&self, dream: &DreamPrompt) -> Result<String, AiError> {
        let config = GenerationConfig {
            temperature: 0.7,
            max_output_tokens: 200,
        };
        self.generate(&prompts::interpretation(dream), Some(config))
            .await
            .inspect_err(|e| error!("Gemini analysis error: {}", e))
    }

    async fn generate_tags(&self, description: &str) -> Vec<String> {
        match self.generate(&prompts::tags(description), None).await {
            Ok(reply) => {
                let tags = prompts::parse_tags(&reply);
                if tags.is_empty() { fallback_tags() } else { tags }
            }
            Err(e) => {
                warn!("Gemini tag generation failed, using defaults: {}", e);
                fallback_tags()
            }
        }
    }

    async fn image_prompt(&self, title: &str, description: &str) -> String {
        match self.generate(&prompts::image(title, description), None).await {
            Ok(prompt) => prompt,
            Err(e) => {
                error!("Image prompt error: {}", e);
                format!("Surreal dream art about {title}")
            }
        }
    }
}

fn fallback_tags() -> Vec<String> {
    FALLBACK_TAGS.iter().map(|t| t.to_string()).collect()
}
