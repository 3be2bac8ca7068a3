use rand::Rng;

const POLLINATIONS_BASE: &str = "https://image.pollinations.ai/prompt";

/// Image URL for a prompt. The image is rendered lazily by the provider when
/// the URL is first fetched.
pub fn pollinations_url(prompt: &str, seed: u32) -> String {
    format!(
        "{POLLINATIONS_BASE}/{}?width=1024&height=1024&nologo=true&model=flux&seed={seed}",
        urlencoding::encode(prompt)
    )
}

pub fn random_seed() -> u32 {
    rand::rng().random_range(0..1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_percent_encoded() {
        let url = pollinations_url("neon sea & moon", 42);
        assert_eq!(
            url,
            "https://image.pollinations.ai/prompt/neon%20sea%20%26%20moon?width=1024&height=1024&nologo=true&model=flux&seed=42"
        );
    }

    #[test]
    fn seeds_stay_in_range() {
        for _ in 0..100 {
            assert!(random_seed() < 1000);
        }
    }
}
