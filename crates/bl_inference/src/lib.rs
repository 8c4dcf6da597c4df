use bl_core::config::DEFAULT_PROMPT_REFERENCE_CHARS;

pub mod models;
pub mod prompt;
pub mod rewriter;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential for the completion endpoint. `None` selects the
    /// pass-through model.
    pub api_key: Option<String>,
    pub model_name: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub prompt_reference_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            prompt_reference_chars: DEFAULT_PROMPT_REFERENCE_CHARS,
        }
    }
}

impl Config {
    /// Blank keys count as no key at all.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::rewriter::{RewriteOutcome, Rewriter};
    pub use super::Config;
    pub use bl_core::{Article, ReferenceDocument, Result, Error};
}

pub use models::create_model;
pub use rewriter::{RewriteOutcome, Rewriter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_api_key_is_none() {
        assert!(Config::default().with_api_key(Some("  ".to_string())).api_key.is_none());
        assert_eq!(
            Config::default().with_api_key(Some("sk-test".to_string())).api_key.as_deref(),
            Some("sk-test")
        );
    }
}
