use async_trait::async_trait;
use bl_core::{Article, Error, ReferenceDocument, Result, RewriteModel};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::prompt::{build_rewrite_prompt, SYSTEM_PROMPT};
use crate::Config;

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Chat-completion backed rewriting (OpenAI-compatible endpoint).
pub struct OpenAiModel {
    client: Client,
    api_key: String,
    config: Config,
}

impl OpenAiModel {
    pub fn new(config: Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("Completion API key is required".to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.config.model_name)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

#[async_trait]
impl RewriteModel for OpenAiModel {
    fn name(&self) -> &str {
        &self.config.model_name
    }

    async fn rewrite(&self, article: &Article, references: &[ReferenceDocument]) -> Result<String> {
        let prompt = build_rewrite_prompt(article, references, self.config.prompt_reference_chars);

        let request = ChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![
                ChatMessage::new("system", SYSTEM_PROMPT),
                ChatMessage::new("user", prompt),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Requesting rewrite of '{}' from {}", article.title, self.config.model_name);
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Inference("Completion response contained no choices".to_string()))
    }
}
