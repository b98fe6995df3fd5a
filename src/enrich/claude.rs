//! Anthropic messages-API enricher.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{EnrichError, Enricher};
use crate::config::EnrichConfig;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

pub struct ClaudeEnricher {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeEnricher {
    pub fn new(config: &EnrichConfig) -> Result<Self, EnrichError> {
        let api_key =
            std::env::var(API_KEY_VAR).map_err(|_| EnrichError::MissingCredentials {
                provider: "claude",
                env_var: API_KEY_VAR,
            })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key,
            model: config.claude_model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl Enricher for ClaudeEnricher {
    fn name(&self) -> &'static str {
        "claude"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, EnrichError> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(EnrichError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| EnrichError::BadPayload(e.to_string()))?;
        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| EnrichError::BadPayload("reply carried no text block".to_string()))
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}
