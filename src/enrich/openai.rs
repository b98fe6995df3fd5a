//! OpenAI chat-completions enricher.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{EnrichError, Enricher};
use crate::config::EnrichConfig;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const API_KEY_VAR: &str = "OPENAI_API_KEY";

pub struct OpenAiEnricher {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiEnricher {
    pub fn new(config: &EnrichConfig) -> Result<Self, EnrichError> {
        let api_key =
            std::env::var(API_KEY_VAR).map_err(|_| EnrichError::MissingCredentials {
                provider: "openai",
                env_var: API_KEY_VAR,
            })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key,
            model: config.openai_model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl Enricher for OpenAiEnricher {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, EnrichError> {
        let body = json!({
            "model": self.model,
            "temperature": 0.2,
            "max_tokens": self.max_tokens,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
        });

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
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

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| EnrichError::BadPayload(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| EnrichError::BadPayload("reply carried no choices".to_string()))
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_fails_without_network() {
        std::env::remove_var(API_KEY_VAR);
        let err = OpenAiEnricher::new(&EnrichConfig::default()).err().unwrap();
        assert!(matches!(
            err,
            EnrichError::MissingCredentials { provider: "openai", .. }
        ));
    }

    #[test]
    fn reply_text_is_extracted_from_choices() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": "[]"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap();
        assert_eq!(text, "[]");
    }
}
