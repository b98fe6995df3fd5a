//! Optional paper enrichment through a hosted analysis provider.
//!
//! Provides the [`Enricher`] trait with Anthropic and OpenAI implementations,
//! created via [`create_enricher`] from configuration. Enrichment is strictly
//! best-effort: every failure mode maps to an [`EnrichError`] that the
//! synchronizer downgrades to metadata-only mode, never a crash.

pub mod claude;
pub mod openai;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::EnrichConfig;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("no API key in {env_var} for provider {provider}")]
    MissingCredentials {
        provider: &'static str,
        env_var: &'static str,
    },
    #[error("unknown enrichment provider: {0}. Supported: claude, openai")]
    UnknownProvider(String),
    #[error("enrichment request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("provider payload was not the expected shape: {0}")]
    BadPayload(String),
}

/// A text-completion provider used to analyze papers.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Provider name for logs and reports.
    fn name(&self) -> &'static str;

    /// One-shot completion: system prompt + user prompt in, text out.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, EnrichError>;
}

/// Create an enrichment provider from config.
///
/// Fails fast (without any network call) when the provider name is unknown
/// or its API-key environment variable is unset.
pub fn create_enricher(config: &EnrichConfig) -> Result<Box<dyn Enricher>, EnrichError> {
    match config.provider.as_str() {
        "claude" => Ok(Box::new(claude::ClaudeEnricher::new(config)?)),
        "openai" => Ok(Box::new(openai::OpenAiEnricher::new(config)?)),
        other => Err(EnrichError::UnknownProvider(other.to_string())),
    }
}

/// Structured paper analysis returned by the provider.
///
/// Every field is defaulted so a sparse reply still parses; the card
/// composer treats empty strings as fill-in placeholders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub key_claims: Vec<String>,
    pub main_finding: String,
    pub method_type: String,
    pub sample_size: String,
    pub population: String,
    pub design: String,
    pub measurement_tools: String,
    pub effect_size: String,
    pub limitations: String,
    pub relevance_to_my_research: String,
    pub reading_priority: String,
    pub priority_reason: String,
    pub suggested_topic_tags: Vec<String>,
}

const ANALYSIS_SYSTEM_PROMPT: &str =
    "You are a psychology research assistant. Respond ONLY with valid JSON.";

/// How much profile / paper text goes into the analysis prompt.
const PROFILE_PROMPT_CHARS: usize = 1500;
const TEXT_PROMPT_CHARS: usize = 4000;

/// Ask the provider to analyze one paper's text against the research profile.
pub async fn analyze_paper(
    enricher: &dyn Enricher,
    text: &str,
    profile_text: &str,
) -> Result<Analysis, EnrichError> {
    let prompt = build_analysis_prompt(text, profile_text);
    let raw = enricher.complete(ANALYSIS_SYSTEM_PROMPT, &prompt).await?;
    let cleaned = strip_code_fences(&raw);
    debug!(provider = enricher.name(), bytes = cleaned.len(), "parsing analysis payload");
    serde_json::from_str(cleaned).map_err(|e| EnrichError::BadPayload(e.to_string()))
}

fn build_analysis_prompt(text: &str, profile_text: &str) -> String {
    format!(
        "Analyze this paper for my literature review and answer as JSON.\n\n\
         === RESEARCH PROFILE ===\n{}\n\n\
         === PAPER TEXT ===\n{}\n\n\
         JSON:\n\
         {{\"key_claims\":[\"claim1\",\"claim2\",\"claim3\"],\
         \"main_finding\":\"one-line summary\",\
         \"method_type\":\"RCT/meta/survey/etc\",\
         \"sample_size\":\"N=?\",\
         \"population\":\"who was studied\",\
         \"design\":\"between/within/etc\",\
         \"measurement_tools\":\"instruments\",\
         \"effect_size\":\"reported effect\",\
         \"limitations\":\"main limitation\",\
         \"relevance_to_my_research\":\"two sentences on the connection\",\
         \"reading_priority\":\"must-read/should-read/reference-only\",\
         \"priority_reason\":\"why\",\
         \"suggested_topic_tags\":[\"tag1\",\"tag2\"]}}",
        truncate_chars(profile_text, PROFILE_PROMPT_CHARS),
        truncate_chars(text, TEXT_PROMPT_CHARS),
    )
}

/// Char-safe prefix; prompts must never split a multibyte character.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Strips a surrounding markdown code fence from a provider reply.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let open = Regex::new(r"^```\w*\n?").expect("fence pattern is valid");
    let without_open = match open.find(trimmed) {
        Some(m) => &trimmed[m.end()..],
        None => return trimmed,
    };
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
