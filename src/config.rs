use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CarrelConfig {
    pub workspace: WorkspaceConfig,
    pub sync: SyncConfig,
    pub enrich: EnrichConfig,
    pub cite: CiteConfig,
    pub screen: ScreenConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace root; holds the snapshot, profile, card store and indexes.
    pub root: String,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds to pause between enrichment calls.
    pub pause_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EnrichConfig {
    /// `claude` or `openai`.
    pub provider: String,
    pub claude_model: String,
    pub openai_model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CiteConfig {
    pub max_paragraphs: usize,
    pub min_relevance: f64,
    pub evidence_sentences: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScreenConfig {
    pub batch_size: usize,
}

impl Default for CarrelConfig {
    fn default() -> Self {
        Self {
            workspace: WorkspaceConfig::default(),
            sync: SyncConfig::default(),
            enrich: EnrichConfig::default(),
            cite: CiteConfig::default(),
            screen: ScreenConfig::default(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        let root = dirs::home_dir()
            .map(|h| h.join("Carrel"))
            .unwrap_or_else(|| PathBuf::from("Carrel"))
            .to_string_lossy()
            .into_owned();
        Self {
            root,
            log_level: "info".into(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { pause_secs: 1 }
    }
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            provider: "claude".into(),
            claude_model: "claude-sonnet-4-20250514".into(),
            openai_model: "gpt-4o-mini".into(),
            max_tokens: 2000,
            timeout_secs: 60,
        }
    }
}

impl Default for CiteConfig {
    fn default() -> Self {
        Self {
            max_paragraphs: 12,
            min_relevance: 0.0,
            evidence_sentences: 2,
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self { batch_size: 10 }
    }
}

/// Returns `~/.carrel/`
pub fn default_carrel_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".carrel")
}

/// Returns the default config file path: `~/.carrel/config.toml`
pub fn default_config_path() -> PathBuf {
    default_carrel_dir().join("config.toml")
}

impl CarrelConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            CarrelConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (CARREL_ROOT, CARREL_LOG_LEVEL,
    /// CARREL_LLM_PROVIDER).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CARREL_ROOT") {
            self.workspace.root = val;
        }
        if let Ok(val) = std::env::var("CARREL_LOG_LEVEL") {
            self.workspace.log_level = val;
        }
        if let Ok(val) = std::env::var("CARREL_LLM_PROVIDER") {
            self.enrich.provider = val;
        }
    }

    /// Resolve the workspace root, expanding `~` if needed.
    pub fn root(&self) -> PathBuf {
        expand_tilde(&self.workspace.root)
    }

    /// The reference-manager export the synchronizer reads.
    pub fn snapshot_path(&self) -> PathBuf {
        self.root().join("zotero").join("library.json")
    }

    /// The research-profile markdown file.
    pub fn profile_path(&self) -> PathBuf {
        self.root().join("MY_RESEARCH.md")
    }

    /// The card store directory.
    pub fn cards_dir(&self) -> PathBuf {
        self.root().join("cards")
    }

    /// Where paragraph banks land.
    pub fn sections_dir(&self) -> PathBuf {
        self.root().join("sections")
    }

    /// Where screening reports land.
    pub fn screening_dir(&self) -> PathBuf {
        self.root().join("screening")
    }

    /// Optional dotenv file holding provider API keys.
    pub fn secrets_path(&self) -> PathBuf {
        self.root().join("secrets").join(".env")
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
