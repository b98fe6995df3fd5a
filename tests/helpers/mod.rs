#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use carrel::enrich::{EnrichError, Enricher};

/// A throwaway workspace laid out the way the commands expect it.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn cards_dir(&self) -> PathBuf {
        self.root().join("cards")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root().join("zotero").join("library.json")
    }

    pub fn profile_path(&self) -> PathBuf {
        self.root().join("MY_RESEARCH.md")
    }

    /// Writes the snapshot file from a JSON array of items.
    pub fn write_snapshot(&self, items: &serde_json::Value) {
        let path = self.snapshot_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string_pretty(items).unwrap()).unwrap();
    }

    pub fn write_profile(&self, text: &str) {
        fs::write(self.profile_path(), text).unwrap();
    }
}

/// One snapshot item in the exporter's JSON shape.
pub fn bib_item(key: &str, title: &str, abstract_text: &str, keywords: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "id": key,
        "title": title,
        "abstract": abstract_text,
        "keyword": keywords,
        "author": [{"family": "Cuijpers", "given": "Pim"}],
        "issued": {"date-parts": [[2024]]},
        "container-title": "Journal of Anxiety Research",
        "DOI": format!("10.1000/{key}"),
    })
}

/// A research profile whose bullet list yields a known keyword set.
pub const TEST_PROFILE: &str = "\
# My Research

I study how AI exposure shapes anxiety in working adults.

## Key Variables
- anxiety, depression
- artificial intelligence / automation
- meta-analysis
- intervention
- mental health
";

/// Provider double that always replies with the same payload.
pub struct CannedEnricher {
    pub reply: String,
}

impl CannedEnricher {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
        }
    }
}

#[async_trait]
impl Enricher for CannedEnricher {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, EnrichError> {
        Ok(self.reply.clone())
    }
}

/// Provider double whose every call fails.
pub struct FailingEnricher;

#[async_trait]
impl Enricher for FailingEnricher {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, EnrichError> {
        Err(EnrichError::BadPayload("canned failure".to_string()))
    }
}
