//! Research profile and scoring vocabulary.
//!
//! The profile is a hand-written markdown file describing the research
//! questions. Its `- ` bullet lines are tokenized into scoring keywords and
//! unioned with a fixed baseline vocabulary, so scoring works on day one and
//! sharpens as the profile grows. The keyword set is recomputed on every run
//! and passed explicitly to the scorer.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Vocabulary used even when the profile file is missing or sparse.
pub const BASELINE_KEYWORDS: [&str; 17] = [
    "anxiety",
    "depression",
    "mood",
    "cbt",
    "act",
    "mindfulness",
    "automation",
    "artificial intelligence",
    "technological unemployment",
    "meaning",
    "purpose",
    "identity",
    "existential",
    "art therapy",
    "creative",
    "well-being",
    "flow",
];

/// The loaded profile: raw text for the enrichment prompt plus the derived
/// scoring vocabulary.
#[derive(Debug, Clone)]
pub struct ResearchProfile {
    /// Raw profile markdown (empty when the file is missing).
    pub text: String,
    /// Lowercased keyword set, sorted for deterministic iteration.
    pub keywords: BTreeSet<String>,
}

impl ResearchProfile {
    /// Baseline-only profile, used when no profile file exists.
    pub fn baseline() -> Self {
        Self::from_text("")
    }

    /// Derives the keyword set from profile markdown.
    ///
    /// Only `- ` bullet lines contribute: each is case-folded and split on
    /// `, / → ( ) -`; tokens longer than two characters that contain an
    /// ASCII letter are kept.
    pub fn from_text(text: &str) -> Self {
        let mut keywords: BTreeSet<String> =
            BASELINE_KEYWORDS.iter().map(|k| k.to_string()).collect();
        let lowered = text.to_lowercase();
        for line in lowered.lines() {
            let Some(bullet) = line.trim().strip_prefix("- ") else {
                continue;
            };
            for token in bullet.split(is_separator) {
                let token = token.trim();
                if token.chars().count() > 2 && token.chars().any(|c| c.is_ascii_lowercase()) {
                    keywords.insert(token.to_string());
                }
            }
        }
        Self {
            text: text.to_string(),
            keywords,
        }
    }

    /// Loads the profile file; a missing file falls back to the baseline.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::from_text(&text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no profile file, using baseline keywords");
                Ok(Self::baseline())
            }
            Err(e) => {
                Err(e).with_context(|| format!("cannot read profile {}", path.display()))
            }
        }
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | '/' | '→' | '(' | ')' | '-')
}
