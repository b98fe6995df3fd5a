//! Core card type definitions.
//!
//! Defines [`ReadingPriority`] (the four reading-queue tiers), [`CardSource`]
//! (how a card's analysis fields were filled), [`CardHeader`] (the typed
//! frontmatter record), and [`CardRecord`] (a card as read from the store).

#![allow(dead_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reading-queue tier assigned to a paper card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingPriority {
    /// Core evidence for the argument; read in full.
    MustRead,
    /// Likely useful; read the results section at least.
    ShouldRead,
    /// Cite-only background material.
    ReferenceOnly,
    /// Not yet triaged.
    ToRead,
}

impl ReadingPriority {
    /// Frontmatter-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MustRead => "must-read",
            Self::ShouldRead => "should-read",
            Self::ReferenceOnly => "reference-only",
            Self::ToRead => "to-read",
        }
    }

    /// Section heading used by the priority index.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MustRead => "Must-Read",
            Self::ShouldRead => "Should-Read",
            Self::ReferenceOnly => "Reference-Only",
            Self::ToRead => "To-Read",
        }
    }

    /// All tiers in reading-queue order (most urgent first).
    pub fn ordered() -> [ReadingPriority; 4] {
        [
            Self::MustRead,
            Self::ShouldRead,
            Self::ToRead,
            Self::ReferenceOnly,
        ]
    }
}

impl Default for ReadingPriority {
    fn default() -> Self {
        Self::ToRead
    }
}

impl std::fmt::Display for ReadingPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReadingPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "must-read" => Ok(Self::MustRead),
            "should-read" => Ok(Self::ShouldRead),
            "reference-only" => Ok(Self::ReferenceOnly),
            "to-read" => Ok(Self::ToRead),
            _ => Err(format!("unknown reading priority: {s}")),
        }
    }
}

/// How the analysis fields of a card were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardSource {
    /// Filled by the enrichment provider.
    AiAnalyzed,
    /// Derived from snapshot metadata only; fill in after reading.
    MetadataOnly,
}

impl CardSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiAnalyzed => "ai-analyzed",
            Self::MetadataOnly => "metadata-only",
        }
    }
}

impl Default for CardSource {
    fn default() -> Self {
        Self::MetadataOnly
    }
}

impl std::fmt::Display for CardSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CardSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai-analyzed" => Ok(Self::AiAnalyzed),
            "metadata-only" => Ok(Self::MetadataOnly),
            _ => Err(format!("unknown card source: {s}")),
        }
    }
}

/// Typed frontmatter of a paper card.
///
/// Every field is optional in the file except `title`; absent fields parse to
/// their defaults. Keys the codec does not know are preserved verbatim in
/// [`extra`](Self::extra) so hand-added fields (volume, pages, custom notes)
/// survive a rewrite.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardHeader {
    /// Paper title as exported; the sanitized form doubles as the filename stem.
    pub title: String,
    /// One `Family, Given` entry per author.
    pub authors: Vec<String>,
    /// Publication year, or `"n.d."` when the export has no date.
    pub year: String,
    /// Journal or container title.
    pub journal: String,
    /// Bare DOI (no resolver prefix).
    pub doi: String,
    /// Study method (e.g. `meta-analysis`, `RCT`).
    pub method: String,
    /// Reported N.
    pub sample_size: String,
    /// Study population.
    pub population: String,
    /// Study design.
    pub design: String,
    /// Measurement instruments.
    pub measurement: String,
    /// Reported effect size.
    pub effect_size: String,
    /// Profile-relevance score in `[0.0, 100.0]`.
    pub relevance_score: f64,
    /// Reading-queue tier.
    pub reading_priority: ReadingPriority,
    /// Free-form tags; `topic:` / `m:` / `design:` prefixes carry facets.
    pub tags: Vec<String>,
    /// Reference-manager item key, if the export carried one.
    pub zotero_key: String,
    /// Card kind marker; the synchronizer always writes `quickcard`.
    pub card_type: String,
    /// ISO date the card was created.
    pub created: String,
    /// Whether the analysis fields came from the enrichment provider.
    pub source: CardSource,
    /// Unknown scalar keys, preserved in sorted order on rewrite.
    pub extra: BTreeMap<String, String>,
}

/// A card as read back from the store: filename stem, parsed header, body.
#[derive(Debug, Clone)]
pub struct CardRecord {
    /// Filename without the `.md` extension; unique within the store.
    pub stem: String,
    pub header: CardHeader,
    /// Markdown body below the closing frontmatter delimiter.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn priority_round_trips_through_strings() {
        for p in ReadingPriority::ordered() {
            assert_eq!(ReadingPriority::from_str(p.as_str()), Ok(p));
        }
    }

    #[test]
    fn priority_rejects_unknown_values() {
        assert!(ReadingPriority::from_str("someday").is_err());
    }

    #[test]
    fn priority_defaults_to_to_read() {
        assert_eq!(ReadingPriority::default(), ReadingPriority::ToRead);
    }

    #[test]
    fn source_round_trips_through_strings() {
        for s in [CardSource::AiAnalyzed, CardSource::MetadataOnly] {
            assert_eq!(CardSource::from_str(s.as_str()), Ok(s));
        }
    }

    #[test]
    fn source_defaults_to_metadata_only() {
        assert_eq!(CardSource::default(), CardSource::MetadataOnly);
    }

    #[test]
    fn header_default_is_empty() {
        let h = CardHeader::default();
        assert!(h.title.is_empty());
        assert!(h.authors.is_empty());
        assert_eq!(h.relevance_score, 0.0);
        assert_eq!(h.reading_priority, ReadingPriority::ToRead);
        assert!(h.extra.is_empty());
    }
}
