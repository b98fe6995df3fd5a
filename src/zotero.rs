//! Bibliographic snapshot loading.
//!
//! The snapshot is a CSL-style JSON export from the reference manager:
//! either a top-level array of items or an object wrapping them in an
//! `items` array. Field shapes vary between exporters (`DOI` vs `doi`,
//! keyword list vs comma-joined string, `date-parts` numbers vs strings),
//! so the model is deliberately permissive; only a missing or unparseable
//! snapshot file is an error.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

/// One exported reference item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BibItem {
    /// Reference-manager item key.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Vec<Author>,
    #[serde(default)]
    pub issued: Option<Issued>,
    #[serde(rename = "DOI", alias = "doi", default)]
    pub doi: String,
    #[serde(rename = "container-title", default)]
    pub journal: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub keyword: KeywordField,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub given: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Issued {
    #[serde(rename = "date-parts", default)]
    pub date_parts: Vec<Vec<Value>>,
}

/// `keyword` comes as a list from some exporters and a comma-joined string
/// from others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeywordField {
    List(Vec<String>),
    Joined(String),
}

impl Default for KeywordField {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl BibItem {
    /// Author names as `Family, Given` entries; authors without a family
    /// name are dropped.
    pub fn authors(&self) -> Vec<String> {
        self.author
            .iter()
            .filter(|a| !a.family.is_empty())
            .map(|a| {
                if a.given.is_empty() {
                    a.family.clone()
                } else {
                    format!("{}, {}", a.family, a.given)
                }
            })
            .collect()
    }

    /// Publication year from `issued.date-parts`, or `"n.d."`.
    pub fn year(&self) -> String {
        if let Some(issued) = &self.issued {
            if let Some(first) = issued.date_parts.first() {
                match first.first() {
                    Some(Value::Number(n)) => return n.to_string(),
                    Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                    _ => {}
                }
            }
        }
        "n.d.".to_string()
    }

    /// Item keywords, normalized to a list.
    pub fn keywords(&self) -> Vec<String> {
        match &self.keyword {
            KeywordField::List(items) => items.clone(),
            KeywordField::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// Item keywords grouped by their tag prefix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagFacets {
    pub topic: Vec<String>,
    pub method: Vec<String>,
    pub measurement: Vec<String>,
    pub design: Vec<String>,
    pub population: Vec<String>,
    pub status: Vec<String>,
    pub other: Vec<String>,
}

/// Sorts keywords into facets by prefix (`topic:`, `m:`, `tool:`, `design:`,
/// `pop:`, `status:`); anything unprefixed lands in `other`. Prefixes are
/// case-insensitive; values keep their original case.
pub fn categorize_tags(keywords: &[String]) -> TagFacets {
    let mut facets = TagFacets::default();
    for kw in keywords {
        if let Some(v) = strip_prefix_ci(kw, "topic:") {
            facets.topic.push(v.trim().to_string());
        } else if let Some(v) = strip_prefix_ci(kw, "m:") {
            facets.method.push(v.trim().to_string());
        } else if let Some(v) = strip_prefix_ci(kw, "tool:") {
            facets.measurement.push(v.trim().to_string());
        } else if let Some(v) = strip_prefix_ci(kw, "design:") {
            facets.design.push(v.trim().to_string());
        } else if let Some(v) = strip_prefix_ci(kw, "pop:") {
            facets.population.push(v.trim().to_string());
        } else if let Some(v) = strip_prefix_ci(kw, "status:") {
            facets.status.push(v.trim().to_string());
        } else {
            facets.other.push(kw.clone());
        }
    }
    facets
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    List(Vec<BibItem>),
    Wrapped { items: Vec<BibItem> },
}

/// Loads the bibliographic snapshot. A missing or malformed file is an
/// error; the sync pipeline treats it as fatal.
pub fn load_snapshot(path: &Path) -> Result<Vec<BibItem>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read snapshot {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("snapshot {} is not a valid export", path.display()))?;
    let items = match snapshot {
        Snapshot::List(items) => items,
        Snapshot::Wrapped { items } => items,
    };
    info!(count = items.len(), path = %path.display(), "loaded bibliographic snapshot");
    Ok(items)
}
