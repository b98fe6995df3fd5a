//! Personal literature-review workspace for a thesis carrel.
//!
//! Carrel keeps a reading workspace in sync with a reference-manager
//! snapshot: every paper gets a markdown card with typed frontmatter, a
//! profile-relevance score, and (optionally) an LLM analysis. On top of the
//! card store it rebuilds index documents, drafts citation paragraphs with a
//! CSV audit trace, and screens database-export CSVs before anything is
//! imported.
//!
//! # Architecture
//!
//! - **Storage**: plain markdown files with YAML-style frontmatter, one card
//!   per paper, first write wins on filename collisions
//! - **Scoring**: keyword-tier relevance against a bullet-list research
//!   profile (baseline keywords when the profile file is absent)
//! - **Enrichment**: optional, best-effort analysis via Anthropic or OpenAI;
//!   every failure downgrades to metadata-only rather than aborting
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`card`] — Card store, frontmatter codec, and store statistics
//! - [`zotero`] — CSL-JSON snapshot model and loader
//! - [`profile`] — Research profile parsing and baseline keywords
//! - [`relevance`] / [`evidence`] — Scoring and evidence-sentence ranking
//! - [`sync`] — Snapshot-to-store synchronizer and card composer
//! - [`index`] — Index document rendering
//! - [`cite`] — Paragraph bank, APA references, and the citation trace
//! - [`screen`] — Export CSV screening
//! - [`enrich`] — Provider trait and implementations

pub mod card;
pub mod cite;
pub mod cli;
pub mod config;
pub mod enrich;
pub mod evidence;
pub mod index;
pub mod profile;
pub mod relevance;
pub mod screen;
pub mod sync;
pub mod zotero;
