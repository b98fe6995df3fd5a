//! Terminal command implementations.
//!
//! Each submodule backs one subcommand; the binary's `main` parses arguments
//! and dispatches here with the loaded [`CarrelConfig`].

pub mod cite;
pub mod doctor;
pub mod index;
pub mod screen;
pub mod stats;
pub mod sync;

use std::str::FromStr;

use tracing::warn;

use crate::config::CarrelConfig;
use crate::enrich::{create_enricher, Enricher};

/// Parses an optional flag value, falling back to `default` (with a warning)
/// when the value does not parse. A bad flag never aborts a run.
pub fn parse_or_default<T: FromStr + Copy>(raw: Option<&str>, flag: &str, default: T) -> T {
    match raw {
        None => default,
        Some(s) => match s.parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(value = s, flag, "flag value did not parse, using default");
                default
            }
        },
    }
}

/// Like [`parse_or_default`] for flags with no default (absent stays absent).
pub fn parse_optional<T: FromStr>(raw: Option<&str>, flag: &str) -> Option<T> {
    let s = raw?;
    match s.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(value = s, flag, "flag value did not parse, ignoring");
            None
        }
    }
}

/// Builds the enrichment provider, or degrades to metadata-only mode.
///
/// Loads the workspace dotenv file first so API keys can live outside the
/// shell environment. Any setup failure (unknown provider, missing key) is
/// warned once and returns `None`; it never aborts the run.
pub fn make_enricher(config: &CarrelConfig) -> Option<Box<dyn Enricher>> {
    let secrets = config.secrets_path();
    if secrets.exists() {
        if let Err(e) = dotenvy::from_path(&secrets) {
            warn!(path = %secrets.display(), error = %e, "could not load secrets file");
        }
    }
    match create_enricher(&config.enrich) {
        Ok(enricher) => Some(enricher),
        Err(e) => {
            warn!(error = %e, "enrichment unavailable, continuing metadata-only");
            None
        }
    }
}

/// Timestamp for generated-file headers.
pub fn display_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M").to_string()
}

/// Compact timestamp used in generated filenames.
pub fn file_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M").to_string()
}

/// Today's date as written into card frontmatter.
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
