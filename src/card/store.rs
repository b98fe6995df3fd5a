//! Flat-file card store.
//!
//! Cards live as `{stem}.md` documents in a single directory; the filename
//! stem is the card's identity. Writes go through [`CardStore::create`],
//! which uses `create_new` so an existing card is never truncated or
//! overwritten: the first write for a stem wins and later writers are told
//! the card already exists.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::card::frontmatter;
use crate::card::types::CardRecord;

/// Outcome of a create attempt for a single stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The card file was written.
    Created,
    /// A card with this stem already existed; nothing was touched.
    AlreadyExists,
}

/// Handle to a card directory.
#[derive(Debug, Clone)]
pub struct CardStore {
    dir: PathBuf,
}

impl CardStore {
    /// Opens (creating if needed) the card directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create card directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Absolute path a stem maps to.
    pub fn card_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.md"))
    }

    /// Stems of every `.md` card currently in the store, sorted.
    pub fn existing_stems(&self) -> Result<BTreeSet<String>> {
        let mut stems = BTreeSet::new();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read card directory {}", self.dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                stems.insert(stem.to_string());
            }
        }
        Ok(stems)
    }

    /// Writes a new card, refusing to touch an existing one.
    ///
    /// The existence check and the create are a single `create_new` open, so
    /// two writers racing on the same stem cannot clobber each other.
    pub fn create(&self, stem: &str, contents: &str) -> Result<CreateOutcome> {
        let path = self.card_path(stem);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())
                    .with_context(|| format!("failed to write card {}", path.display()))?;
                Ok(CreateOutcome::Created)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(CreateOutcome::AlreadyExists),
            Err(e) => {
                Err(e).with_context(|| format!("failed to create card {}", path.display()))
            }
        }
    }

    /// Reads and parses every card, sorted by stem.
    ///
    /// Unreadable files are skipped with a warning rather than failing the
    /// run; a card whose header lacks a title gets the stem as its title so
    /// hand-dropped files still show up in the indexes.
    pub fn read_all(&self) -> Result<Vec<CardRecord>> {
        let mut cards = Vec::new();
        for stem in self.existing_stems()? {
            let path = self.card_path(&stem);
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable card");
                    continue;
                }
            };
            let (mut header, body) = frontmatter::parse(&text);
            if header.title.is_empty() {
                header.title = stem.clone();
            }
            cards.push(CardRecord {
                stem,
                header,
                body: body.to_string(),
            });
        }
        Ok(cards)
    }
}
