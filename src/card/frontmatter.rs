//! Frontmatter codec for paper cards.
//!
//! Cards are markdown documents with a header block delimited by `---` lines.
//! The header is a deliberately small YAML subset: `key: value` scalars plus
//! `tags:` / `authors:` item lists. The parser never fails: a document with a
//! missing or malformed delimiter is treated as having an empty header, and a
//! malformed value falls back to the field default. Unknown scalar keys are
//! preserved in [`CardHeader::extra`] so `parse` and [`serialize`] round-trip.

use crate::card::types::CardHeader;

#[derive(Clone, Copy)]
enum ListField {
    Tags,
    Authors,
}

/// Splits a card document into its typed header and markdown body.
///
/// Returns an empty header and the whole text as body when the document does
/// not start with a `---` line or the closing delimiter is missing.
pub fn parse(text: &str) -> (CardHeader, &str) {
    match split_delimited(text) {
        Some((block, body)) => (parse_block(block), body),
        None => (CardHeader::default(), text),
    }
}

/// Renders a header and body back into a card document.
///
/// Scalars are written in a fixed order. Optional scalars are skipped when
/// empty; the six study-description fields are always written (empty values
/// serve as fill-in placeholders), as are the score, priority, and source.
pub fn serialize(header: &CardHeader, body: &str) -> String {
    let mut out = String::from("---\n");
    push_quoted(&mut out, "title", &header.title);
    push_if_set(&mut out, "year", &header.year);
    push_quoted_if_set(&mut out, "journal", &header.journal);
    push_quoted_if_set(&mut out, "DOI", &header.doi);
    push_quoted(&mut out, "method", &header.method);
    push_quoted(&mut out, "sample_size", &header.sample_size);
    push_quoted(&mut out, "population", &header.population);
    push_quoted(&mut out, "design", &header.design);
    push_quoted(&mut out, "measurement", &header.measurement);
    push_quoted(&mut out, "effect_size", &header.effect_size);
    out.push_str(&format!("relevance_score: {}\n", header.relevance_score));
    push_quoted(&mut out, "reading_priority", header.reading_priority.as_str());
    push_quoted_if_set(&mut out, "zotero_key", &header.zotero_key);
    push_if_set(&mut out, "card_type", &header.card_type);
    push_quoted_if_set(&mut out, "created", &header.created);
    push_quoted(&mut out, "source", header.source.as_str());
    for (key, value) in &header.extra {
        out.push_str(&format!("{key}: {value}\n"));
    }
    push_list(&mut out, "authors", &header.authors);
    push_list(&mut out, "tags", &header.tags);
    out.push_str("---\n");
    out.push_str(body);
    out
}

/// Locates the header block between the opening and closing `---` lines.
fn split_delimited(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches('\n').trim_end_matches('\r');
        if trimmed == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn parse_block(block: &str) -> CardHeader {
    let mut header = CardHeader::default();
    let mut list: Option<ListField> = None;

    for raw in block.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "tags:" => {
                list = Some(ListField::Tags);
                continue;
            }
            "authors:" => {
                list = Some(ListField::Authors);
                continue;
            }
            _ => {}
        }
        if let Some(field) = list {
            if let Some(item) = line.strip_prefix("- ") {
                let value = unquote(item.trim()).to_string();
                match field {
                    ListField::Tags => header.tags.push(value),
                    ListField::Authors => header.authors.push(value),
                }
                continue;
            }
            // Anything else ends the list and is handled as a normal line.
            list = None;
        }
        if line.starts_with('#') || line.starts_with("- ") {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        assign(&mut header, key.trim(), unquote(value.trim()));
    }

    header
}

fn assign(header: &mut CardHeader, key: &str, value: &str) {
    match key {
        "title" => header.title = value.to_string(),
        "year" => header.year = value.to_string(),
        "journal" => header.journal = value.to_string(),
        "DOI" | "doi" => header.doi = value.to_string(),
        "method" => header.method = value.to_string(),
        "sample_size" => header.sample_size = value.to_string(),
        "population" => header.population = value.to_string(),
        "design" => header.design = value.to_string(),
        "measurement" => header.measurement = value.to_string(),
        "effect_size" => header.effect_size = value.to_string(),
        "relevance_score" => header.relevance_score = value.parse().unwrap_or(0.0),
        "reading_priority" => header.reading_priority = value.parse().unwrap_or_default(),
        "zotero_key" => header.zotero_key = value.to_string(),
        "card_type" => header.card_type = value.to_string(),
        "created" => header.created = value.to_string(),
        "source" => header.source = value.parse().unwrap_or_default(),
        _ => {
            header
                .extra
                .insert(key.to_string(), value.to_string());
        }
    }
}

/// Strips one symmetric pair of surrounding quotes, if present.
fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn push_quoted(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("{key}: \"{value}\"\n"));
}

fn push_quoted_if_set(out: &mut String, key: &str, value: &str) {
    if !value.is_empty() {
        push_quoted(out, key, value);
    }
}

fn push_if_set(out: &mut String, key: &str, value: &str) {
    if !value.is_empty() {
        out.push_str(&format!("{key}: {value}\n"));
    }
}

fn push_list(out: &mut String, key: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("{key}:\n"));
    for item in items {
        out.push_str(&format!("  - \"{item}\"\n"));
    }
}
