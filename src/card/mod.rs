pub mod frontmatter;
pub mod stats;
pub mod store;
pub mod types;

use regex::Regex;

/// Longest filename stem the store will produce.
pub const MAX_STEM_LEN: usize = 80;

/// Reduces a paper title to a filesystem-safe filename stem.
///
/// Strips characters that are illegal or awkward in filenames, trims,
/// collapses runs of spaces, and truncates to [`MAX_STEM_LEN`] characters.
/// The stem is the card's identity: two titles that sanitize to the same
/// stem map to the same card.
pub fn safe_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect();
    let mut stem = cleaned.trim().to_string();
    while stem.contains("  ") {
        stem = stem.replace("  ", " ");
    }
    stem.chars().take(MAX_STEM_LEN).collect()
}

/// Extracts the text under a `## {heading}` section of a card body.
///
/// Returns the trimmed text between the heading line and the next `##`
/// heading (or the end of the body); empty when the section is absent.
pub fn extract_section(body: &str, heading: &str) -> String {
    let pattern = format!(r"(?m)^##\s+{}\s*$", regex::escape(heading));
    let heading_re = Regex::new(&pattern).expect("section heading pattern is valid");
    let Some(m) = heading_re.find(body) else {
        return String::new();
    };
    let rest = &body[m.end()..];
    let next_re = Regex::new(r"\n##\s").expect("next heading pattern is valid");
    let section = match next_re.find(rest) {
        Some(n) => &rest[..n.start()],
        None => rest,
    };
    section.trim().to_string()
}
