//! Derived index documents over the card store.
//!
//! Four views, rebuilt from scratch on every run: a master table, a topic
//! grouping, a priority checklist, and a query-template comparison page.
//! Given the same cards and timestamp the output is byte-identical, so the
//! files are safe to delete and regenerate at any time.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::card::stats::topic_tag_value;
use crate::card::types::{CardRecord, ReadingPriority};

/// A fixed thematic axis used when cards carry no `topic:` tags, and by the
/// export screener for section fit.
pub struct ThemeAxis {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// The three axes of the literature review.
pub const THEME_AXES: [ThemeAxis; 3] = [
    ThemeAxis {
        name: "Anxiety & Depression",
        keywords: &["anxiety", "depression", "mood", "cbt", "worry", "panic", "gad", "mindfulness"],
    },
    ThemeAxis {
        name: "AI & Existential",
        keywords: &["ai", "automation", "meaning", "purpose", "identity", "existential", "unemployment"],
    },
    ThemeAxis {
        name: "Art & Mental Health",
        keywords: &["art", "therapy", "creative", "music", "expressive", "aesthetic", "flow"],
    },
];

/// Folder name the index links point into.
const CARDS_FOLDER: &str = "cards";

const MASTER_FILE: &str = "INDEX_MASTER.md";
const TOPIC_FILE: &str = "INDEX_TOPIC.md";
const PRIORITY_FILE: &str = "INDEX_PRIORITY.md";
const DATAVIEW_FILE: &str = "COMPARE_DATAVIEW.md";

/// Comparison page: templated queries only, evaluated by the note viewer.
const DATAVIEW_TEMPLATE: &str = r#"# Comparison Table (Dataview)

```dataview
TABLE year AS "Year", method AS "Method", measurement AS "Tools", sample_size AS "N", effect_size AS "ES", reading_priority AS "P", relevance_score AS "Rel"
FROM "cards"
SORT relevance_score DESC
```

## Must-Read

```dataview
TABLE year AS "Year", journal AS "Journal", method AS "Method"
FROM "cards"
WHERE reading_priority = "must-read"
SORT relevance_score DESC
```
"#;

/// Writes all four index files under `root`, overwriting previous runs.
pub fn write_indexes(root: &Path, cards: &[CardRecord], timestamp: &str) -> Result<()> {
    let mut cards: Vec<&CardRecord> = cards.iter().collect();
    cards.sort_by(|a, b| {
        b.header
            .relevance_score
            .partial_cmp(&a.header.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for (name, contents) in [
        (MASTER_FILE, master_index(&cards, timestamp)),
        (TOPIC_FILE, topic_index(&cards)),
        (PRIORITY_FILE, priority_index(&cards)),
        (DATAVIEW_FILE, DATAVIEW_TEMPLATE.to_string()),
    ] {
        let path = root.join(name);
        fs::write(&path, contents)
            .with_context(|| format!("failed to write index {}", path.display()))?;
    }
    info!(cards = cards.len(), root = %root.display(), "rebuilt index files");
    Ok(())
}

/// Master index: every card in one relevance-ranked table.
pub fn master_index(cards: &[&CardRecord], timestamp: &str) -> String {
    let mut out = format!(
        "# Master Index ({} papers)\n\n> Updated: {timestamp}\n\n",
        cards.len()
    );
    out.push_str("| # | P | Title | Year | Method | Relevance |\n");
    out.push_str("|---|---|-------|------|--------|-----------|\n");
    for (i, card) in cards.iter().enumerate() {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            i + 1,
            card.header.reading_priority,
            card_link(card, 55),
            blank_dash(&card.header.year),
            blank_dash(&card.header.method),
            card.header.relevance_score,
        ));
    }
    out
}

/// Topic index: `topic:` tags grouped under the theme axes, with a
/// keyword-inference fallback when the store carries no topic tags at all.
pub fn topic_index(cards: &[&CardRecord]) -> String {
    let mut topic_map: BTreeMap<String, Vec<&CardRecord>> = BTreeMap::new();
    for card in cards {
        for tag in &card.header.tags {
            if let Some(topic) = topic_tag_value(tag) {
                topic_map.entry(topic).or_default().push(card);
            }
        }
    }

    let mut out = String::from("# Topic Index\n");

    if topic_map.is_empty() {
        if cards.is_empty() {
            return out;
        }
        out.push_str("\n## Inferred grouping (no topic tags yet)\n");
        for axis in &THEME_AXES {
            let matched: Vec<&&CardRecord> = cards
                .iter()
                .filter(|c| matches_axis(c, axis))
                .collect();
            if matched.is_empty() {
                continue;
            }
            out.push_str(&format!("\n### {} ({})\n", axis.name, matched.len()));
            for card in matched {
                out.push_str(&format!(
                    "- {} {}\n",
                    card.header.reading_priority,
                    card_link(card, 60)
                ));
            }
        }
        return out;
    }

    let mut used: Vec<String> = Vec::new();
    for axis in &THEME_AXES {
        let matches: Vec<(&String, &Vec<&CardRecord>)> = topic_map
            .iter()
            .filter(|(topic, _)| {
                axis.keywords.iter().any(|k| topic.to_lowercase().contains(k))
            })
            .collect();
        if matches.is_empty() {
            continue;
        }
        out.push_str(&format!("\n## {}\n", axis.name));
        for (topic, topic_cards) in matches {
            used.push(topic.clone());
            out.push_str(&topic_section(topic, topic_cards));
        }
    }

    let remaining: Vec<(&String, &Vec<&CardRecord>)> = topic_map
        .iter()
        .filter(|(topic, _)| !used.contains(topic))
        .collect();
    if !remaining.is_empty() {
        out.push_str("\n## Other\n");
        for (topic, topic_cards) in remaining {
            out.push_str(&topic_section(topic, topic_cards));
        }
    }
    out
}

fn topic_section(topic: &str, topic_cards: &[&CardRecord]) -> String {
    let mut out = format!("\n### {topic} ({})\n", topic_cards.len());
    // Already in relevance order from the caller's sort.
    for card in topic_cards {
        out.push_str(&format!(
            "- {} {}\n",
            card.header.reading_priority,
            card_link(card, 60)
        ));
    }
    out
}

/// Does this card's title/method/tags text hit any keyword of the axis?
pub fn matches_axis(card: &CardRecord, axis: &ThemeAxis) -> bool {
    let haystack = format!(
        "{} {} {}",
        card.header.title.to_lowercase(),
        card.header.method.to_lowercase(),
        card.header.tags.join(" ").to_lowercase()
    );
    axis.keywords.iter().any(|k| haystack.contains(k))
}

/// Priority index: counts table plus a checklist per non-empty tier.
pub fn priority_index(cards: &[&CardRecord]) -> String {
    let mut grouped: BTreeMap<&'static str, Vec<&CardRecord>> = BTreeMap::new();
    for card in cards {
        grouped
            .entry(card.header.reading_priority.as_str())
            .or_default()
            .push(card);
    }

    let mut out = String::from("# Reading Priority\n\n| P | Papers |\n|---|--------|\n");
    for p in ReadingPriority::ordered() {
        let count = grouped.get(p.as_str()).map_or(0, Vec::len);
        out.push_str(&format!("| {} | {count} |\n", p.label()));
    }

    for p in ReadingPriority::ordered() {
        let Some(items) = grouped.get(p.as_str()) else {
            continue;
        };
        out.push_str(&format!("\n## {}\n\n", p.label()));
        for card in items {
            out.push_str(&format!(
                "- [ ] {} ({})\n",
                card_link(card, 60),
                blank_dash(&card.header.year)
            ));
        }
    }
    out
}

/// Wiki-style link into the card folder, title truncated for table width.
fn card_link(card: &CardRecord, max_title: usize) -> String {
    let title: String = card.header.title.chars().take(max_title).collect();
    format!("[[{CARDS_FOLDER}/{}|{title}]]", card.stem)
}

fn blank_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::types::CardHeader;

    fn card(title: &str, score: f64, priority: ReadingPriority, tags: &[&str]) -> CardRecord {
        CardRecord {
            stem: title.to_string(),
            header: CardHeader {
                title: title.to_string(),
                relevance_score: score,
                reading_priority: priority,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                year: "2024".to_string(),
                ..CardHeader::default()
            },
            body: String::new(),
        }
    }

    fn refs(cards: &[CardRecord]) -> Vec<&CardRecord> {
        cards.iter().collect()
    }

    #[test]
    fn master_index_ranks_and_counts() {
        let cards = vec![
            card("High", 90.0, ReadingPriority::MustRead, &[]),
            card("Low", 10.0, ReadingPriority::ToRead, &[]),
        ];
        let out = master_index(&refs(&cards), "2026-08-30 12:00");
        assert!(out.starts_with("# Master Index (2 papers)"));
        assert!(out.contains("> Updated: 2026-08-30 12:00"));
        let high_pos = out.find("[[cards/High|High]]").unwrap();
        let low_pos = out.find("[[cards/Low|Low]]").unwrap();
        assert!(high_pos < low_pos, "higher relevance rows come first");
    }

    #[test]
    fn empty_store_master_index_has_no_rows() {
        let out = master_index(&[], "now");
        assert!(out.starts_with("# Master Index (0 papers)"));
        assert!(!out.contains("| 1 |"), "no data rows");
    }

    #[test]
    fn topic_index_groups_tagged_cards_under_axes() {
        let cards = vec![
            card("A", 50.0, ReadingPriority::ToRead, &["topic:anxiety"]),
            card("B", 40.0, ReadingPriority::ToRead, &["topic:quantum computing"]),
        ];
        let out = topic_index(&refs(&cards));
        assert!(out.contains("## Anxiety & Depression"));
        assert!(out.contains("### anxiety (1)"));
        assert!(out.contains("## Other"));
        assert!(out.contains("### quantum computing (1)"));
    }

    #[test]
    fn topic_index_falls_back_to_inference_without_tags() {
        let cards = vec![
            card("Depression treatment outcomes", 50.0, ReadingPriority::ToRead, &[]),
            card("AI and the future of purpose", 40.0, ReadingPriority::ToRead, &[]),
        ];
        let out = topic_index(&refs(&cards));
        assert!(out.contains("## Inferred grouping"));
        assert!(out.contains("### Anxiety & Depression (1)"));
        assert!(out.contains("### AI & Existential (1)"));
    }

    #[test]
    fn a_card_may_fall_on_several_axes() {
        let cards = vec![card(
            "Art therapy for anxiety",
            60.0,
            ReadingPriority::ToRead,
            &[],
        )];
        let out = topic_index(&refs(&cards));
        assert!(out.contains("### Anxiety & Depression (1)"));
        assert!(out.contains("### Art & Mental Health (1)"));
    }

    #[test]
    fn empty_store_has_no_group_sections() {
        assert_eq!(topic_index(&[]), "# Topic Index\n");
        let priority = priority_index(&[]);
        assert!(priority.contains("| Must-Read | 0 |"));
        assert!(!priority.contains("## Must-Read"), "no checklist sections");
    }

    #[test]
    fn priority_index_counts_and_lists() {
        let cards = vec![
            card("A", 90.0, ReadingPriority::MustRead, &[]),
            card("B", 80.0, ReadingPriority::MustRead, &[]),
            card("C", 10.0, ReadingPriority::ReferenceOnly, &[]),
        ];
        let out = priority_index(&refs(&cards));
        assert!(out.contains("| Must-Read | 2 |"));
        assert!(out.contains("| Should-Read | 0 |"));
        assert!(out.contains("## Must-Read"));
        assert!(!out.contains("## Should-Read"));
        assert!(out.contains("- [ ] [[cards/A|A]] (2024)"));
    }

    #[test]
    fn write_indexes_is_deterministic_modulo_timestamp() {
        let dir = tempfile::TempDir::new().unwrap();
        let cards = vec![
            card("A", 50.0, ReadingPriority::ToRead, &["topic:anxiety"]),
            card("B", 70.0, ReadingPriority::MustRead, &[]),
        ];
        write_indexes(dir.path(), &cards, "T1").unwrap();
        let first = fs::read_to_string(dir.path().join("INDEX_TOPIC.md")).unwrap();
        write_indexes(dir.path(), &cards, "T2").unwrap();
        let second = fs::read_to_string(dir.path().join("INDEX_TOPIC.md")).unwrap();
        assert_eq!(first, second);
        assert!(dir.path().join("COMPARE_DATAVIEW.md").exists());
        let master = fs::read_to_string(dir.path().join("INDEX_MASTER.md")).unwrap();
        assert!(master.contains("T2"));
    }
}
