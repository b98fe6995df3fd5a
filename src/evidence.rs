//! Evidence-sentence extraction from card abstracts.
//!
//! The citation assembler quotes the strongest sentences of an abstract as
//! supporting evidence. "Strong" is purely lexical: evidence-language terms,
//! caller-supplied focus terms, and the presence of numbers.

use std::cmp::Ordering;

/// Points per evidence-language term found in a sentence.
const EVIDENCE_TERM_SCORE: f64 = 1.0;
/// Points per caller-supplied focus term found in a sentence.
const FOCUS_TERM_SCORE: f64 = 1.5;
/// Points when a sentence contains any digit (counts, CIs, effect sizes).
const DIGIT_SCORE: f64 = 0.5;

/// Fragments shorter than this are citation noise, not evidence.
const MIN_SENTENCE_LEN: usize = 35;

/// Markers of quantitative evidence language.
const EVIDENCE_TERMS: [&str; 9] = [
    "meta-analysis",
    "systematic review",
    "randomized",
    "rct",
    "effect",
    "95% ci",
    "odds ratio",
    "n=",
    "sample",
];

/// Splits free text into sentences.
///
/// Whitespace is normalized first; a sentence ends at `.`, `!`, or `?`
/// followed by a space and an uppercase letter or digit. Fragments shorter
/// than [`MIN_SENTENCE_LEN`] characters are discarded.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = normalized.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    for i in 0..chars.len() {
        let ends_here = matches!(chars[i], '.' | '!' | '?')
            && chars.get(i + 1) == Some(&' ')
            && chars
                .get(i + 2)
                .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if ends_here {
            push_sentence(&mut sentences, &chars[start..=i]);
            start = i + 2;
        }
    }
    if start < chars.len() {
        push_sentence(&mut sentences, &chars[start..]);
    }
    sentences
}

fn push_sentence(out: &mut Vec<String>, chars: &[char]) {
    let sentence: String = chars.iter().collect();
    let sentence = sentence.trim();
    if sentence.chars().count() >= MIN_SENTENCE_LEN {
        out.push(sentence.to_string());
    }
}

/// Scores one sentence for evidential weight.
pub fn score_sentence(sentence: &str, focus_terms: &[String]) -> f64 {
    let lowered = sentence.to_lowercase();
    let mut score = 0.0;
    for term in &EVIDENCE_TERMS {
        if lowered.contains(term) {
            score += EVIDENCE_TERM_SCORE;
        }
    }
    for term in focus_terms {
        if !term.is_empty() && lowered.contains(&term.to_lowercase()) {
            score += FOCUS_TERM_SCORE;
        }
    }
    if sentence.chars().any(|c| c.is_ascii_digit()) {
        score += DIGIT_SCORE;
    }
    score
}

/// The `max_sentences` best evidence sentences of an abstract, best first.
///
/// The sort is stable, so equally-scored sentences keep their original
/// order in the abstract.
pub fn pick_evidence(
    abstract_text: &str,
    focus_terms: &[String],
    max_sentences: usize,
) -> Vec<String> {
    let mut scored: Vec<(String, f64)> = split_sentences(abstract_text)
        .into_iter()
        .map(|s| {
            let score = score_sentence(&s, focus_terms);
            (s, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
        .into_iter()
        .take(max_sentences)
        .map(|(s, _)| s)
        .collect()
}
