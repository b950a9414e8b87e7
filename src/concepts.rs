//! Concept extraction - candidate phrases, frequency ranking, topic buckets

use pyo3::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::entity;
use crate::text;

/// Default cap on the number of extracted concepts.
pub const DEFAULT_MAX_CONCEPTS: usize = 30;

/// Phrase candidates longer than this many tokens are discarded as noise.
const MAX_PHRASE_TOKENS: usize = 4;

static HEADING_RE: OnceLock<Regex> = OnceLock::new();

/// Heading-like lines: short capitalized or all-caps runs, optionally prefixed
/// with markdown hashes, ending at a newline or colon.
fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| {
        Regex::new(r"(?:\r\n|\n|\r|^)(#+\s*)?([A-Z][A-Za-z\s]{3,}:?|[A-Z][A-Z\s]{3,}:?)(?:\r\n|\n|\r|$)")
            .expect("heading pattern is valid")
    })
}

/// Extract a frequency-ranked, de-duplicated list of key concepts.
///
/// Candidates are the union of multi-word phrase runs, labeled entity
/// mentions, and single content words longer than 3 characters, all
/// case-folded. Shorter candidates that occur as strict substrings of longer
/// accepted ones are suppressed before ranking.
pub fn extract_key_concepts(text: &str, max_concepts: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    let sentences = text::split_sentences(text);

    for sentence in &sentences {
        let tokens = text::tokenize(sentence);

        // Single content words
        for token in &tokens {
            if text::is_wordlike(token)
                && token.chars().count() > 3
                && !text::is_stopword(token)
            {
                *counts.entry(token.to_lowercase()).or_insert(0) += 1;
            }
        }

        // Multi-word phrase runs
        for phrase in phrase_runs(&tokens) {
            *counts.entry(phrase).or_insert(0) += 1;
        }

        // Entity mentions kept only when a category applies
        for run in capitalized_runs(&tokens) {
            if entity::label_for(&run, text).is_some() {
                *counts.entry(run.to_lowercase()).or_insert(0) += 1;
            }
        }
    }

    // Substring suppression: longest first, drop strict substrings of kept ones
    let mut unique: Vec<&String> = counts.keys().collect();
    unique.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });

    let mut kept: Vec<String> = Vec::new();
    for candidate in unique {
        if !kept.iter().any(|k| k.contains(candidate.as_str())) {
            kept.push(candidate.clone());
        }
    }

    kept.sort_by(|a, b| counts[b].cmp(&counts[a]).then_with(|| a.cmp(b)));
    kept.retain(|c| c.chars().count() > 3);
    kept.truncate(max_concepts);
    kept
}

/// Maximal runs of 2..=4 consecutive non-stopword content tokens, lowercased.
/// Longer runs are skipped rather than truncated; they are rarely phrases.
fn phrase_runs(tokens: &[String]) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for token in tokens {
        if text::is_wordlike(token) && !text::is_stopword(token) {
            current.push(token.to_lowercase());
        } else {
            flush_run(&mut current, &mut runs);
        }
    }
    flush_run(&mut current, &mut runs);
    runs
}

fn flush_run(current: &mut Vec<String>, runs: &mut Vec<String>) {
    if (2..=MAX_PHRASE_TOKENS).contains(&current.len()) {
        runs.push(current.join(" "));
    }
    current.clear();
}

/// Runs of capitalized tokens (digits may continue a run), original case.
/// A lone capitalized token opening a sentence is ignored as sentence-case
/// noise, and leading capitalized stopwords are stripped.
fn capitalized_runs(tokens: &[String]) -> Vec<String> {
    let mut runs = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if !text::is_capitalized(&tokens[i]) {
            i += 1;
            continue;
        }
        let start = i;
        let mut run: Vec<&str> = Vec::new();
        while i < tokens.len()
            && run.len() < MAX_PHRASE_TOKENS
            && (text::is_capitalized(&tokens[i])
                || tokens[i].chars().all(|c| c.is_ascii_digit()))
        {
            run.push(tokens[i].as_str());
            i += 1;
        }
        while let Some(first) = run.first() {
            if text::is_stopword(first) {
                run.remove(0);
            } else {
                break;
            }
        }
        if run.is_empty() || (start == 0 && run.len() == 1) {
            continue;
        }
        runs.push(run.join(" "));
    }

    runs
}

/// Group concepts into topic buckets by heading-based segmentation.
///
/// Concepts appearing in the segment after a heading go to that heading's
/// topic; concepts before any heading go to "General", which is always
/// present. A concept may land in several topics; each bucket is de-duplicated.
pub fn categorize_concepts(concepts: &[String], text: &str) -> HashMap<String, Vec<String>> {
    let mut topics: HashMap<String, Vec<String>> = HashMap::new();
    topics.insert("General".to_string(), Vec::new());

    let mut current_topic = "General".to_string();
    let mut last_position = 0;

    for caps in heading_re().captures_iter(text) {
        let Some(header) = caps.get(2) else { continue };
        let Some(full) = caps.get(0) else { continue };

        let section = &text[last_position..full.start()];
        assign_section(&mut topics, &current_topic, concepts, section);

        current_topic = header.as_str().trim().trim_end_matches(':').to_string();
        last_position = full.start();
    }

    assign_section(&mut topics, &current_topic, concepts, &text[last_position..]);

    for bucket in topics.values_mut() {
        bucket.sort();
        bucket.dedup();
    }
    topics
}

fn assign_section(
    topics: &mut HashMap<String, Vec<String>>,
    topic: &str,
    concepts: &[String],
    section: &str,
) {
    let hits: Vec<String> = concepts
        .iter()
        .filter(|c| text::contains_ci(section, c))
        .cloned()
        .collect();
    if !hits.is_empty() {
        topics.entry(topic.to_string()).or_default().extend(hits);
    }
}

// ============= Python Bindings =============

#[pyfunction]
#[pyo3(name = "extract_key_concepts", signature = (text, max_concepts = DEFAULT_MAX_CONCEPTS))]
pub fn py_extract_key_concepts(text: &str, max_concepts: usize) -> Vec<String> {
    extract_key_concepts(text, max_concepts)
}

#[pyfunction]
#[pyo3(name = "categorize_concepts")]
pub fn py_categorize_concepts(concepts: Vec<String>, text: &str) -> HashMap<String, Vec<String>> {
    categorize_concepts(&concepts, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_yields_no_concepts() {
        assert!(extract_key_concepts("", DEFAULT_MAX_CONCEPTS).is_empty());
        assert!(extract_key_concepts("   \n ", DEFAULT_MAX_CONCEPTS).is_empty());
    }

    #[test]
    fn test_empty_input_categorization() {
        let topics = categorize_concepts(&[], "");
        assert_eq!(topics.len(), 1);
        assert_eq!(topics["General"], Vec::<String>::new());
    }

    #[test]
    fn test_phrase_ranking_and_substring_suppression() {
        let text = "The water cycle is a process in the atmosphere. \
                    The water cycle is driven by the sun. \
                    Evaporation is part of the cycle.";
        let concepts = extract_key_concepts(text, DEFAULT_MAX_CONCEPTS);

        assert!(concepts.contains(&"water cycle".to_string()));
        assert!(concepts.contains(&"evaporation".to_string()));
        // "water" and "cycle" are substrings of an accepted longer phrase
        assert!(!concepts.contains(&"water".to_string()));
        assert!(!concepts.contains(&"cycle".to_string()));
        // most frequent candidate ranks first
        assert_eq!(concepts[0], "water cycle");
    }

    #[test]
    fn test_concepts_are_lowercased_and_capped() {
        let text = "Marie Curie studied radiation. Marie Curie won prizes. \
                    Radiation physics advanced quickly.";
        let concepts = extract_key_concepts(text, 2);
        assert_eq!(concepts.len(), 2);
        assert!(concepts.iter().all(|c| c == &c.to_lowercase()));
        assert!(concepts.iter().all(|c| c.chars().count() > 3));
    }

    #[test]
    fn test_no_heading_puts_everything_under_general() {
        let concepts = vec!["gravity".to_string(), "orbits".to_string()];
        let topics = categorize_concepts(&concepts, "gravity shapes orbits around stars.");
        assert_eq!(topics.len(), 1);
        let general = &topics["General"];
        assert!(general.contains(&"gravity".to_string()));
        assert!(general.contains(&"orbits".to_string()));
    }

    #[test]
    fn test_heading_segmentation() {
        let text = "INTRODUCTION:\nRust is a systems language. Memory safety matters.\n\
                    ADVANCED TOPICS:\nOwnership and borrowing prevent data races.";
        let concepts = vec![
            "memory safety".to_string(),
            "ownership".to_string(),
            "rust".to_string(),
        ];
        let topics = categorize_concepts(&concepts, text);

        let intro = &topics["INTRODUCTION"];
        assert!(intro.contains(&"memory safety".to_string()));
        assert!(intro.contains(&"rust".to_string()));
        assert!(!intro.contains(&"ownership".to_string()));

        let advanced = &topics["ADVANCED TOPICS"];
        assert!(advanced.contains(&"ownership".to_string()));
    }

    #[test]
    fn test_markdown_heading_and_multi_topic_membership() {
        let text = "# Cells:\nThe cell membrane controls transport. \
                    \n# Energy:\nMitochondria power the cell membrane and more.";
        let concepts = vec!["cell membrane".to_string(), "mitochondria".to_string()];
        let topics = categorize_concepts(&concepts, text);

        assert!(topics["Cells"].contains(&"cell membrane".to_string()));
        // appears in both segments, so it lands in both buckets
        assert!(topics["Energy"].contains(&"cell membrane".to_string()));
        assert!(topics["Energy"].contains(&"mitochondria".to_string()));
    }

    #[test]
    fn test_buckets_are_deduplicated() {
        let text = "osmosis moves water. osmosis balances cells.";
        let concepts = vec!["osmosis".to_string()];
        let topics = categorize_concepts(&concepts, text);
        assert_eq!(topics["General"], vec!["osmosis".to_string()]);
    }
}
