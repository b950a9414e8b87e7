//! MCQ synthesis from source text plus batch generation

use log::{info, warn};
use pyo3::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::{self, EntityLabel};
use crate::text;

/// Choice labels, in slot order.
pub const CHOICE_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Options and correct sentences are cut to this many characters.
const OPTION_MAX_CHARS: usize = 100;

/// Minimum length for a sentence to serve as a distractor.
const DISTRACTOR_MIN_CHARS: usize = 20;

/// Question difficulty, selecting a third of the length-sorted sentence pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a difficulty name; anything unrecognized is treated as medium.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// MCQ with 4 labeled options, exactly one correct
#[pyclass]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mcq {
    #[pyo3(get)]
    pub concept: String,
    #[pyo3(get)]
    pub question: String,
    /// Option texts; index 0..4 corresponds to labels A..D.
    #[pyo3(get)]
    pub options: Vec<String>,
    /// The label ("A".."D") of the correct option.
    #[pyo3(get)]
    pub correct_label: String,
    #[pyo3(get)]
    pub explanation: String,
}

#[pymethods]
impl Mcq {
    /// Option text for a choice label ("A".."D").
    pub fn option(&self, label: &str) -> Option<String> {
        CHOICE_LABELS
            .iter()
            .position(|l| *l == label)
            .and_then(|i| self.options.get(i).cloned())
    }

    /// Text of the correct option.
    pub fn correct_option(&self) -> String {
        self.option(&self.correct_label).unwrap_or_default()
    }

    fn __repr__(&self) -> String {
        format!(
            "Mcq(concept='{}', question='{}...')",
            self.concept,
            self.question.chars().take(40).collect::<String>()
        )
    }
}

/// Question stems eligible for a concept; entity labels widen the pool.
fn stem_pool(concept: &str, label: Option<EntityLabel>) -> Vec<String> {
    let mut pool = vec![
        format!("Which of the following best describes {}?", concept),
        format!("What is the primary characteristic of {}?", concept),
        format!("How would you define {} based on the text?", concept),
        format!("What is {} primarily concerned with?", concept),
    ];

    match label {
        Some(EntityLabel::Organization) | Some(EntityLabel::Product) => {
            pool.push(format!("What is {}?", concept));
            pool.push(format!(
                "Which of the following statements about {} is correct?",
                concept
            ));
        }
        Some(EntityLabel::Person) => {
            pool.push(format!("Who is {}?", concept));
            pool.push(format!("What is {} known for?", concept));
        }
        _ => {}
    }

    pool
}

/// Generic filler distractors for short or repetitive source text.
fn filler_distractors(concept: &str) -> [String; 4] {
    [
        format!(
            "{} is a minor concept with little relevance to the main topic.",
            concept
        ),
        format!("{} refers to an outdated theory no longer in use.", concept),
        format!(
            "{} is primarily used in fields unrelated to this subject.",
            concept
        ),
        format!(
            "The text does not provide significant information about {}.",
            concept
        ),
    ]
}

/// Slice of the length-sorted candidate sentences for a difficulty level.
///
/// Easy takes the shortest third (at least one sentence), hard the longest
/// third, medium the middle third. Fewer than 3 candidates makes the hard
/// slice the whole pool and the medium slice empty; an empty slice falls back
/// to the full pool.
fn difficulty_slice(sorted: &[String], difficulty: Difficulty) -> &[String] {
    let n = sorted.len();
    let third = n / 3;

    let slice = match difficulty {
        Difficulty::Easy => &sorted[..third.max(1).min(n)],
        Difficulty::Hard => {
            if third == 0 {
                sorted
            } else {
                &sorted[n - third..]
            }
        }
        Difficulty::Medium => &sorted[third..(third + third).min(n)],
    };

    if slice.is_empty() {
        sorted
    } else {
        slice
    }
}

/// Generate one MCQ for a concept with an injected randomness source.
///
/// Fails when no sentence in the text contains the concept.
pub fn generate_mcq_with_rng<R: Rng>(
    concept: &str,
    context_text: &str,
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<Mcq, String> {
    let sentences = text::split_sentences(context_text);

    let mut concept_sentences: Vec<String> = sentences
        .iter()
        .filter(|s| text::contains_ci(s, concept))
        .cloned()
        .collect();
    if concept_sentences.is_empty() {
        return Err(format!("no sentence contains concept '{}'", concept));
    }

    concept_sentences.sort_by_key(|s| s.chars().count());
    let pool = difficulty_slice(&concept_sentences, difficulty);
    let sentence = pool[rng.gen_range(0..pool.len())].clone();

    // Entity label only widens the eligible stem templates
    let label = entity::label_for(concept, &sentence);
    let stems = stem_pool(concept, label);
    let question = stems[rng.gen_range(0..stems.len())].clone();

    let correct_option = text::truncate_chars(&sentence, OPTION_MAX_CHARS);

    // Prefer distractor sentences that avoid the concept entirely
    let mut other_sentences: Vec<&String> = sentences
        .iter()
        .filter(|s| {
            !text::contains_ci(s, concept) && s.chars().count() > DISTRACTOR_MIN_CHARS
        })
        .collect();

    let mut distractors: Vec<String> = Vec::new();
    for _ in 0..other_sentences.len().min(6) {
        let idx = rng.gen_range(0..other_sentences.len());
        let chosen = other_sentences.swap_remove(idx);
        distractors.push(text::truncate_chars(chosen, OPTION_MAX_CHARS));
    }

    while distractors.len() < 3 {
        let fillers = filler_distractors(concept);
        match fillers.iter().find(|f| !distractors.contains(f)) {
            Some(filler) => distractors.push(filler.clone()),
            // filler pool exhausted, accept a duplicate
            None => distractors.push(fillers[0].clone()),
        }
    }

    distractors.truncate(3);
    distractors.shuffle(rng);

    let correct_position = rng.gen_range(0..4);
    let mut options = Vec::with_capacity(4);
    for i in 0..4 {
        if i == correct_position {
            options.push(correct_option.clone());
        } else {
            let j = if i < correct_position { i } else { i - 1 };
            options.push(distractors.get(j).cloned().unwrap_or_else(|| {
                format!(
                    "Not enough information about {} is provided in the text.",
                    concept
                )
            }));
        }
    }

    Ok(Mcq {
        concept: concept.to_string(),
        question,
        options,
        correct_label: CHOICE_LABELS[correct_position].to_string(),
        explanation: format!(
            "This answer correctly identifies information about {} as stated in the text.",
            concept
        ),
    })
}

/// Generate one MCQ for a concept using thread-local randomness.
pub fn generate_mcq_for_concept(
    concept: &str,
    context_text: &str,
    difficulty: Difficulty,
) -> Result<Mcq, String> {
    generate_mcq_with_rng(concept, context_text, difficulty, &mut rand::thread_rng())
}

/// Generate MCQs for up to `num_questions` concepts.
///
/// A concept that fails synthesis is skipped, not retried; partial results
/// are returned and per-item progress is reported through the log facade.
pub fn generate_mcqs_batch(
    concepts: &[String],
    context_text: &str,
    num_questions: usize,
    difficulty: Difficulty,
) -> Vec<Mcq> {
    if concepts.is_empty() {
        warn!("no concepts provided for MCQ generation");
        return Vec::new();
    }

    let selected = &concepts[..concepts.len().min(num_questions)];
    info!(
        "starting MCQ generation for {} concepts at difficulty {}",
        selected.len(),
        difficulty.as_str()
    );

    let mut mcqs = Vec::new();
    let mut failed = 0usize;

    for (i, concept) in selected.iter().enumerate() {
        info!("processing concept {}/{}: {}", i + 1, selected.len(), concept);
        match generate_mcq_for_concept(concept, context_text, difficulty) {
            Ok(mcq) => mcqs.push(mcq),
            Err(e) => {
                failed += 1;
                warn!("failed to generate MCQ for '{}': {}", concept, e);
            }
        }
    }

    info!("generated {} MCQs, {} failed", mcqs.len(), failed);
    mcqs
}

/// Whether the user's selected label matches the correct label.
pub fn evaluate_answer(user_answer: &str, correct_answer: &str) -> bool {
    user_answer == correct_answer
}

// ============= Python Bindings =============

#[pyfunction]
#[pyo3(name = "generate_mcq_for_concept", signature = (concept, context_text, difficulty = "medium"))]
pub fn py_generate_mcq(concept: &str, context_text: &str, difficulty: &str) -> PyResult<Mcq> {
    generate_mcq_for_concept(concept, context_text, Difficulty::parse(difficulty))
        .map_err(pyo3::exceptions::PyRuntimeError::new_err)
}

#[pyfunction]
#[pyo3(name = "generate_mcqs_batch", signature = (concepts, context_text, num_questions = 5, difficulty = "medium"))]
pub fn py_generate_mcqs_batch(
    concepts: Vec<String>,
    context_text: &str,
    num_questions: usize,
    difficulty: &str,
) -> Vec<Mcq> {
    generate_mcqs_batch(
        &concepts,
        context_text,
        num_questions,
        Difficulty::parse(difficulty),
    )
}

#[pyfunction]
#[pyo3(name = "evaluate_answer")]
pub fn py_evaluate_answer(user_answer: &str, correct_answer: &str) -> bool {
    evaluate_answer(user_answer, correct_answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SAMPLE_TEXT: &str = "Photosynthesis converts light into energy. \
                               Plants use chlorophyll for this process. \
                               Animals do not photosynthesize.";

    fn assert_well_formed(mcq: &Mcq) {
        assert_eq!(mcq.options.len(), 4);
        assert!(CHOICE_LABELS.contains(&mcq.correct_label.as_str()));
        let correct = mcq.correct_option();
        let distractors: Vec<&String> =
            mcq.options.iter().filter(|o| **o != correct).collect();
        assert_eq!(distractors.len(), 3);
    }

    #[test]
    fn test_photosynthesis_end_to_end() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mcq = generate_mcq_with_rng(
                "photosynthesis",
                SAMPLE_TEXT,
                Difficulty::Medium,
                &mut rng,
            )
            .expect("sentence 1 contains the concept");

            assert_well_formed(&mcq);
            assert_eq!(
                mcq.correct_option(),
                "Photosynthesis converts light into energy."
            );
            assert_eq!(mcq.concept, "photosynthesis");
            assert!(mcq.question.contains("photosynthesis"));
            assert!(mcq.explanation.contains("photosynthesis"));
        }
    }

    #[test]
    fn test_no_matching_sentence_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let result =
            generate_mcq_with_rng("entropy", SAMPLE_TEXT, Difficulty::Medium, &mut rng);
        assert!(result.is_err());
    }

    #[test]
    fn test_fillers_pad_short_source() {
        let mut rng = StdRng::seed_from_u64(7);
        let mcq = generate_mcq_with_rng(
            "photosynthesis",
            "Photosynthesis powers plants.",
            Difficulty::Easy,
            &mut rng,
        )
        .expect("single matching sentence");

        assert_well_formed(&mcq);
        let fillers = filler_distractors("photosynthesis");
        let filler_count = mcq
            .options
            .iter()
            .filter(|o| fillers.iter().any(|f| f.as_str() == o.as_str()))
            .count();
        assert_eq!(filler_count, 3);
    }

    #[test]
    fn test_long_sentences_are_truncated() {
        let long_sentence = format!("Photosynthesis {}.", "x".repeat(200));
        let mut rng = StdRng::seed_from_u64(3);
        let mcq = generate_mcq_with_rng(
            "photosynthesis",
            &long_sentence,
            Difficulty::Hard,
            &mut rng,
        )
        .expect("matching sentence");

        let correct = mcq.correct_option();
        assert_eq!(correct.chars().count(), OPTION_MAX_CHARS + 3);
        assert!(correct.ends_with("..."));
    }

    #[test]
    fn test_difficulty_slices() {
        let sorted: Vec<String> = (1..=9).map(|i| "w".repeat(i * 5)).collect();

        assert_eq!(difficulty_slice(&sorted, Difficulty::Easy), &sorted[..3]);
        assert_eq!(difficulty_slice(&sorted, Difficulty::Medium), &sorted[3..6]);
        assert_eq!(difficulty_slice(&sorted, Difficulty::Hard), &sorted[6..]);

        // fewer than 3 candidates: easy takes one, medium and hard fall back
        let two: Vec<String> = vec!["aaaa".to_string(), "bbbbbbbb".to_string()];
        assert_eq!(difficulty_slice(&two, Difficulty::Easy).len(), 1);
        assert_eq!(difficulty_slice(&two, Difficulty::Medium), &two[..]);
        assert_eq!(difficulty_slice(&two, Difficulty::Hard), &two[..]);
    }

    #[test]
    fn test_stem_pool_sizes() {
        assert_eq!(stem_pool("gravity", None).len(), 4);
        assert_eq!(
            stem_pool("Acme Corporation", Some(EntityLabel::Organization)).len(),
            6
        );
        assert_eq!(stem_pool("WidgetPro", Some(EntityLabel::Product)).len(), 6);
        assert_eq!(stem_pool("Marie Curie", Some(EntityLabel::Person)).len(), 6);
        assert_eq!(stem_pool("Clean Air Act", Some(EntityLabel::Law)).len(), 4);
    }

    #[test]
    fn test_batch_monotonicity_and_skips() {
        let concepts = vec![
            "photosynthesis".to_string(),
            "chlorophyll".to_string(),
            "quasar".to_string(),
        ];

        let batch = generate_mcqs_batch(&concepts, SAMPLE_TEXT, 5, Difficulty::Medium);
        // "quasar" never appears in the text and is skipped, not retried
        assert_eq!(batch.len(), 2);

        let truncated = generate_mcqs_batch(&concepts, SAMPLE_TEXT, 1, Difficulty::Medium);
        assert!(truncated.len() <= 1);

        let empty = generate_mcqs_batch(&[], SAMPLE_TEXT, 5, Difficulty::Medium);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_evaluate_answer_is_exact_label_equality() {
        for label in CHOICE_LABELS {
            assert!(evaluate_answer(label, label));
        }
        assert!(!evaluate_answer("A", "B"));
        assert!(!evaluate_answer("a", "A"));
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::parse("easy"), Difficulty::Easy);
        assert_eq!(Difficulty::parse("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::parse("medium"), Difficulty::Medium);
        assert_eq!(Difficulty::parse("unknown"), Difficulty::Medium);
    }
}
