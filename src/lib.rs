//! AdaptIQ Core - Rust engine for the adaptive learning study aid
//!
//! Provides concept extraction, MCQ synthesis, batch generation, and progress
//! tracking. Document ingestion and the session/view orchestration stay in the
//! Python layer; this module only ever sees normalized plain text.

mod chart;
mod concepts;
mod entity;
mod progress;
mod questions;
mod text;

use pyo3::prelude::*;

// Re-export structs and functions for Rust callers
pub use concepts::{categorize_concepts, extract_key_concepts, DEFAULT_MAX_CONCEPTS};
pub use entity::EntityLabel;
pub use progress::{AnswerEvent, ConceptMastery, PerformanceSummary, ProgressTracker};
pub use questions::{
    evaluate_answer, generate_mcq_for_concept, generate_mcq_with_rng, generate_mcqs_batch,
    Difficulty, Mcq, CHOICE_LABELS,
};

/// AdaptIQ Core Python Module
#[pymodule]
fn adaptiq_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Concept extraction
    m.add_function(wrap_pyfunction!(concepts::py_extract_key_concepts, m)?)?;
    m.add_function(wrap_pyfunction!(concepts::py_categorize_concepts, m)?)?;

    // Question generation
    m.add_function(wrap_pyfunction!(questions::py_generate_mcq, m)?)?;
    m.add_function(wrap_pyfunction!(questions::py_generate_mcqs_batch, m)?)?;
    m.add_function(wrap_pyfunction!(questions::py_evaluate_answer, m)?)?;

    // Register classes
    m.add_class::<questions::Mcq>()?;
    m.add_class::<progress::ProgressTracker>()?;
    m.add_class::<progress::AnswerEvent>()?;
    m.add_class::<progress::ConceptMastery>()?;
    m.add_class::<progress::PerformanceSummary>()?;

    Ok(())
}
