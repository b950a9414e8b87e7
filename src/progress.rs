//! Progress tracking - answer history, mastery aggregates, statistics

use chrono::Local;
use pyo3::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::chart;
use crate::questions::Mcq;

/// One recorded answer; append-only, never mutated.
#[pyclass]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEvent {
    #[pyo3(get)]
    pub timestamp: String,
    #[pyo3(get)]
    pub concept: String,
    #[pyo3(get)]
    pub question: String,
    #[pyo3(get)]
    pub user_answer: String,
    #[pyo3(get)]
    pub correct_answer: String,
    #[pyo3(get)]
    pub is_correct: bool,
    /// Attempt count for the concept after this answer was recorded.
    #[pyo3(get)]
    pub attempts: u32,
    #[pyo3(get)]
    pub session_id: String,
}

#[pymethods]
impl AnswerEvent {
    fn __repr__(&self) -> String {
        format!(
            "AnswerEvent(concept='{}', is_correct={}, attempts={})",
            self.concept, self.is_correct, self.attempts
        )
    }
}

/// Per-concept running tally. Invariant: attempts == correct + incorrect.
///
/// The mastered flag is volatile: once a concept has any miss, it mirrors the
/// correctness of the most recent answer rather than an accuracy threshold.
#[pyclass]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConceptMastery {
    #[pyo3(get)]
    pub attempts: u32,
    #[pyo3(get)]
    pub correct: u32,
    #[pyo3(get)]
    pub incorrect: u32,
    #[pyo3(get)]
    pub mastered: bool,
}

#[pymethods]
impl ConceptMastery {
    fn __repr__(&self) -> String {
        format!(
            "ConceptMastery(attempts={}, correct={}, mastered={})",
            self.attempts, self.correct, self.mastered
        )
    }
}

/// Summary statistics across the whole ledger
#[pyclass]
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    #[pyo3(get)]
    pub total_questions: usize,
    #[pyo3(get)]
    pub correct_answers: usize,
    #[pyo3(get)]
    pub accuracy: f64,
    #[pyo3(get)]
    pub mastered_concepts: usize,
    #[pyo3(get)]
    pub weak_concepts: usize,
}

#[pymethods]
impl PerformanceSummary {
    fn __repr__(&self) -> String {
        format!(
            "PerformanceSummary(total={}, correct={}, accuracy={:.1}%)",
            self.total_questions, self.correct_answers, self.accuracy
        )
    }
}

/// Session-scoped progress ledger.
///
/// Explicit state object: the answer log and mastery aggregates live here,
/// not in any process-wide global, and survive `reset_session`.
#[pyclass]
#[derive(Debug)]
pub struct ProgressTracker {
    session_id: String,
    events: Vec<AnswerEvent>,
    mastery: HashMap<String, ConceptMastery>,
}

fn mint_session_id() -> String {
    // Opaque token: wall-clock stamp plus a random suffix so that two resets
    // within the same second still differ.
    format!(
        "{}-{:04x}",
        Local::now().format("%Y%m%d%H%M%S"),
        rand::thread_rng().gen::<u16>()
    )
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            session_id: mint_session_id(),
            events: Vec::new(),
            mastery: HashMap::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Append an answer event and update the concept's mastery tally.
    ///
    /// First answer for a concept sets mastered to its correctness. After
    /// that, a correct answer flips mastery on whenever the concept has ever
    /// been missed; an incorrect answer always flips it off.
    pub fn record_answer(&mut self, question: &Mcq, user_answer: &str, is_correct: bool) {
        let concept = question.concept.clone();

        match self.mastery.get_mut(&concept) {
            None => {
                self.mastery.insert(
                    concept.clone(),
                    ConceptMastery {
                        attempts: 1,
                        correct: if is_correct { 1 } else { 0 },
                        incorrect: if is_correct { 0 } else { 1 },
                        mastered: is_correct,
                    },
                );
            }
            Some(m) => {
                m.attempts += 1;
                if is_correct {
                    m.correct += 1;
                    if m.incorrect > 0 {
                        m.mastered = true;
                    }
                } else {
                    m.incorrect += 1;
                    m.mastered = false;
                }
            }
        }

        let attempts = self.mastery[&concept].attempts;
        self.events.push(AnswerEvent {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            concept,
            question: question.question.clone(),
            user_answer: user_answer.to_string(),
            correct_answer: question.correct_label.clone(),
            is_correct,
            attempts,
            session_id: self.session_id.clone(),
        });
    }

    /// Concepts needing reinforcement: missed more than `threshold` times and
    /// not currently mastered. Unordered.
    pub fn get_weak_concepts(&self, threshold: u32) -> Vec<String> {
        self.mastery
            .iter()
            .filter(|(_, m)| m.incorrect > threshold && !m.mastered)
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// Percentage of recorded concepts currently mastered, 0 when none.
    pub fn get_mastery_percentage(&self) -> f64 {
        if self.mastery.is_empty() {
            return 0.0;
        }
        let mastered = self.mastery.values().filter(|m| m.mastered).count();
        (mastered as f64 / self.mastery.len() as f64) * 100.0
    }

    pub fn get_performance_summary(&self) -> PerformanceSummary {
        if self.events.is_empty() {
            return PerformanceSummary {
                total_questions: 0,
                correct_answers: 0,
                accuracy: 0.0,
                mastered_concepts: 0,
                weak_concepts: 0,
            };
        }

        let total_questions = self.events.len();
        let correct_answers = self.events.iter().filter(|e| e.is_correct).count();

        PerformanceSummary {
            total_questions,
            correct_answers,
            accuracy: (correct_answers as f64 / total_questions as f64) * 100.0,
            mastered_concepts: self.mastery.values().filter(|m| m.mastered).count(),
            weak_concepts: self.get_weak_concepts(1).len(),
        }
    }

    /// Base64-encoded progress chart, or None when nothing has been recorded.
    pub fn generate_progress_chart(&self) -> Result<Option<String>, String> {
        chart::render_mastery_chart(&self.mastery)
    }

    /// Mint a new session identifier. History and mastery tallies are kept;
    /// only the grouping token for subsequent events changes.
    pub fn reset_session(&mut self) {
        self.session_id = mint_session_id();
    }

    /// Read-only view of the answer log, oldest first.
    pub fn history(&self) -> &[AnswerEvent] {
        &self.events
    }

    /// Copy of the per-concept mastery aggregates.
    pub fn mastery_snapshot(&self) -> HashMap<String, ConceptMastery> {
        self.mastery.clone()
    }

    /// Answer log serialized as a JSON array, for the view layer's exports.
    pub fn export_history_json(&self) -> Result<String, String> {
        serde_json::to_string(&self.events)
            .map_err(|e| format!("Failed to serialize history: {}", e))
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ============= Python Bindings =============

#[pymethods]
impl ProgressTracker {
    #[new]
    fn py_new() -> Self {
        Self::new()
    }

    #[getter(session_id)]
    fn py_session_id(&self) -> String {
        self.session_id.clone()
    }

    #[pyo3(name = "record_answer")]
    fn py_record_answer(&mut self, question: Mcq, user_answer: &str, is_correct: bool) {
        self.record_answer(&question, user_answer, is_correct);
    }

    #[pyo3(name = "get_weak_concepts", signature = (threshold = 1))]
    fn py_get_weak_concepts(&self, threshold: u32) -> Vec<String> {
        self.get_weak_concepts(threshold)
    }

    #[pyo3(name = "get_mastery_percentage")]
    fn py_get_mastery_percentage(&self) -> f64 {
        self.get_mastery_percentage()
    }

    #[pyo3(name = "get_performance_summary")]
    fn py_get_performance_summary(&self) -> PerformanceSummary {
        self.get_performance_summary()
    }

    #[pyo3(name = "generate_progress_chart")]
    fn py_generate_progress_chart(&self) -> PyResult<Option<String>> {
        self.generate_progress_chart()
            .map_err(pyo3::exceptions::PyRuntimeError::new_err)
    }

    #[pyo3(name = "reset_session")]
    fn py_reset_session(&mut self) {
        self.reset_session();
    }

    #[pyo3(name = "history")]
    fn py_history(&self) -> Vec<AnswerEvent> {
        self.events.clone()
    }

    #[pyo3(name = "mastery_snapshot")]
    fn py_mastery_snapshot(&self) -> HashMap<String, ConceptMastery> {
        self.mastery_snapshot()
    }

    #[pyo3(name = "export_history_json")]
    fn py_export_history_json(&self) -> PyResult<String> {
        self.export_history_json()
            .map_err(pyo3::exceptions::PyRuntimeError::new_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "ProgressTracker(session='{}', events={}, concepts={})",
            self.session_id,
            self.events.len(),
            self.mastery.len()
        )
    }
}
