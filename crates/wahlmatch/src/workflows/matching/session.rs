use super::domain::{Answers, ScoredResult, Stance, Thesis, ThesisId};
use super::engine;
use super::ranking;
use super::weights::WeightSet;
use crate::workflows::dataset::Dataset;
use serde::Serialize;
use std::sync::Arc;

/// Position of the answering flow within the thesis list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum Cursor {
    Awaiting(usize),
    Finished,
}

impl Cursor {
    pub fn start(total: usize) -> Self {
        if total == 0 {
            Cursor::Finished
        } else {
            Cursor::Awaiting(0)
        }
    }

    pub fn advance(self, total: usize) -> Self {
        match self {
            Cursor::Awaiting(index) if index + 1 < total => Cursor::Awaiting(index + 1),
            _ => Cursor::Finished,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("every thesis has already been visited")]
    Finished,
}

/// Answers, weights, and cursor of one user working through a dataset.
#[derive(Debug, Clone)]
pub struct MatchSession {
    dataset: Arc<Dataset>,
    answers: Answers,
    weights: WeightSet,
    cursor: Cursor,
}

impl MatchSession {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let cursor = Cursor::start(dataset.theses().len());
        Self {
            dataset,
            answers: Answers::new(),
            weights: WeightSet::new(),
            cursor,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn current_thesis(&self) -> Option<&Thesis> {
        match self.cursor {
            Cursor::Awaiting(index) => self.dataset.theses().get(index),
            Cursor::Finished => None,
        }
    }

    /// True once every thesis was visited, answered or skipped.
    pub fn is_finished(&self) -> bool {
        self.cursor == Cursor::Finished
    }

    /// Records `stance` for the current thesis and moves to the next one.
    pub fn record(&mut self, stance: Stance) -> Result<Cursor, SessionError> {
        let id = self.current_id()?;
        self.answers.insert(id, stance);
        Ok(self.advance())
    }

    /// Moves past the current thesis without answering it.
    pub fn skip(&mut self) -> Result<Cursor, SessionError> {
        self.current_id()?;
        Ok(self.advance())
    }

    pub fn toggle_weight(&mut self, id: &ThesisId) {
        self.weights = self.weights.toggled(id);
    }

    pub fn is_weighted(&self, id: &ThesisId) -> bool {
        self.weights.contains(id)
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    pub fn progress(&self) -> Progress {
        Progress {
            answered: self.answers.len(),
            total: self.dataset.theses().len(),
        }
    }

    /// Scores in dataset party order.
    pub fn results(&self) -> Vec<ScoredResult> {
        engine::score(
            self.dataset.parties(),
            self.dataset.theses(),
            &self.answers,
            &self.weights,
        )
    }

    pub fn ranked_results(&self) -> Vec<ScoredResult> {
        ranking::rank(self.results())
    }

    pub fn reset(&mut self) {
        self.answers.clear();
        self.weights = WeightSet::new();
        self.cursor = Cursor::start(self.dataset.theses().len());
    }

    fn current_id(&self) -> Result<ThesisId, SessionError> {
        self.current_thesis()
            .map(|thesis| thesis.id.clone())
            .ok_or(SessionError::Finished)
    }

    fn advance(&mut self) -> Cursor {
        self.cursor = self.cursor.advance(self.dataset.theses().len());
        self.cursor
    }
}
