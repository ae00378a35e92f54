use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Smallest number of options a multiple-choice question may offer.
pub const MIN_OPTIONS: usize = 2;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id}: prompt cannot be empty")]
    EmptyPrompt { id: QuestionId },

    #[error("question {id}: needs at least 2 options, got {len}")]
    TooFewOptions { id: QuestionId, len: usize },

    #[error("question {id}: option {index} is empty")]
    EmptyOption { id: QuestionId, index: usize },

    #[error("question {id}: correct option {index} is out of range for {len} options")]
    CorrectOptionOutOfRange {
        id: QuestionId,
        index: usize,
        len: usize,
    },
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question as it arrives from a file or a database row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: QuestionId,
    #[serde(default)]
    pub summary: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    #[serde(default)]
    pub explanation: String,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt or any option is blank, fewer than
    /// [`MIN_OPTIONS`] options are given, or `correct_option` is out of range.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = self.id;
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt { id });
        }
        if self.options.len() < MIN_OPTIONS {
            return Err(QuestionError::TooFewOptions {
                id,
                len: self.options.len(),
            });
        }
        if let Some(index) = self.options.iter().position(|opt| opt.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { id, index });
        }
        if self.correct_option >= self.options.len() {
            return Err(QuestionError::CorrectOptionOutOfRange {
                id,
                index: self.correct_option,
                len: self.options.len(),
            });
        }

        Ok(Question {
            id,
            summary: self.summary,
            question: self.question,
            options: self.options,
            correct_option: self.correct_option,
            explanation: self.explanation,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One quiz item. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDraft", into = "QuestionDraft")]
pub struct Question {
    id: QuestionId,
    summary: String,
    question: String,
    options: Vec<String>,
    correct_option: usize,
    explanation: String,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    /// Context shown before the prompt.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_option(&self) -> usize {
        self.correct_option
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_option
    }
}

impl TryFrom<QuestionDraft> for Question {
    type Error = QuestionError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<Question> for QuestionDraft {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            summary: q.summary,
            question: q.question,
            options: q.options,
            correct_option: q.correct_option,
            explanation: q.explanation,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
