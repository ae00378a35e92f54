//! Loading question sets from JSON and writing them into a question repository.

use std::path::Path;

use quiz_core::model::Question;
use thiserror::Error;

use crate::repository::{QuestionRepository, StorageError};

const SAMPLE_QUESTIONS: &str = include_str!("../data/sample_questions.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid question file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate question id {0}")]
    DuplicateId(u64),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Parse a JSON array of questions. Each entry is validated on the way in.
///
/// # Errors
///
/// Returns `SeedError::Json` for malformed or invalid questions and
/// `SeedError::DuplicateId` if two entries share an id.
pub fn parse_questions(json: &str) -> Result<Vec<Question>, SeedError> {
    let questions: Vec<Question> = serde_json::from_str(json)?;
    let mut seen = std::collections::HashSet::with_capacity(questions.len());
    for q in &questions {
        if !seen.insert(q.id()) {
            return Err(SeedError::DuplicateId(q.id().value()));
        }
    }
    Ok(questions)
}

/// # Errors
///
/// Returns `SeedError::Io` if the file cannot be read, or any error from [`parse_questions`].
pub fn load_question_file(path: &Path) -> Result<Vec<Question>, SeedError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_questions(&raw)
}

/// The bundled 15-question set.
///
/// # Errors
///
/// Only fails if the bundled file is itself invalid.
pub fn sample_questions() -> Result<Vec<Question>, SeedError> {
    parse_questions(SAMPLE_QUESTIONS)
}

/// Upsert every question and return how many were written.
///
/// # Errors
///
/// Returns `SeedError::Storage` on the first failed write.
pub async fn seed_questions(
    repo: &dyn QuestionRepository,
    questions: &[Question],
) -> Result<usize, SeedError> {
    for question in questions {
        repo.upsert_question(question).await?;
    }
    tracing::info!(count = questions.len(), "seeded questions");
    Ok(questions.len())
}
