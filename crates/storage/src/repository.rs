use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{AttemptRecord, Question, QuestionId};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted attempt, as read back for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRow {
    pub id: i64,
    pub record: AttemptRecord,
    pub attempted_at: DateTime<Utc>,
}

/// Where quiz questions come from.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Load every question. The returned order is the session order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the questions cannot be read or decoded.
    async fn load_questions(&self) -> Result<Vec<Question>, StorageError>;

    /// Insert or replace a question by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;
}

/// Append-only sink for graded answers.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Append one attempt and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn record_attempt(
        &self,
        record: &AttemptRecord,
        attempted_at: DateTime<Utc>,
    ) -> Result<i64, StorageError>;

    /// All attempts in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempts cannot be read.
    async fn list_attempts(&self) -> Result<Vec<AttemptRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Questions keep insertion order; upserting an existing id replaces it in place.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<Vec<Question>>>,
    attempts: Arc<Mutex<Vec<AttemptRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions: Arc::new(Mutex::new(questions)),
            attempts: Arc::default(),
        }
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn load_questions(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.iter_mut().find(|q| q.id() == question.id()) {
            Some(existing) => *existing = question.clone(),
            None => guard.push(question.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn record_attempt(
        &self,
        record: &AttemptRecord,
        attempted_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        let known = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .iter()
            .any(|q| q.id() == record.question_id);
        if !known {
            return Err(StorageError::NotFound);
        }

        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.len() + 1)
            .map_err(|_| StorageError::Serialization("attempt id overflow".into()))?;
        guard.push(AttemptRow {
            id,
            record: *record,
            attempted_at,
        });
        Ok(id)
    }

    async fn list_attempts(&self) -> Result<Vec<AttemptRow>, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

impl InMemoryRepository {
    /// Attempts recorded for one question, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn attempts_for(&self, question_id: QuestionId) -> Result<Vec<AttemptRecord>, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|row| row.record.question_id == question_id)
            .map(|row| row.record)
            .collect())
    }
}

/// Question source and attempt sink behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
}
