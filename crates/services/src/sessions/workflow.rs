use std::sync::Arc;

use rand::seq::SliceRandom;
use quiz_core::model::TierTable;
use storage::repository::{AttemptRepository, QuestionRepository};

use crate::Clock;
use crate::error::SessionError;
use super::service::{Advance, CheckOutcome, QuizSession};

/// Result of checking an answer through the loop service.
///
/// Grading always stands; `sink_error` only reports that the attempt could not be stored.
#[derive(Debug)]
pub struct AnswerOutcome {
    pub check: CheckOutcome,
    pub attempt_id: Option<i64>,
    pub sink_error: Option<SessionError>,
}

impl AnswerOutcome {
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        self.attempt_id.is_some()
    }
}

/// Orchestrates session start and attempt recording.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn AttemptRepository>,
    tiers: TierTable,
    shuffle: bool,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            questions,
            attempts,
            tiers: TierTable::cysic(),
            shuffle: false,
        }
    }

    #[must_use]
    pub fn with_tiers(mut self, tiers: TierTable) -> Self {
        self.tiers = tiers;
        self
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Load the questions once and start a session over them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SourceUnavailable` if the load fails or yields no questions.
    pub async fn start_session(&self) -> Result<QuizSession, SessionError> {
        let mut questions = self.questions.load_questions().await.map_err(|e| {
            tracing::warn!(error = %e, "question source failed");
            SessionError::SourceUnavailable(e.to_string())
        })?;

        if self.shuffle {
            questions.shuffle(&mut rand::rng());
        }

        let session = QuizSession::new(questions, self.tiers.clone(), self.clock.now())?;
        tracing::info!(questions = session.total_questions(), "quiz session started");
        Ok(session)
    }

    /// Grade the current answer, then write the attempt.
    ///
    /// The write happens after grading completes; a failed write is logged
    /// and reported in the outcome but never undoes the grading.
    ///
    /// # Errors
    ///
    /// Returns the session's grading errors (`NoSelection`, `AlreadyGraded`, `NotActive`).
    pub async fn check_answer(
        &self,
        session: &mut QuizSession,
    ) -> Result<AnswerOutcome, SessionError> {
        let check = session.check_answer()?;
        tracing::debug!(
            question_id = %check.attempt.question_id,
            correct = check.correct,
            score = check.score,
            "answer graded"
        );

        let (attempt_id, sink_error) = match self
            .attempts
            .record_attempt(&check.attempt, self.clock.now())
            .await
        {
            Ok(id) => (Some(id), None),
            Err(e) => {
                tracing::warn!(
                    question_id = %check.attempt.question_id,
                    error = %e,
                    "failed to record attempt"
                );
                (None, Some(SessionError::SinkWriteFailed(e)))
            }
        };

        Ok(AnswerOutcome {
            check,
            attempt_id,
            sink_error,
        })
    }

    /// # Errors
    ///
    /// See [`QuizSession::advance`].
    pub fn advance(&self, session: &mut QuizSession) -> Result<Advance, SessionError> {
        let advance = session.advance(self.clock.now())?;
        if let Advance::Finished(result) = &advance {
            tracing::info!(
                score = result.score,
                total = result.total,
                tier = %result.tier.title,
                "quiz session finished"
            );
        }
        Ok(advance)
    }

    /// # Errors
    ///
    /// See [`QuizSession::retreat`].
    pub fn retreat(&self, session: &mut QuizSession) -> Result<usize, SessionError> {
        session.retreat()
    }

    pub fn restart(&self, session: &mut QuizSession) {
        session.restart(self.clock.now());
        tracing::info!("quiz session restarted");
    }
}
