use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// Record of a single graded answer.
///
/// Produced once per successful check and handed to the attempt sink.
/// The session never reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub question_id: QuestionId,
    pub is_correct: bool,
}

impl AttemptRecord {
    #[must_use]
    pub fn new(question_id: QuestionId, is_correct: bool) -> Self {
        Self {
            question_id,
            is_correct,
        }
    }
}
