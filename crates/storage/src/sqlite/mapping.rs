use quiz_core::model::{AttemptRecord, Question, QuestionDraft, QuestionId};
use sqlx::Row;

use crate::repository::{AttemptRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("question_id overflow".into()))
}

/// Options are stored as a JSON array of strings.
pub(crate) fn options_to_json(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn options_from_json(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let options_raw: String = row.try_get("options").map_err(ser)?;
    let correct_raw: i64 = row.try_get("correct_option").map_err(ser)?;
    let correct_option = usize::try_from(correct_raw).map_err(|_| {
        StorageError::Serialization(format!("invalid correct_option: {correct_raw}"))
    })?;

    QuestionDraft {
        id,
        summary: row.try_get("summary").map_err(ser)?,
        question: row.try_get("question").map_err(ser)?,
        options: options_from_json(&options_raw)?,
        correct_option,
        explanation: row.try_get("explanation").map_err(ser)?,
    }
    .validate()
    .map_err(ser)
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<AttemptRow, StorageError> {
    let question_id = question_id_from_i64(row.try_get::<i64, _>("question_id").map_err(ser)?)?;
    let is_correct: bool = row.try_get("is_correct").map_err(ser)?;
    Ok(AttemptRow {
        id: row.try_get("id").map_err(ser)?,
        record: AttemptRecord::new(question_id, is_correct),
        attempted_at: row.try_get("attempted_at").map_err(ser)?,
    })
}
