use chrono::{DateTime, Utc};
use quiz_core::model::AttemptRecord;

use super::{
    SqliteRepository,
    mapping::{map_attempt_row, question_id_to_i64},
};
use crate::repository::{AttemptRepository, AttemptRow, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn record_attempt(
        &self,
        record: &AttemptRecord,
        attempted_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        let question_id = question_id_to_i64(record.question_id)?;

        let res = sqlx::query(
            r"
                INSERT INTO quiz_attempts (question_id, is_correct, attempted_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(question_id)
        .bind(record.is_correct)
        .bind(attempted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn list_attempts(&self) -> Result<Vec<AttemptRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, question_id, is_correct, attempted_at
                FROM quiz_attempts
                ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_attempt_row(&row)?);
        }
        Ok(out)
    }
}
