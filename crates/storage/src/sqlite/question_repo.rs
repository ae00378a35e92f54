use quiz_core::model::Question;

use super::{
    SqliteRepository,
    mapping::{map_question_row, options_to_json, question_id_to_i64},
};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn load_questions(&self) -> Result<Vec<Question>, StorageError> {
        // Ordered by id so repeated runs see the same sequence.
        let rows = sqlx::query(
            r"
                SELECT id, summary, question, options, correct_option, explanation
                FROM questions
                ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_question_row(&row)?);
        }
        tracing::debug!(count = out.len(), "loaded questions");
        Ok(out)
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let id = question_id_to_i64(question.id())?;
        let correct = i64::try_from(question.correct_option())
            .map_err(|_| StorageError::Serialization("correct_option overflow".into()))?;

        sqlx::query(
            r"
                INSERT INTO questions (id, summary, question, options, correct_option, explanation)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    summary = excluded.summary,
                    question = excluded.question,
                    options = excluded.options,
                    correct_option = excluded.correct_option,
                    explanation = excluded.explanation
            ",
        )
        .bind(id)
        .bind(question.summary())
        .bind(question.prompt())
        .bind(options_to_json(question.options())?)
        .bind(correct)
        .bind(question.explanation())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
