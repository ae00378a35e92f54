use chrono::Duration;
use quiz_core::model::{AttemptRecord, QuestionDraft, QuestionId};
use quiz_core::time::fixed_now;
use storage::repository::{AttemptRepository, QuestionRepository, StorageError};
use storage::seed::{sample_questions, seed_questions};
use storage::sqlite::SqliteRepository;

fn draft(id: u64, prompt: &str) -> QuestionDraft {
    QuestionDraft {
        id: QuestionId::new(id),
        summary: format!("summary {id}"),
        question: prompt.to_string(),
        options: vec!["alpha".into(), "beta".into(), "gamma".into()],
        correct_option: 2,
        explanation: "because".into(),
    }
}

#[tokio::test]
async fn sqlite_roundtrip_persists_questions_in_id_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_questions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Running migrations twice is a no-op.
    repo.migrate().await.expect("migrate again");

    let q3 = draft(3, "third?").validate().unwrap();
    let q1 = draft(1, "first?").validate().unwrap();
    repo.upsert_question(&q3).await.unwrap();
    repo.upsert_question(&q1).await.unwrap();

    let loaded = repo.load_questions().await.unwrap();
    assert_eq!(loaded, vec![q1.clone(), q3.clone()]);
    assert_eq!(loaded[1].options()[2], "gamma");
    assert_eq!(loaded[1].correct_option(), 2);

    let mut changed = draft(3, "third, reworded?");
    changed.correct_option = 0;
    let changed = changed.validate().unwrap();
    repo.upsert_question(&changed).await.unwrap();

    let loaded = repo.load_questions().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1].prompt(), "third, reworded?");
    assert_eq!(loaded[1].correct_option(), 0);
}

#[tokio::test]
async fn sqlite_records_attempts_in_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_attempts?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let questions = sample_questions().unwrap();
    seed_questions(&repo, &questions[..3]).await.unwrap();

    let now = fixed_now();
    let outcomes = [true, false, true];
    for (i, (q, correct)) in questions.iter().zip(outcomes).enumerate() {
        let at = now + Duration::seconds(i64::try_from(i).unwrap());
        repo.record_attempt(&AttemptRecord::new(q.id(), correct), at)
            .await
            .unwrap();
    }

    let rows = repo.list_attempts().await.unwrap();
    assert_eq!(rows.len(), 3);
    let recorded: Vec<bool> = rows.iter().map(|r| r.record.is_correct).collect();
    assert_eq!(recorded, vec![true, false, true]);
    assert_eq!(rows[0].record.question_id, questions[0].id());
    assert_eq!(rows[0].attempted_at, now);
    assert!(rows[0].id < rows[1].id);
}

#[tokio::test]
async fn sqlite_rejects_attempt_for_unknown_question() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_fk?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let err = repo
        .record_attempt(&AttemptRecord::new(QuestionId::new(404), true), fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Connection(_)));
    assert!(repo.list_attempts().await.unwrap().is_empty());
}
