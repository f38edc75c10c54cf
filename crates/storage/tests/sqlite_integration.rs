use chrono::Duration;
use exam_core::model::{AnswerMap, AssessmentId, AttemptRecord, QuestionId, UserId};
use exam_core::time::fixed_now;
use storage::repository::{AttemptRepository, StorageError};
use storage::sqlite::SqliteRepository;

fn build_record(assessment: &str, correct: u32, completed_offset_secs: i64) -> AttemptRecord {
    let started = fixed_now() + Duration::seconds(completed_offset_secs);
    let completed = started + Duration::seconds(120);
    let mut answers = AnswerMap::new();
    for i in 0..correct {
        answers.insert(QuestionId::new(format!("q{}", i + 1)), 1);
    }
    AttemptRecord::from_persisted(
        AssessmentId::new(assessment),
        answers,
        correct * 4,
        correct,
        0,
        4 - correct,
        4,
        started,
        completed,
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_attempt_fields() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let user = UserId::new("u1");
    let record = build_record("vocab-1", 3, 0);
    let id = repo.append_attempt(&user, &record).await.unwrap();

    let fetched = repo.get_attempt(id).await.expect("fetch");
    assert_eq!(fetched, record);
    assert_eq!(fetched.answers().get(&QuestionId::new("q2")), Some(&1));
    assert_eq!(fetched.score(), 12);
}

#[tokio::test]
async fn sqlite_lists_attempts_newest_first_with_window() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_listing?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let user = UserId::new("u1");
    let assessment = AssessmentId::new("vocab-1");

    let _old = repo
        .append_attempt(&user, &build_record("vocab-1", 1, -86_400 * 30))
        .await
        .unwrap();
    let recent = repo
        .append_attempt(&user, &build_record("vocab-1", 2, 0))
        .await
        .unwrap();
    let newest = repo
        .append_attempt(&user, &build_record("vocab-1", 4, 3_600))
        .await
        .unwrap();

    let all = repo
        .list_attempts(&user, &assessment, None, None, 10)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, newest);
    assert_eq!(all[1].id, recent);

    let windowed = repo
        .list_attempts(
            &user,
            &assessment,
            Some(fixed_now() - Duration::days(7)),
            None,
            10,
        )
        .await
        .unwrap();
    assert_eq!(windowed.len(), 2);

    let limited = repo
        .list_attempts(&user, &assessment, None, None, 1)
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, newest);
}

#[tokio::test]
async fn sqlite_latest_rows_dedup_per_assessment() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_latest?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let user = UserId::new("u1");
    let other = UserId::new("u2");

    repo.append_attempt(&user, &build_record("vocab-1", 1, 0))
        .await
        .unwrap();
    let vocab_latest = repo
        .append_attempt(&user, &build_record("vocab-1", 2, 7_200))
        .await
        .unwrap();
    let grammar = repo
        .append_attempt(&user, &build_record("grammar-1", 3, 0))
        .await
        .unwrap();
    repo.append_attempt(&other, &build_record("vocab-1", 4, 9_999))
        .await
        .unwrap();

    let rows = repo
        .list_latest_rows(
            &user,
            &[
                AssessmentId::new("grammar-1"),
                AssessmentId::new("vocab-1"),
                AssessmentId::new("reading-1"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    assert!(ids.contains(&vocab_latest));
    assert!(ids.contains(&grammar));
}

#[tokio::test]
async fn sqlite_missing_attempt_is_not_found() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_missing?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let err = repo.get_attempt(999).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}
