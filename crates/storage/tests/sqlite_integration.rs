use std::sync::{Arc, Mutex};
use std::time::Duration;

use quiz_core::model::{Outcome, OutcomeVector, ParticipantId, ParticipantRecord, SessionId};
use storage::repository::SessionStore;
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn participant(id: &str) -> ParticipantId {
    ParticipantId::new(id).unwrap()
}

#[tokio::test]
async fn sqlite_roundtrips_participant_record() {
    let repo = connect("memdb_roundtrip").await;
    let session = SessionId::new("juv237").unwrap();

    let record = ParticipantRecord::new(
        participant("user1"),
        1,
        OutcomeVector::from_outcomes(vec![Outcome::Correct, Outcome::Incorrect, Outcome::Unanswered]),
    );
    repo.write(&session, &record).await.unwrap();

    let fetched = repo
        .read(&session, &participant("user1"))
        .await
        .expect("read");
    assert_eq!(fetched, Some(record));

    let missing = repo.read(&session, &participant("user2")).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn sqlite_upsert_overwrites_previous_record() {
    let repo = connect("memdb_upsert").await;
    let session = SessionId::new("s1").unwrap();

    let answered = ParticipantRecord::new(
        participant("user1"),
        2,
        OutcomeVector::from_outcomes(vec![Outcome::Correct; 3]),
    );
    repo.write(&session, &answered).await.unwrap();
    repo.write(&session, &ParticipantRecord::reset(participant("user1"), 3))
        .await
        .unwrap();

    let records = repo.list(&session).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].current_question_index, 0);
    assert_eq!(records[0].outcomes, OutcomeVector::unanswered(3));
}

#[tokio::test]
async fn sqlite_subscription_sees_every_write_in_session() {
    let repo = connect("memdb_subscribe").await;
    let session = SessionId::new("s2").unwrap();
    let other = SessionId::new("s3").unwrap();

    let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let subscription = repo
        .subscribe(
            &session,
            Arc::new(move |records: Vec<ParticipantRecord>| {
                sink.lock().unwrap().push(records.len());
            }),
        )
        .await
        .unwrap();

    repo.write(&session, &ParticipantRecord::reset(participant("user1"), 3))
        .await
        .unwrap();
    repo.write(&other, &ParticipantRecord::reset(participant("user9"), 3))
        .await
        .unwrap();
    repo.write(&session, &ParticipantRecord::reset(participant("user2"), 3))
        .await
        .unwrap();

    subscription.cancel();
    repo.write(&session, &ParticipantRecord::reset(participant("user3"), 3))
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
}

#[tokio::test]
async fn change_poller_delivers_writes_from_another_connection() {
    let watcher = connect("memdb_poller").await;
    let writer = connect("memdb_poller").await;
    let session = SessionId::new("s4").unwrap();

    let seen: Arc<Mutex<Vec<Vec<ParticipantRecord>>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let _subscription = watcher
        .subscribe(
            &session,
            Arc::new(move |records: Vec<ParticipantRecord>| {
                sink.lock().unwrap().push(records);
            }),
        )
        .await
        .unwrap();
    let poller = watcher.spawn_change_poller(Duration::from_millis(10));

    let record = ParticipantRecord::new(
        participant("user2"),
        0,
        OutcomeVector::from_outcomes(vec![Outcome::Correct, Outcome::Unanswered]),
    );
    writer.write(&session, &record).await.unwrap();

    let mut delivered = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if seen.lock().unwrap().iter().any(|batch| batch.contains(&record)) {
            delivered = true;
            break;
        }
    }
    poller.abort();
    assert!(delivered, "poller never delivered the external write");
}
