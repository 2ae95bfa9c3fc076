use quiz_core::model::{FinalScore, ParticipantId, Perspective, Roster, SessionId, Verdict};
use storage::repository::{SessionStore, StorageError};

/// Final result of a battle as seen by one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictReport {
    pub verdict: Verdict,
    pub perspective: Perspective,
    /// Scores in roster order, as read back from the store.
    pub scores: Vec<FinalScore>,
}

impl VerdictReport {
    #[must_use]
    pub fn score_of(&self, participant: &ParticipantId) -> Option<usize> {
        self.scores
            .iter()
            .find(|entry| entry.participant_id == *participant)
            .map(|entry| entry.score)
    }
}

/// Re-read every roster record from the store and decide the battle.
///
/// Uses point-in-time reads rather than the mirrored snapshot so the result
/// reflects what the store holds, not what this device last saw. A record
/// that was never written scores zero.
///
/// # Errors
///
/// Returns the first `StorageError` hit while reading.
pub async fn compute_verdict(
    store: &dyn SessionStore,
    session: &SessionId,
    roster: &Roster,
) -> Result<VerdictReport, StorageError> {
    let mut scores = Vec::with_capacity(roster.participants().len());
    for participant in roster.participants() {
        let score = match store.read(session, participant).await? {
            Some(record) => FinalScore::from_record(&record),
            None => FinalScore::absent(participant.clone()),
        };
        scores.push(score);
    }

    let verdict = Verdict::decide(&scores);
    let perspective = verdict.perspective(roster.local());
    log::info!(
        "session {session}: verdict {verdict:?} ({perspective:?} for {})",
        roster.local()
    );

    Ok(VerdictReport {
        verdict,
        perspective,
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Outcome, OutcomeVector, ParticipantRecord};
    use storage::repository::InMemorySessionStore;

    use Outcome::{Correct as C, Incorrect as I};

    fn id(value: &str) -> ParticipantId {
        ParticipantId::new(value).unwrap()
    }

    fn roster(local: &str) -> Roster {
        Roster::new(id(local), vec![id("user1"), id("user2")]).unwrap()
    }

    async fn seed(store: &InMemorySessionStore, session: &SessionId, who: &str, outcomes: Vec<Outcome>) {
        let record = ParticipantRecord::new(id(who), 2, OutcomeVector::from_outcomes(outcomes));
        store.write(session, &record).await.unwrap();
    }

    #[tokio::test]
    async fn higher_score_wins_from_both_perspectives() {
        let store = InMemorySessionStore::new();
        let session = SessionId::new("juv237").unwrap();
        seed(&store, &session, "user1", vec![C, C, I]).await;
        seed(&store, &session, "user2", vec![C, I, I]).await;

        let first = compute_verdict(&store, &session, &roster("user1")).await.unwrap();
        let second = compute_verdict(&store, &session, &roster("user2")).await.unwrap();

        assert_eq!(first.verdict, Verdict::Winner(id("user1")));
        assert_eq!(first.perspective, Perspective::Win);
        assert_eq!(second.perspective, Perspective::Lose);
        assert_eq!(first.score_of(&id("user1")), Some(2));
        assert_eq!(first.score_of(&id("user2")), Some(1));
    }

    #[tokio::test]
    async fn equal_scores_tie() {
        let store = InMemorySessionStore::new();
        let session = SessionId::new("tie").unwrap();
        seed(&store, &session, "user1", vec![C, I, I]).await;
        seed(&store, &session, "user2", vec![I, I, C]).await;

        for local in ["user1", "user2"] {
            let report = compute_verdict(&store, &session, &roster(local)).await.unwrap();
            assert_eq!(report.verdict, Verdict::Tie);
            assert_eq!(report.perspective, Perspective::Tie);
        }
    }

    #[tokio::test]
    async fn missing_record_scores_zero() {
        let store = InMemorySessionStore::new();
        let session = SessionId::new("solo").unwrap();
        seed(&store, &session, "user1", vec![C, I, I]).await;

        let report = compute_verdict(&store, &session, &roster("user2")).await.unwrap();
        assert_eq!(report.score_of(&id("user2")), Some(0));
        assert_eq!(report.perspective, Perspective::Lose);
    }
}
