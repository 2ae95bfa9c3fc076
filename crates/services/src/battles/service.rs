use std::sync::Arc;

use quiz_core::model::{ParticipantRecord, SessionId};
use storage::repository::SessionStore;

use super::config::BattleConfig;
use super::controller::BattleController;
use crate::Clock;
use crate::error::BattleServiceError;

/// Hands out battle controllers bound to one session store.
#[derive(Clone)]
pub struct BattleService {
    clock: Clock,
    sessions: Arc<dyn SessionStore>,
}

impl BattleService {
    #[must_use]
    pub fn new(clock: Clock, sessions: Arc<dyn SessionStore>) -> Self {
        Self { clock, sessions }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Build a controller for `config` and start it.
    pub async fn join(&self, config: BattleConfig) -> BattleController {
        let controller = BattleController::new(config, Arc::clone(&self.sessions), self.clock);
        controller.start().await;
        controller
    }

    /// Create a fresh session id and publish a not-started record for every
    /// roster member so opponents show up before anyone answers.
    ///
    /// # Errors
    ///
    /// Returns `BattleServiceError::Storage` if a record cannot be written.
    pub async fn open_session(
        &self,
        roster: &[quiz_core::model::ParticipantId],
        question_count: usize,
    ) -> Result<SessionId, BattleServiceError> {
        let session = SessionId::generate();
        for participant in roster {
            let record = ParticipantRecord::not_started(participant.clone(), question_count);
            self.sessions.write(&session, &record).await?;
        }
        log::info!("opened session {session} for {} participants", roster.len());
        Ok(session)
    }

    /// Every record currently stored for `session`.
    ///
    /// # Errors
    ///
    /// Returns `BattleServiceError::Storage` if the store cannot be read.
    pub async fn standings(
        &self,
        session: &SessionId,
    ) -> Result<Vec<ParticipantRecord>, BattleServiceError> {
        Ok(self.sessions.list(session).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{ParticipantId, NOT_STARTED_INDEX};
    use quiz_core::time::fixed_now;
    use storage::repository::InMemorySessionStore;

    #[tokio::test]
    async fn open_session_seeds_not_started_records() {
        let service = BattleService::new(
            Clock::fixed(fixed_now()),
            Arc::new(InMemorySessionStore::new()),
        );
        let roster = vec![
            ParticipantId::new("user1").unwrap(),
            ParticipantId::new("user2").unwrap(),
        ];

        let session = service.open_session(&roster, 3).await.unwrap();
        let records = service.standings(&session).await.unwrap();

        assert_eq!(records.len(), 2);
        assert!(
            records
                .iter()
                .all(|r| r.current_question_index == NOT_STARTED_INDEX && r.score() == 0)
        );
    }
}
