use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{ParticipantRecord, SessionId};
use sqlx::SqlitePool;
use tokio::task::JoinHandle;

use crate::hub::SubscriberHub;

use super::SqliteRepository;
use super::session_repo::fetch_session;

/// How often subscribed sessions are re-read for writes from other processes.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_millis(500);

impl SqliteRepository {
    /// Re-read subscribed sessions every `period` and deliver any change,
    /// including writes made by other processes sharing the database file.
    ///
    /// Deliveries are full snapshots, so a repeat after a local write is
    /// harmless. The task ends once every clone of this repository is dropped.
    #[must_use]
    pub fn spawn_change_poller(&self, period: Duration) -> JoinHandle<()> {
        let pool = self.pool.clone();
        let hub = Arc::downgrade(&self.hub);
        let delivery = Arc::clone(&self.delivery);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            let mut seen: HashMap<SessionId, Vec<ParticipantRecord>> = HashMap::new();
            loop {
                interval.tick().await;
                let Some(hub) = hub.upgrade() else {
                    log::debug!("session store dropped, change poller stopping");
                    break;
                };
                let _order = delivery.lock().await;
                poll_once(&pool, &hub, &mut seen).await;
            }
        })
    }
}

async fn poll_once(
    pool: &SqlitePool,
    hub: &SubscriberHub,
    seen: &mut HashMap<SessionId, Vec<ParticipantRecord>>,
) {
    let sessions = hub.sessions();
    seen.retain(|session, _| sessions.contains(session));

    for session in sessions {
        let records = match fetch_session(pool, &session).await {
            Ok(records) => records,
            Err(err) => {
                log::warn!("polling session {session} failed: {err}");
                continue;
            }
        };
        if seen.get(&session) == Some(&records) {
            continue;
        }
        if let Err(err) = hub.publish(&session, &records) {
            log::warn!("delivering session {session} failed: {err}");
        }
        seen.insert(session, records);
    }
}
