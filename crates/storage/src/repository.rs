use async_trait::async_trait;
use quiz_core::model::{Outcome, OutcomeVector, ParticipantId, ParticipantRecord, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::hub::{SnapshotListener, SubscriberHub, Subscription};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of a participant record, keyed by participant id within a session.
///
/// ```json
/// { "currentQuestionIndex": 1, "progress": ["correct", "unanswered"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDocument {
    pub current_question_index: i64,
    pub progress: Vec<Outcome>,
}

impl RecordDocument {
    #[must_use]
    pub fn from_record(record: &ParticipantRecord) -> Self {
        Self {
            current_question_index: record.current_question_index,
            progress: record.outcomes.as_slice().to_vec(),
        }
    }

    #[must_use]
    pub fn into_record(self, participant_id: ParticipantId) -> ParticipantRecord {
        ParticipantRecord::new(
            participant_id,
            self.current_question_index,
            OutcomeVector::from_outcomes(self.progress),
        )
    }
}

/// Shared document store holding one record per participant per session.
///
/// Each record has a single writer (its participant) by convention only;
/// the store does not enforce it.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Upsert the full record of `record.participant_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn write(&self, session: &SessionId, record: &ParticipantRecord)
    -> Result<(), StorageError>;

    /// Point-in-time read of one record. `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be reached or the record is malformed.
    async fn read(
        &self,
        session: &SessionId,
        participant: &ParticipantId,
    ) -> Result<Option<ParticipantRecord>, StorageError>;

    /// Every record currently in the session, ordered by participant id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be reached or a record is malformed.
    async fn list(&self, session: &SessionId) -> Result<Vec<ParticipantRecord>, StorageError>;

    /// Deliver the full record collection to `listener` now, and again after
    /// every write to `session`, until the returned handle is released.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the initial snapshot cannot be read.
    async fn subscribe(
        &self,
        session: &SessionId,
        listener: SnapshotListener,
    ) -> Result<Subscription, StorageError>;
}

type SessionDocuments = BTreeMap<ParticipantId, RecordDocument>;

/// Simple in-memory store for testing and local play.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, SessionDocuments>>>,
    hub: Arc<SubscriberHub>,
    // Serialises snapshot + delivery so subscribers never see an older snapshot last.
    delivery: Arc<tokio::sync::Mutex<()>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            hub: SubscriberHub::new(),
            delivery: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    #[must_use]
    pub fn hub(&self) -> &Arc<SubscriberHub> {
        &self.hub
    }

    fn snapshot(&self, session: &SessionId) -> Result<Vec<ParticipantRecord>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(session)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| doc.clone().into_record(id.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn write(
        &self,
        session: &SessionId,
        record: &ParticipantRecord,
    ) -> Result<(), StorageError> {
        let _order = self.delivery.lock().await;
        {
            let mut guard = self
                .sessions
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard
                .entry(session.clone())
                .or_default()
                .insert(record.participant_id.clone(), RecordDocument::from_record(record));
        }
        let records = self.snapshot(session)?;
        self.hub.publish(session, &records)
    }

    async fn read(
        &self,
        session: &SessionId,
        participant: &ParticipantId,
    ) -> Result<Option<ParticipantRecord>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(session)
            .and_then(|docs| docs.get(participant))
            .map(|doc| doc.clone().into_record(participant.clone())))
    }

    async fn list(&self, session: &SessionId) -> Result<Vec<ParticipantRecord>, StorageError> {
        self.snapshot(session)
    }

    async fn subscribe(
        &self,
        session: &SessionId,
        listener: SnapshotListener,
    ) -> Result<Subscription, StorageError> {
        let _order = self.delivery.lock().await;
        let records = self.snapshot(session)?;
        let subscription = self.hub.register(session, Arc::clone(&listener))?;
        listener(records);
        Ok(subscription)
    }
}

/// Aggregates the session store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        Self { sessions }
    }
}
