use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use quiz_core::model::{ParticipantId, ParticipantRecord, SessionId};
use sqlx::SqlitePool;

use crate::hub::{SnapshotListener, Subscription};
use crate::repository::{SessionStore, StorageError};

use super::SqliteRepository;
use super::mapping::{map_record_row, progress_to_json};

fn conn(err: sqlx::Error) -> StorageError {
    StorageError::Connection(err.to_string())
}

pub(super) async fn fetch_session(
    pool: &SqlitePool,
    session: &SessionId,
) -> Result<Vec<ParticipantRecord>, StorageError> {
    let rows = sqlx::query(
        r"
        SELECT participant_id, current_question_index, progress
        FROM participant_records
        WHERE session_id = ?1
        ORDER BY participant_id
        ",
    )
    .bind(session.as_str())
    .fetch_all(pool)
    .await
    .map_err(conn)?;

    rows.iter().map(map_record_row).collect()
}

#[async_trait]
impl SessionStore for SqliteRepository {
    async fn write(
        &self,
        session: &SessionId,
        record: &ParticipantRecord,
    ) -> Result<(), StorageError> {
        let progress = progress_to_json(record.outcomes.as_slice())?;
        let _order = self.delivery.lock().await;

        sqlx::query(
            r"
            INSERT INTO participant_records (
                session_id,
                participant_id,
                current_question_index,
                progress,
                updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(session_id, participant_id) DO UPDATE SET
                current_question_index = excluded.current_question_index,
                progress = excluded.progress,
                updated_at = excluded.updated_at
            ",
        )
        .bind(session.as_str())
        .bind(record.participant_id.as_str())
        .bind(record.current_question_index)
        .bind(progress)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let records = fetch_session(&self.pool, session).await?;
        self.hub.publish(session, &records)
    }

    async fn read(
        &self,
        session: &SessionId,
        participant: &ParticipantId,
    ) -> Result<Option<ParticipantRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT participant_id, current_question_index, progress
            FROM participant_records
            WHERE session_id = ?1 AND participant_id = ?2
            ",
        )
        .bind(session.as_str())
        .bind(participant.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_record_row).transpose()
    }

    async fn list(&self, session: &SessionId) -> Result<Vec<ParticipantRecord>, StorageError> {
        fetch_session(&self.pool, session).await
    }

    async fn subscribe(
        &self,
        session: &SessionId,
        listener: SnapshotListener,
    ) -> Result<Subscription, StorageError> {
        let _order = self.delivery.lock().await;
        let records = fetch_session(&self.pool, session).await?;
        let subscription = self.hub.register(session, Arc::clone(&listener))?;
        listener(records);
        Ok(subscription)
    }
}
