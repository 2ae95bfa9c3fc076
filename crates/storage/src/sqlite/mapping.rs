use quiz_core::model::{Outcome, ParticipantId, ParticipantRecord};
use sqlx::Row;

use crate::repository::{RecordDocument, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Encodes outcomes as the JSON array stored in the `progress` column.
pub(crate) fn progress_to_json(progress: &[Outcome]) -> Result<String, StorageError> {
    serde_json::to_string(progress).map_err(ser)
}

pub(crate) fn progress_from_json(raw: &str) -> Result<Vec<Outcome>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_record_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ParticipantRecord, StorageError> {
    let participant_id =
        ParticipantId::new(row.try_get::<String, _>("participant_id").map_err(ser)?)
            .map_err(ser)?;
    let progress: String = row.try_get("progress").map_err(ser)?;

    let document = RecordDocument {
        current_question_index: row.try_get("current_question_index").map_err(ser)?,
        progress: progress_from_json(&progress)?,
    };
    Ok(document.into_record(participant_id))
}
