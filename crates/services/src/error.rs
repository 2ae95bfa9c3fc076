//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{IdError, QuestionError, RosterError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors raised while configuring a battle.
///
/// Store failures during play never surface here; the controller logs them
/// and reports them through `SyncStatus`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BattleServiceError {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while loading a question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionBankError {
    #[error("cannot read question bank: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed question bank: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Battle(#[from] BattleServiceError),
    #[error(transparent)]
    QuestionBank(#[from] QuestionBankError),
}
