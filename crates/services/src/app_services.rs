use std::sync::Arc;

use storage::repository::Storage;
use storage::sqlite::DEFAULT_POLL_PERIOD;

use crate::Clock;
use crate::battles::BattleService;
use crate::error::AppServicesError;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    battles: Arc<BattleService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, following writes from other
    /// app instances that share the database file.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite_shared(db_url, DEFAULT_POLL_PERIOD).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services backed by in-memory storage, for tests and offline play.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let battles = Arc::new(BattleService::new(clock, Arc::clone(&storage.sessions)));
        Self { battles }
    }

    #[must_use]
    pub fn battles(&self) -> Arc<BattleService> {
        Arc::clone(&self.battles)
    }
}
