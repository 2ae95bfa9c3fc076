use chrono::{DateTime, Utc};

/// Whether the local record has reached the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Synced,
    Pending { outstanding: usize },
    Failed { reason: String },
}

impl SyncStatus {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Counts outstanding store operations and remembers the last failure.
///
/// A later successful write clears the failure: every write carries the full
/// record, so it reconciles whatever an earlier failed write left behind.
#[derive(Debug, Clone, Default)]
pub(crate) struct SyncTracker {
    outstanding: usize,
    failure: Option<String>,
    last_synced_at: Option<DateTime<Utc>>,
}

impl SyncTracker {
    pub(crate) fn begin(&mut self) {
        self.outstanding += 1;
    }

    pub(crate) fn succeed(&mut self, at: DateTime<Utc>) {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.failure = None;
        self.last_synced_at = Some(at);
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.failure = Some(reason.into());
    }

    /// A failure outside a tracked write, such as a refused subscription.
    pub(crate) fn note_failure(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    pub(crate) fn status(&self) -> SyncStatus {
        if self.outstanding > 0 {
            return SyncStatus::Pending {
                outstanding: self.outstanding,
            };
        }
        match &self.failure {
            Some(reason) => SyncStatus::Failed {
                reason: reason.clone(),
            },
            None => SyncStatus::Synced,
        }
    }

    pub(crate) fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn pending_until_completion() {
        let mut tracker = SyncTracker::default();
        assert_eq!(tracker.status(), SyncStatus::Synced);

        tracker.begin();
        tracker.begin();
        assert_eq!(tracker.status(), SyncStatus::Pending { outstanding: 2 });
        assert!(tracker.status().is_pending());

        tracker.succeed(fixed_now());
        tracker.succeed(fixed_now());
        assert_eq!(tracker.status(), SyncStatus::Synced);
        assert_eq!(tracker.last_synced_at(), Some(fixed_now()));
    }

    #[test]
    fn failure_sticks_until_next_success() {
        let mut tracker = SyncTracker::default();
        tracker.begin();
        tracker.fail("connection error: offline");
        assert!(tracker.status().is_failed());

        tracker.begin();
        tracker.succeed(fixed_now());
        assert_eq!(tracker.status(), SyncStatus::Synced);
    }
}
