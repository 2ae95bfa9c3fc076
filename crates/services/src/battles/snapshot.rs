use chrono::{DateTime, Utc};
use quiz_core::battle::BattlePhase;
use quiz_core::model::{OutcomeVector, ParticipantId};

use super::sync::SyncStatus;
use super::verdict::VerdictReport;

/// Immutable view of a controller, published after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleSnapshot {
    pub phase: BattlePhase,
    pub question_count: usize,
    pub local: OutcomeVector,
    /// Mirrored opponents in roster order; never-seen opponents are all unanswered.
    pub opponents: Vec<(ParticipantId, OutcomeVector)>,
    pub countdown_remaining: u32,
    pub selected: Option<String>,
    pub score: usize,
    pub verdict: Option<VerdictReport>,
    /// Why the last final-score read failed; cleared when a retry starts.
    pub verdict_error: Option<String>,
    pub sync: SyncStatus,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub disposed: bool,
}

impl BattleSnapshot {
    /// The first opponent in roster order; the whole story for a two-player battle.
    #[must_use]
    pub fn opponent(&self) -> OutcomeVector {
        self.opponents
            .first()
            .map_or_else(|| OutcomeVector::unanswered(self.question_count), |(_, v)| v.clone())
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        matches!(self.phase, BattlePhase::Reviewing(_))
    }
}
