use crate::model::ids::ParticipantId;
use crate::model::outcome::OutcomeVector;

/// Index reported for a participant that has not written anything yet.
pub const NOT_STARTED_INDEX: i64 = -1;

/// One participant's progress within a session.
///
/// Only the owning participant writes it; everyone in the session reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub participant_id: ParticipantId,
    pub current_question_index: i64,
    pub outcomes: OutcomeVector,
}

impl ParticipantRecord {
    #[must_use]
    pub fn new(
        participant_id: ParticipantId,
        current_question_index: i64,
        outcomes: OutcomeVector,
    ) -> Self {
        Self {
            participant_id,
            current_question_index: current_question_index.max(NOT_STARTED_INDEX),
            outcomes,
        }
    }

    /// Record written for every roster slot on restart.
    #[must_use]
    pub fn reset(participant_id: ParticipantId, question_count: usize) -> Self {
        Self {
            participant_id,
            current_question_index: 0,
            outcomes: OutcomeVector::unanswered(question_count),
        }
    }

    /// Stand-in for a participant that has never written a record.
    #[must_use]
    pub fn not_started(participant_id: ParticipantId, question_count: usize) -> Self {
        Self {
            participant_id,
            current_question_index: NOT_STARTED_INDEX,
            outcomes: OutcomeVector::unanswered(question_count),
        }
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.outcomes.score()
    }
}
