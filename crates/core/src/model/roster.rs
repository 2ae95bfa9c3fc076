use thiserror::Error;

use crate::model::ids::ParticipantId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RosterError {
    #[error("a battle needs at least two participants, got {count}")]
    TooFewParticipants { count: usize },

    #[error("participant listed more than once: {0}")]
    DuplicateParticipant(ParticipantId),

    #[error("local participant {0} is not in the roster")]
    LocalNotListed(ParticipantId),
}

/// Everyone taking part in one session, plus which of them is on this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    local: ParticipantId,
    participants: Vec<ParticipantId>,
}

impl Roster {
    /// # Errors
    ///
    /// Returns `RosterError` if fewer than two distinct participants are listed,
    /// a participant repeats, or `local` is not among them.
    pub fn new(local: ParticipantId, participants: Vec<ParticipantId>) -> Result<Self, RosterError> {
        if participants.len() < 2 {
            return Err(RosterError::TooFewParticipants {
                count: participants.len(),
            });
        }
        for (i, id) in participants.iter().enumerate() {
            if participants[..i].contains(id) {
                return Err(RosterError::DuplicateParticipant(id.clone()));
            }
        }
        if !participants.contains(&local) {
            return Err(RosterError::LocalNotListed(local));
        }
        Ok(Self {
            local,
            participants,
        })
    }

    #[must_use]
    pub fn local(&self) -> &ParticipantId {
        &self.local
    }

    /// All participants, in roster order.
    #[must_use]
    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    /// Everyone except the local participant, in roster order.
    pub fn opponents(&self) -> impl Iterator<Item = &ParticipantId> {
        self.participants.iter().filter(move |id| **id != self.local)
    }

    #[must_use]
    pub fn is_local(&self, id: &ParticipantId) -> bool {
        self.local == *id
    }
}
