mod ids;
mod outcome;
mod participant;
mod question;
mod roster;
mod verdict;

pub use ids::{IdError, ParticipantId, QuestionId, SessionId};
pub use outcome::{Outcome, OutcomeError, OutcomeVector};
pub use participant::{NOT_STARTED_INDEX, ParticipantRecord};
pub use question::{Question, QuestionError, QuestionSet};
pub use roster::{Roster, RosterError};
pub use verdict::{FinalScore, Perspective, Verdict};
