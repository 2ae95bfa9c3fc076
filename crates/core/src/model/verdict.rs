use std::cmp::Ordering;

use crate::model::ids::ParticipantId;
use crate::model::participant::ParticipantRecord;

/// Outcome of a finished battle. Derived from scores, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Winner(ParticipantId),
    Tie,
}

/// How a verdict reads for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    Win,
    Lose,
    Tie,
}

/// Score for one participant as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalScore {
    pub participant_id: ParticipantId,
    pub score: usize,
}

impl FinalScore {
    #[must_use]
    pub fn from_record(record: &ParticipantRecord) -> Self {
        Self {
            participant_id: record.participant_id.clone(),
            score: record.score(),
        }
    }

    /// Score for a participant whose record was never written.
    #[must_use]
    pub fn absent(participant_id: ParticipantId) -> Self {
        Self {
            participant_id,
            score: 0,
        }
    }
}

impl Verdict {
    /// The unique highest score wins; a shared top score is a tie.
    #[must_use]
    pub fn decide(scores: &[FinalScore]) -> Self {
        let mut leader: Option<&FinalScore> = None;
        let mut shared = false;

        for entry in scores {
            match leader.map(|l| entry.score.cmp(&l.score)) {
                None | Some(Ordering::Greater) => {
                    leader = Some(entry);
                    shared = false;
                }
                Some(Ordering::Equal) => shared = true,
                Some(Ordering::Less) => {}
            }
        }

        match leader {
            Some(winner) if !shared => Self::Winner(winner.participant_id.clone()),
            _ => Self::Tie,
        }
    }

    /// Reads the verdict from `local`'s point of view.
    #[must_use]
    pub fn perspective(&self, local: &ParticipantId) -> Perspective {
        match self {
            Self::Tie => Perspective::Tie,
            Self::Winner(id) if id == local => Perspective::Win,
            Self::Winner(_) => Perspective::Lose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(id: &str, score: usize) -> FinalScore {
        FinalScore {
            participant_id: ParticipantId::new(id).unwrap(),
            score,
        }
    }

    #[test]
    fn higher_score_wins() {
        let verdict = Verdict::decide(&[score("user1", 2), score("user2", 1)]);
        let user1 = ParticipantId::new("user1").unwrap();
        let user2 = ParticipantId::new("user2").unwrap();

        assert_eq!(verdict, Verdict::Winner(user1.clone()));
        assert_eq!(verdict.perspective(&user1), Perspective::Win);
        assert_eq!(verdict.perspective(&user2), Perspective::Lose);
    }

    #[test]
    fn equal_scores_tie_for_everyone() {
        let verdict = Verdict::decide(&[score("user1", 1), score("user2", 1)]);
        assert_eq!(verdict, Verdict::Tie);
        assert_eq!(
            verdict.perspective(&ParticipantId::new("user1").unwrap()),
            Perspective::Tie
        );
    }

    #[test]
    fn shared_top_score_among_three_is_a_tie() {
        let verdict = Verdict::decide(&[score("a", 2), score("b", 3), score("c", 3)]);
        assert_eq!(verdict, Verdict::Tie);
    }

    #[test]
    fn lower_tie_does_not_block_a_winner() {
        let verdict = Verdict::decide(&[score("a", 1), score("b", 1), score("c", 3)]);
        assert_eq!(verdict, Verdict::Winner(ParticipantId::new("c").unwrap()));
    }

    #[test]
    fn empty_scores_are_a_tie() {
        assert_eq!(Verdict::decide(&[]), Verdict::Tie);
    }
}
