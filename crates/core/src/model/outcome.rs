use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutcomeError {
    #[error("question index {index} is out of range for {len} questions")]
    OutOfRange { index: usize, len: usize },

    #[error("question {index} already has an outcome")]
    AlreadyRecorded { index: usize },

    #[error("cannot record an unanswered outcome")]
    Unanswered,
}

/// Result of one question for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Unanswered,
    Correct,
    Incorrect,
}

impl Outcome {
    #[must_use]
    pub fn from_answer(is_correct: bool) -> Self {
        if is_correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    #[must_use]
    pub fn is_answered(self) -> bool {
        !matches!(self, Self::Unanswered)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unanswered => "unanswered",
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
        }
    }
}

/// Per-question outcomes for one participant, index-aligned to the question set.
///
/// An index moves from `Unanswered` to `Correct`/`Incorrect` at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeVector(Vec<Outcome>);

impl OutcomeVector {
    /// All-unanswered vector for `len` questions.
    #[must_use]
    pub fn unanswered(len: usize) -> Self {
        Self(vec![Outcome::Unanswered; len])
    }

    /// Wraps outcomes read from storage or delivered by a subscription.
    #[must_use]
    pub fn from_outcomes(outcomes: Vec<Outcome>) -> Self {
        Self(outcomes)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Outcome> {
        self.0.get(index).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Outcome] {
        &self.0
    }

    /// Record the outcome of question `index`.
    ///
    /// # Errors
    ///
    /// Returns `OutcomeError::OutOfRange` for an index past the end,
    /// `OutcomeError::AlreadyRecorded` if the index was already answered, and
    /// `OutcomeError::Unanswered` if `outcome` is `Outcome::Unanswered`.
    pub fn record(&mut self, index: usize, outcome: Outcome) -> Result<(), OutcomeError> {
        if !outcome.is_answered() {
            return Err(OutcomeError::Unanswered);
        }
        let len = self.0.len();
        let slot = self
            .0
            .get_mut(index)
            .ok_or(OutcomeError::OutOfRange { index, len })?;
        if slot.is_answered() {
            return Err(OutcomeError::AlreadyRecorded { index });
        }
        *slot = outcome;
        Ok(())
    }

    /// Number of correct answers.
    #[must_use]
    pub fn score(&self) -> usize {
        self.0.iter().filter(|o| **o == Outcome::Correct).count()
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.0.iter().filter(|o| o.is_answered()).count()
    }

    /// Copy resized to `len`: truncated, or padded with `Unanswered`.
    #[must_use]
    pub fn normalized(&self, len: usize) -> Self {
        let mut outcomes = self.0.clone();
        outcomes.resize(len, Outcome::Unanswered);
        Self(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_write_once() {
        let mut outcomes = OutcomeVector::unanswered(3);
        outcomes.record(1, Outcome::Correct).unwrap();

        assert_eq!(
            outcomes.record(1, Outcome::Incorrect),
            Err(OutcomeError::AlreadyRecorded { index: 1 })
        );
        assert_eq!(
            outcomes.as_slice(),
            &[Outcome::Unanswered, Outcome::Correct, Outcome::Unanswered]
        );
    }

    #[test]
    fn record_rejects_out_of_range_and_unanswered() {
        let mut outcomes = OutcomeVector::unanswered(2);
        assert_eq!(
            outcomes.record(2, Outcome::Correct),
            Err(OutcomeError::OutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            outcomes.record(0, Outcome::Unanswered),
            Err(OutcomeError::Unanswered)
        );
    }

    #[test]
    fn score_counts_only_correct() {
        let outcomes = OutcomeVector::from_outcomes(vec![
            Outcome::Correct,
            Outcome::Incorrect,
            Outcome::Correct,
            Outcome::Unanswered,
        ]);
        assert_eq!(outcomes.score(), 2);
        assert_eq!(outcomes.answered(), 3);
    }

    #[test]
    fn normalized_pads_and_truncates() {
        let outcomes = OutcomeVector::from_outcomes(vec![Outcome::Correct]);
        assert_eq!(
            outcomes.normalized(3).as_slice(),
            &[Outcome::Correct, Outcome::Unanswered, Outcome::Unanswered]
        );

        let long = OutcomeVector::from_outcomes(vec![Outcome::Incorrect; 5]);
        assert_eq!(long.normalized(2).len(), 2);
    }

    #[test]
    fn serializes_as_lowercase_strings() {
        let outcomes = OutcomeVector::from_outcomes(vec![
            Outcome::Correct,
            Outcome::Incorrect,
            Outcome::Unanswered,
        ]);
        let json = serde_json::to_string(&outcomes).unwrap();
        assert_eq!(json, r#"["correct","incorrect","unanswered"]"#);
    }
}
