//! Single-participant battle state machine.
//!
//! Pure and synchronous: no timers, no storage. The services layer drives it
//! from user input and a ticker, and persists whatever it reports.

use crate::model::{Outcome, OutcomeVector, ParticipantId, ParticipantRecord, QuestionSet};

/// Countdown length used when none is configured.
pub const DEFAULT_COUNTDOWN_UNITS: u32 = 10;

//
// ─── PHASE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    /// Waiting for an answer to question `i`; the countdown is running.
    Answering(usize),
    /// Question `i` is closed (answered or timed out); waiting for `advance`.
    Reviewing(usize),
    Finished,
}

impl BattlePhase {
    /// Index of the question on screen, if any.
    #[must_use]
    pub fn question_index(self) -> Option<usize> {
        match self {
            Self::Answering(i) | Self::Reviewing(i) => Some(i),
            Self::Finished => None,
        }
    }

    #[must_use]
    pub fn is_answering(self) -> bool {
        matches!(self, Self::Answering(_))
    }

    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

//
// ─── COUNTDOWN ────────────────────────────────────────────────────────────────
//

/// Per-question countdown, counted in whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    units: u32,
    remaining: u32,
    armed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Running { remaining: u32 },
    Expired,
    Idle,
}

impl Countdown {
    /// An armed countdown of `units` (at least one).
    #[must_use]
    pub fn armed(units: u32) -> Self {
        let units = units.max(1);
        Self {
            units,
            remaining: units,
            armed: true,
        }
    }

    pub fn rearm(&mut self) {
        self.remaining = self.units;
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn units(&self) -> u32 {
        self.units
    }

    pub fn tick(&mut self) -> CountdownTick {
        if !self.armed {
            return CountdownTick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.armed = false;
            CountdownTick::Expired
        } else {
            CountdownTick::Running {
                remaining: self.remaining,
            }
        }
    }
}

//
// ─── TRANSITION RESULTS ───────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The answer was recorded at `index`; the caller should persist the record.
    Recorded { index: usize, outcome: Outcome },
    /// Not in `Answering`; nothing changed.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining: u32 },
    /// Time ran out on `index`; it stays unanswered.
    Expired { index: usize },
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Next { index: usize },
    Finished,
    Ignored,
}

//
// ─── STATE ────────────────────────────────────────────────────────────────────
//

/// Local progression of one participant through the question set.
#[derive(Debug, Clone)]
pub struct BattleState {
    questions: QuestionSet,
    phase: BattlePhase,
    outcomes: OutcomeVector,
    countdown: Countdown,
    selected: Option<String>,
}

impl BattleState {
    #[must_use]
    pub fn new(questions: QuestionSet, countdown_units: u32) -> Self {
        let outcomes = OutcomeVector::unanswered(questions.len());
        Self {
            questions,
            phase: BattlePhase::Answering(0),
            outcomes,
            countdown: Countdown::armed(countdown_units),
            selected: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    #[must_use]
    pub fn outcomes(&self) -> &OutcomeVector {
        &self.outcomes
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    /// Choice submitted for the question currently under review.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.outcomes.score()
    }

    /// Record an answer for the open question.
    pub fn submit(&mut self, choice: &str) -> SubmitOutcome {
        let BattlePhase::Answering(index) = self.phase else {
            return SubmitOutcome::Ignored;
        };
        let Some(question) = self.questions.get(index) else {
            return SubmitOutcome::Ignored;
        };

        let outcome = Outcome::from_answer(question.is_correct(choice));
        if self.outcomes.record(index, outcome).is_err() {
            return SubmitOutcome::Ignored;
        }

        self.selected = Some(choice.to_owned());
        self.countdown.disarm();
        self.phase = BattlePhase::Reviewing(index);
        SubmitOutcome::Recorded { index, outcome }
    }

    /// One countdown unit elapsed.
    pub fn tick(&mut self) -> TickOutcome {
        let BattlePhase::Answering(index) = self.phase else {
            return TickOutcome::Ignored;
        };
        match self.countdown.tick() {
            CountdownTick::Running { remaining } => TickOutcome::Running { remaining },
            CountdownTick::Expired => {
                self.phase = BattlePhase::Reviewing(index);
                TickOutcome::Expired { index }
            }
            CountdownTick::Idle => TickOutcome::Ignored,
        }
    }

    /// Move past the question under review.
    pub fn advance(&mut self) -> AdvanceOutcome {
        let BattlePhase::Reviewing(index) = self.phase else {
            return AdvanceOutcome::Ignored;
        };

        self.selected = None;
        if index >= self.questions.last_index() {
            self.phase = BattlePhase::Finished;
            self.countdown.disarm();
            return AdvanceOutcome::Finished;
        }

        let next = index + 1;
        self.phase = BattlePhase::Answering(next);
        self.countdown.rearm();
        AdvanceOutcome::Next { index: next }
    }

    /// Back to `Answering(0)` with nothing answered.
    pub fn restart(&mut self) {
        self.phase = BattlePhase::Answering(0);
        self.outcomes = OutcomeVector::unanswered(self.questions.len());
        self.countdown.rearm();
        self.selected = None;
    }

    /// The record this participant publishes to the session.
    #[must_use]
    pub fn to_record(&self, participant_id: ParticipantId) -> ParticipantRecord {
        let index = match self.phase {
            BattlePhase::Answering(i) | BattlePhase::Reviewing(i) => i,
            BattlePhase::Finished => self.questions.last_index(),
        };
        ParticipantRecord::new(
            participant_id,
            i64::try_from(index).unwrap_or(i64::MAX),
            self.outcomes.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> BattleState {
        BattleState::new(QuestionSet::financial_basics(), DEFAULT_COUNTDOWN_UNITS)
    }

    fn correct(state: &BattleState, index: usize) -> String {
        state
            .questions()
            .get(index)
            .unwrap()
            .correct_option()
            .to_owned()
    }

    #[test]
    fn starts_answering_first_question() {
        let state = state();
        assert_eq!(state.phase(), BattlePhase::Answering(0));
        assert_eq!(state.countdown().remaining(), 10);
        assert!(state.countdown().is_armed());
        assert_eq!(state.outcomes().answered(), 0);
    }

    #[test]
    fn submit_marks_only_the_open_index() {
        for index in 0..3 {
            let mut state = state();
            for _ in 0..index {
                state.tick_out();
                state.advance();
            }

            let outcome = state.submit(&correct(&state, index));
            assert_eq!(
                outcome,
                SubmitOutcome::Recorded {
                    index,
                    outcome: Outcome::Correct
                }
            );
            for (i, value) in state.outcomes().as_slice().iter().enumerate() {
                if i == index {
                    assert_eq!(*value, Outcome::Correct);
                } else {
                    assert_eq!(*value, Outcome::Unanswered);
                }
            }
            assert_eq!(state.phase(), BattlePhase::Reviewing(index));
        }
    }

    #[test]
    fn wrong_choice_is_incorrect() {
        let mut state = state();
        let outcome = state.submit("Market trends");
        assert_eq!(
            outcome,
            SubmitOutcome::Recorded {
                index: 0,
                outcome: Outcome::Incorrect
            }
        );
        assert_eq!(state.selected(), Some("Market trends"));
        assert!(!state.countdown().is_armed());
    }

    #[test]
    fn second_submit_is_ignored() {
        let mut state = state();
        state.submit("Market trends");
        let before = state.outcomes().clone();

        assert_eq!(state.submit(&correct(&state, 0)), SubmitOutcome::Ignored);
        assert_eq!(state.outcomes(), &before);
        assert_eq!(state.phase(), BattlePhase::Reviewing(0));
        assert_eq!(state.selected(), Some("Market trends"));
    }

    #[test]
    fn countdown_expiry_leaves_question_unanswered() {
        let mut state = state();
        for remaining in (1..10).rev() {
            assert_eq!(state.tick(), TickOutcome::Running { remaining });
        }
        assert_eq!(state.tick(), TickOutcome::Expired { index: 0 });
        assert_eq!(state.phase(), BattlePhase::Reviewing(0));
        assert_eq!(state.outcomes().get(0), Some(Outcome::Unanswered));
        assert_eq!(state.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn advance_rearms_countdown_and_finishes_after_last() {
        let mut state = state();
        state.tick();
        state.submit("Market trends");
        assert_eq!(state.advance(), AdvanceOutcome::Next { index: 1 });
        assert_eq!(state.countdown().remaining(), 10);
        assert_eq!(state.selected(), None);

        state.submit("Expenses incurred");
        assert_eq!(state.advance(), AdvanceOutcome::Next { index: 2 });
        state.submit("Revenue");
        assert_eq!(state.advance(), AdvanceOutcome::Finished);
        assert!(state.phase().is_finished());
        assert_eq!(state.advance(), AdvanceOutcome::Ignored);
        assert_eq!(state.score(), 1);
    }

    #[test]
    fn advance_outside_review_is_ignored() {
        let mut state = state();
        assert_eq!(state.advance(), AdvanceOutcome::Ignored);
        assert_eq!(state.phase(), BattlePhase::Answering(0));
    }

    #[test]
    fn restart_returns_to_initial_state() {
        let mut state = state();
        state.submit(&correct(&state, 0));
        state.advance();
        state.tick();
        state.restart();

        assert_eq!(state.phase(), BattlePhase::Answering(0));
        assert_eq!(state.outcomes(), &OutcomeVector::unanswered(3));
        assert_eq!(state.countdown().remaining(), 10);
    }

    #[test]
    fn record_reflects_current_index() {
        let mut state = state();
        state.submit(&correct(&state, 0));
        let record = state.to_record(ParticipantId::new("user1").unwrap());
        assert_eq!(record.current_question_index, 0);
        assert_eq!(record.outcomes.get(0), Some(Outcome::Correct));
    }

    #[test]
    fn zero_units_still_counts_one() {
        let mut countdown = Countdown::armed(0);
        assert_eq!(countdown.units(), 1);
        assert_eq!(countdown.tick(), CountdownTick::Expired);
        assert_eq!(countdown.tick(), CountdownTick::Idle);
    }

    impl BattleState {
        fn tick_out(&mut self) {
            while self.tick() != TickOutcome::Ignored {}
        }
    }
}
