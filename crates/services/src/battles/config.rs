use std::time::Duration;

use quiz_core::battle::DEFAULT_COUNTDOWN_UNITS;
use quiz_core::model::{ParticipantId, QuestionSet, Roster, SessionId};

use crate::error::BattleServiceError;

/// Length of one countdown unit when the controller drives its own ticker.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Everything a controller needs to know about its battle, injected at construction.
#[derive(Debug, Clone)]
pub struct BattleConfig {
    session_id: SessionId,
    roster: Roster,
    questions: QuestionSet,
    countdown_units: u32,
    tick_period: Option<Duration>,
}

impl BattleConfig {
    #[must_use]
    pub fn new(session_id: SessionId, roster: Roster, questions: QuestionSet) -> Self {
        Self {
            session_id,
            roster,
            questions,
            countdown_units: DEFAULT_COUNTDOWN_UNITS,
            tick_period: Some(DEFAULT_TICK_PERIOD),
        }
    }

    /// Build a config from raw identifiers, e.g. command-line values.
    ///
    /// # Errors
    ///
    /// Returns `BattleServiceError` if an id is blank or the roster is invalid.
    pub fn from_raw(
        session_id: &str,
        local: &str,
        roster: &[String],
        questions: QuestionSet,
    ) -> Result<Self, BattleServiceError> {
        let session_id = SessionId::new(session_id)?;
        let local = ParticipantId::new(local)?;
        let participants = roster
            .iter()
            .map(|raw| ParticipantId::new(raw.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let roster = Roster::new(local, participants)?;
        Ok(Self::new(session_id, roster, questions))
    }

    #[must_use]
    pub fn with_countdown_units(mut self, units: u32) -> Self {
        self.countdown_units = units.max(1);
        self
    }

    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = Some(period);
        self
    }

    /// No ticker task; the caller drives the countdown with `tick()`.
    #[must_use]
    pub fn with_manual_ticks(mut self) -> Self {
        self.tick_period = None;
        self
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub fn local(&self) -> &ParticipantId {
        self.roster.local()
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn countdown_units(&self) -> u32 {
        self.countdown_units
    }

    #[must_use]
    pub fn tick_period(&self) -> Option<Duration> {
        self.tick_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::RosterError;

    fn roster(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_string()).collect()
    }

    #[test]
    fn from_raw_builds_valid_config() {
        let config = BattleConfig::from_raw(
            "juv237",
            "user2",
            &roster(&["user1", "user2"]),
            QuestionSet::financial_basics(),
        )
        .unwrap();

        assert_eq!(config.session_id().as_str(), "juv237");
        assert_eq!(config.local().as_str(), "user2");
        assert_eq!(config.countdown_units(), 10);
        assert_eq!(config.tick_period(), Some(DEFAULT_TICK_PERIOD));
    }

    #[test]
    fn from_raw_rejects_local_outside_roster() {
        let err = BattleConfig::from_raw(
            "juv237",
            "user3",
            &roster(&["user1", "user2"]),
            QuestionSet::financial_basics(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BattleServiceError::Roster(RosterError::LocalNotListed(_))
        ));
    }

    #[test]
    fn builder_overrides() {
        let config = BattleConfig::from_raw(
            "s",
            "a",
            &roster(&["a", "b"]),
            QuestionSet::financial_basics(),
        )
        .unwrap()
        .with_countdown_units(0)
        .with_manual_ticks();

        assert_eq!(config.countdown_units(), 1);
        assert_eq!(config.tick_period(), None);
    }
}
