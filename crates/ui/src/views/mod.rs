mod battle;
mod indicator;
mod question;
mod results;

pub use battle::QuizBattleView;
pub use indicator::BattleIndicator;
pub use question::QuestionCard;
pub use results::ResultsView;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;
