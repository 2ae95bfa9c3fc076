use quiz_core::battle::BattlePhase;
use quiz_core::model::{Outcome, OutcomeVector, QuestionSet};
use services::{BattleSnapshot, SyncStatus};

use crate::vm::time_fmt::format_synced_at;

//
// ─── INDICATOR ────────────────────────────────────────────────────────────────
//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellVm {
    pub class: &'static str,
    pub title: &'static str,
}

impl From<Outcome> for CellVm {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Unanswered => Self {
                class: "cell-unanswered",
                title: "Not answered",
            },
            Outcome::Correct => Self {
                class: "cell-correct",
                title: "Correct",
            },
            Outcome::Incorrect => Self {
                class: "cell-incorrect",
                title: "Incorrect",
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndicatorRowVm {
    pub label: String,
    pub cells: Vec<CellVm>,
}

impl IndicatorRowVm {
    fn new(label: impl Into<String>, outcomes: &OutcomeVector) -> Self {
        Self {
            label: label.into(),
            cells: outcomes.as_slice().iter().copied().map(CellVm::from).collect(),
        }
    }
}

/// Local row first, then one row per opponent in roster order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndicatorVm {
    pub rows: Vec<IndicatorRowVm>,
}

#[must_use]
pub fn map_indicator(snapshot: &BattleSnapshot) -> IndicatorVm {
    let mut rows = vec![IndicatorRowVm::new("You", &snapshot.local)];
    let single = snapshot.opponents.len() == 1;
    for (id, outcomes) in &snapshot.opponents {
        let label = if single {
            "Opponent".to_owned()
        } else {
            id.to_string()
        };
        rows.push(IndicatorRowVm::new(label, outcomes));
    }
    IndicatorVm { rows }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub label: String,
    pub class: &'static str,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedbackVm {
    Correct,
    Incorrect { answer: String },
    TimedOut { answer: String },
}

impl FeedbackVm {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Correct => "Correct! Well done.".to_owned(),
            Self::Incorrect { answer } => format!("Incorrect. The correct answer is {answer}"),
            Self::TimedOut { answer } => format!("Time's up. The correct answer is {answer}"),
        }
    }

    #[must_use]
    pub fn class(&self) -> &'static str {
        match self {
            Self::Correct => "feedback feedback-correct",
            Self::Incorrect { .. } | Self::TimedOut { .. } => "feedback feedback-incorrect",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub prompt: String,
    pub options: Vec<OptionVm>,
    pub feedback: Option<FeedbackVm>,
}

/// The open or reviewed question. `None` once the battle is finished.
#[must_use]
pub fn map_question(questions: &QuestionSet, snapshot: &BattleSnapshot) -> Option<QuestionVm> {
    let (index, reviewing) = match snapshot.phase {
        BattlePhase::Answering(i) => (i, false),
        BattlePhase::Reviewing(i) => (i, true),
        BattlePhase::Finished => return None,
    };
    let question = questions.get(index)?;
    let selected = snapshot.selected.as_deref();

    let options = question
        .options()
        .iter()
        .map(|option| {
            let class = if !reviewing {
                "option"
            } else if question.is_correct(option) {
                "option option-correct"
            } else if selected == Some(option.as_str()) {
                "option option-incorrect"
            } else {
                "option"
            };
            OptionVm {
                label: option.clone(),
                class,
                disabled: reviewing,
            }
        })
        .collect();

    let feedback = reviewing.then(|| {
        let answer = question.correct_option().to_owned();
        match selected {
            Some(choice) if question.is_correct(choice) => FeedbackVm::Correct,
            Some(_) => FeedbackVm::Incorrect { answer },
            None => FeedbackVm::TimedOut { answer },
        }
    });

    Some(QuestionVm {
        prompt: question.prompt().to_owned(),
        options,
        feedback,
    })
}

//
// ─── BATTLE ───────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleVm {
    pub timer_label: String,
    pub progress_label: String,
    pub progress_percent: u32,
    pub next_label: Option<&'static str>,
    pub sync_label: Option<String>,
    pub question: Option<QuestionVm>,
    pub indicator: IndicatorVm,
}

#[must_use]
pub fn map_battle(questions: &QuestionSet, snapshot: &BattleSnapshot) -> BattleVm {
    let total = snapshot.question_count.max(1);
    let index = snapshot
        .phase
        .question_index()
        .unwrap_or(snapshot.question_count.saturating_sub(1));
    let position = index + 1;
    let percent = u32::try_from(position * 100 / total).unwrap_or(100);

    let next_label = match snapshot.phase {
        BattlePhase::Reviewing(i) if i + 1 >= snapshot.question_count => Some("See Results"),
        BattlePhase::Reviewing(_) => Some("Next Question"),
        BattlePhase::Answering(_) | BattlePhase::Finished => None,
    };

    BattleVm {
        timer_label: format!("{}s", snapshot.countdown_remaining),
        progress_label: format!("Question {position} of {}", snapshot.question_count),
        progress_percent: percent,
        next_label,
        sync_label: sync_label(&snapshot.sync, snapshot),
        question: map_question(questions, snapshot),
        indicator: map_indicator(snapshot),
    }
}

fn sync_label(status: &SyncStatus, snapshot: &BattleSnapshot) -> Option<String> {
    match status {
        SyncStatus::Pending { .. } => Some("Saving…".to_owned()),
        SyncStatus::Failed { reason } => Some(format!("Not saved: {reason}")),
        SyncStatus::Synced => snapshot.last_synced_at.map(format_synced_at),
    }
}
