use quiz_core::model::{ParticipantId, Perspective};
use services::BattleSnapshot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub headline: &'static str,
    pub headline_class: &'static str,
    pub score_line: String,
    pub opponent_lines: Vec<String>,
    /// Final scores have not been read back yet.
    pub pending: bool,
    pub error: Option<String>,
}

#[must_use]
pub fn map_results(snapshot: &BattleSnapshot, local: &ParticipantId) -> ResultsVm {
    let total = snapshot.question_count;
    let score_line = format!("You scored {} out of {total}", snapshot.score);

    let Some(report) = &snapshot.verdict else {
        return ResultsVm {
            headline: "Waiting for results…",
            headline_class: "result-pending",
            score_line,
            opponent_lines: Vec::new(),
            pending: true,
            error: snapshot
                .verdict_error
                .as_ref()
                .map(|_| "Could not read the final scores.".to_owned()),
        };
    };

    let (headline, headline_class) = match report.perspective {
        Perspective::Win => ("You Win! 🎉", "result-win"),
        Perspective::Lose => ("You Lose! 😞", "result-lose"),
        Perspective::Tie => ("It's a Tie! ⚖️", "result-tie"),
    };
    let single = report.scores.len() == 2;
    let opponent_lines = report
        .scores
        .iter()
        .filter(|entry| entry.participant_id != *local)
        .map(|entry| {
            if single {
                format!("Opponent scored {} out of {total}", entry.score)
            } else {
                format!("{} scored {} out of {total}", entry.participant_id, entry.score)
            }
        })
        .collect();

    ResultsVm {
        headline,
        headline_class,
        score_line,
        opponent_lines,
        pending: false,
        error: None,
    }
}
