mod battle_vm;
mod results_vm;
mod time_fmt;

pub use battle_vm::{
    BattleVm, CellVm, FeedbackVm, IndicatorRowVm, IndicatorVm, OptionVm, QuestionVm, map_battle,
    map_indicator, map_question,
};
pub use results_vm::{ResultsVm, map_results};
