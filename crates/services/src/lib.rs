#![forbid(unsafe_code)]

pub mod app_services;
pub mod battles;
pub mod error;
pub mod question_bank;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use battles::{
    BattleConfig, BattleController, BattleService, BattleSnapshot, SyncStatus, VerdictReport,
};
pub use error::{AppServicesError, BattleServiceError, QuestionBankError};
pub use question_bank::QuestionBank;
