//! Quiz battles: one controller per participant, synchronised through a session store.

mod config;
mod controller;
mod service;
mod snapshot;
mod sync;
mod verdict;

pub use config::{BattleConfig, DEFAULT_TICK_PERIOD};
pub use controller::BattleController;
pub use service::BattleService;
pub use snapshot::BattleSnapshot;
pub use sync::SyncStatus;
pub use verdict::{VerdictReport, compute_verdict};
