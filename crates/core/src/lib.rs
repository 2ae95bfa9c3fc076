#![forbid(unsafe_code)]

pub mod battle;
pub mod model;
pub mod time;

pub use time::Clock;
