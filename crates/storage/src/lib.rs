#![forbid(unsafe_code)]

pub mod hub;
pub mod repository;
pub mod sqlite;

pub use hub::{SnapshotListener, SubscriberHub, Subscription};
pub use repository::{InMemorySessionStore, RecordDocument, SessionStore, Storage, StorageError};
