//! Persistence: flat files for channels, prefixes and locations, SQLite for
//! linked accounts. Last write wins; nothing is transactional across files.

pub mod accounts;
pub mod files;

pub use accounts::AccountStore;
pub use files::{FileStore, LocationRecord};
