//! LurkBot library root.

pub mod bot;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod sensors;
pub mod storage;
pub mod transport;
pub mod weather;

pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use error::{Error, Result};
