pub mod adapters;
pub mod app;
pub mod browser;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::{MailConfig, Settings};

pub use adapters::{ConsoleNotifier, SmtpNotifier};
pub use app::{acquirers::build_acquirer, run_invocation};
pub use core::engine::WatchEngine;
pub use utils::error::{Result, WatchError};
