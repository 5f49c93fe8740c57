// Adapters layer: concrete implementations for external systems (mail, local files).

pub mod console;
pub mod result_log;
pub mod smtp;

pub use console::ConsoleNotifier;
pub use result_log::LocalResultLog;
pub use smtp::SmtpNotifier;
