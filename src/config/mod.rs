#[cfg(feature = "cli")]
pub mod cli;
pub mod mail;
pub mod settings;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use mail::MailConfig;
pub use settings::Settings;
