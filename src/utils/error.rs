use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Transport error: {detail}")]
    TransportError { detail: String },

    #[error("Interaction error at step '{step}': {detail}")]
    InteractionError { step: String, detail: String },

    #[error("Email composition error: {0}")]
    EmailError(#[from] lettre::error::Error),

    #[error("Email address error: {0}")]
    AddressError(#[from] lettre::address::AddressError),

    #[error("SMTP error: {0}")]
    SmtpError(#[from] lettre::transport::smtp::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Acquisition,
    Notification,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl WatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WatchError::ConfigError { .. }
            | WatchError::MissingConfigError { .. }
            | WatchError::InvalidConfigValueError { .. }
            | WatchError::TomlError(_)
            | WatchError::HttpClientError(_) => ErrorCategory::Configuration,
            WatchError::TransportError { .. } | WatchError::InteractionError { .. } => {
                ErrorCategory::Acquisition
            }
            WatchError::EmailError(_) | WatchError::AddressError(_) | WatchError::SmtpError(_) => {
                ErrorCategory::Notification
            }
            WatchError::IoError(_) => ErrorCategory::Storage,
        }
    }

    /// 決定退出碼用的嚴重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 沒有郵件憑證就無法通知任何人
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Notification => ErrorSeverity::High,
            // 已寄出錯誤報告，下一次排程會再試
            ErrorCategory::Acquisition => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::Low,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            WatchError::MissingConfigError { field } => {
                format!("Set the {} environment variable before running", field)
            }
            WatchError::ConfigError { .. }
            | WatchError::InvalidConfigValueError { .. }
            | WatchError::TomlError(_) => {
                "Check the configuration file and command line arguments".to_string()
            }
            WatchError::HttpClientError(_) => {
                "Check the [acquire.direct_fetch] header settings".to_string()
            }
            WatchError::TransportError { .. } => {
                "The booking site may be down or blocking requests; wait for the next scheduled run"
                    .to_string()
            }
            WatchError::InteractionError { step, .. } => format!(
                "The booking site layout may have changed; review the selector used by the '{}' step",
                step
            ),
            WatchError::EmailError(_) | WatchError::AddressError(_) => {
                "Check EMAIL_FROM and EMAIL_TO are valid addresses".to_string()
            }
            WatchError::SmtpError(_) => {
                "Check EMAIL_PASSWORD (an app password is usually required) and the SMTP host/port"
                    .to_string()
            }
            WatchError::IoError(_) => "Check file permissions and available disk space".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Acquisition => format!("Availability check failed: {}", self),
            ErrorCategory::Notification => format!("Could not send the notification email: {}", self),
            ErrorCategory::Storage => format!("Local storage problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
