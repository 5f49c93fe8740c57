use crate::utils::error::{Result, WatchError};
use crate::utils::validation::{validate_required_field, Validate};
use lettre::message::Mailbox;
use std::fmt;

pub const EMAIL_FROM: &str = "EMAIL_FROM";
pub const EMAIL_TO: &str = "EMAIL_TO";
pub const EMAIL_PASSWORD: &str = "EMAIL_PASSWORD";

/// Mail credentials, read once at startup.
#[derive(Clone)]
pub struct MailConfig {
    pub from: String,
    /// One or more recipients; `EMAIL_TO` is comma separated.
    pub to: Vec<String>,
    pub password: String,
}

impl MailConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from = validate_required_field(EMAIL_FROM, lookup(EMAIL_FROM))?;
        let to_raw = validate_required_field(EMAIL_TO, lookup(EMAIL_TO))?;
        let password = validate_required_field(EMAIL_PASSWORD, lookup(EMAIL_PASSWORD))?;

        let to = to_raw
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        let config = Self {
            from: from.trim().to_string(),
            to,
            password,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn sender(&self) -> Result<Mailbox> {
        Ok(self.from.parse::<Mailbox>()?)
    }

    pub fn recipients(&self) -> Result<Vec<Mailbox>> {
        self.to
            .iter()
            .map(|addr| addr.parse::<Mailbox>().map_err(WatchError::from))
            .collect()
    }
}

impl Validate for MailConfig {
    fn validate(&self) -> Result<()> {
        if self.to.is_empty() {
            return Err(WatchError::MissingConfigError {
                field: EMAIL_TO.to_string(),
            });
        }

        self.sender().map_err(|e| WatchError::InvalidConfigValueError {
            field: EMAIL_FROM.to_string(),
            value: self.from.clone(),
            reason: e.to_string(),
        })?;

        for addr in &self.to {
            addr.parse::<Mailbox>()
                .map_err(|e| WatchError::InvalidConfigValueError {
                    field: EMAIL_TO.to_string(),
                    value: addr.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(())
    }
}

// 密碼不可出現在日誌中
impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("password", &"<redacted>")
            .finish()
    }
}
