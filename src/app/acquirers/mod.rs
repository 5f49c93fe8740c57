pub mod direct_fetch;
pub mod interactive;

pub use direct_fetch::DirectFetchAcquirer;
pub use interactive::InteractiveAcquirer;

use crate::config::settings::Settings;
use crate::domain::model::Strategy;
use crate::domain::ports::Acquirer;
use crate::utils::error::Result;

/// Builds the acquirer for the configured strategy.
pub fn build_acquirer(settings: &Settings) -> Result<Box<dyn Acquirer>> {
    match settings.acquire.strategy {
        Strategy::DirectFetch => Ok(Box::new(DirectFetchAcquirer::new(
            settings.acquire.direct_fetch.clone(),
        )?)),
        Strategy::Interactive => build_interactive(settings),
    }
}

#[cfg(feature = "browser")]
fn build_interactive(settings: &Settings) -> Result<Box<dyn Acquirer>> {
    use crate::browser::chromium::ChromiumLauncher;

    let config = settings.acquire.interactive.clone();
    Ok(Box::new(InteractiveAcquirer::new(ChromiumLauncher::new(&config), config)))
}

#[cfg(not(feature = "browser"))]
fn build_interactive(_settings: &Settings) -> Result<Box<dyn Acquirer>> {
    Err(crate::utils::error::WatchError::ConfigError {
        message: "the interactive strategy needs the `browser` feature; use --strategy direct-fetch".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_direct_fetch_acquirer() {
        let mut settings = Settings::default();
        settings.acquire.strategy = Strategy::DirectFetch;
        assert!(build_acquirer(&settings).is_ok());
    }

    #[cfg(feature = "browser")]
    #[test]
    fn test_build_interactive_acquirer_does_not_launch() {
        // 建構時不會啟動瀏覽器，只有 acquire() 才會
        let settings = Settings::default();
        assert!(build_acquirer(&settings).is_ok());
    }
}
