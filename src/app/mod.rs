pub mod acquirers;

use crate::adapters::LocalResultLog;
use crate::config::{MailConfig, Settings};
use crate::core::engine::WatchEngine;
use crate::domain::model::RunReport;
use crate::domain::ports::{Acquirer, Notifier};
use crate::utils::error::Result;
use crate::utils::validation::Validate;

/// One full invocation.
///
/// Settings and mail credentials are validated before the acquirer or the
/// notifier is even built, so a configuration error never touches the network.
pub async fn run_invocation<A, N, L, F, G>(
    settings: &Settings,
    env: L,
    make_acquirer: F,
    make_notifier: G,
) -> Result<RunReport>
where
    A: Acquirer,
    N: Notifier,
    L: Fn(&str) -> Option<String>,
    F: FnOnce(&Settings) -> Result<A>,
    G: FnOnce(MailConfig, &Settings) -> N,
{
    // 驗證配置
    settings.validate()?;
    let mail = MailConfig::from_lookup(env)?;
    let timezone = settings.notify.timezone()?;
    tracing::debug!("Mail config: {:?}", mail);
    tracing::info!("✅ Configuration loaded and validated successfully");

    let acquirer = make_acquirer(settings)?;
    let notifier = make_notifier(mail, settings);

    let mut engine = WatchEngine::new(acquirer, notifier, settings.check_target(), timezone)
        .with_policy(settings.notify.unavailable);
    if let Some(history) = &settings.history {
        engine = engine.with_result_log(Box::new(LocalResultLog::new(&history.path)));
    }

    engine.run().await
}
