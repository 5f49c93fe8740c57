use crate::core::decision::{decide, UnavailablePolicy};
use crate::core::extractor::SitesPatternExtractor;
use crate::domain::model::{
    render_timestamp, AcquisitionOutcome, AvailabilityResult, CheckTarget, Classification, RunReport,
};
use crate::domain::ports::{Acquirer, Extractor, Notifier, ResultLog};
use crate::utils::error::{Result, WatchError};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Runs one check: acquire, extract, decide, notify.
pub struct WatchEngine<A: Acquirer, N: Notifier> {
    acquirer: A,
    notifier: N,
    extractor: Box<dyn Extractor>,
    target: CheckTarget,
    policy: UnavailablePolicy,
    timezone: Tz,
    result_log: Option<Box<dyn ResultLog>>,
}

impl<A: Acquirer, N: Notifier> WatchEngine<A, N> {
    pub fn new(acquirer: A, notifier: N, target: CheckTarget, timezone: Tz) -> Self {
        Self {
            acquirer,
            notifier,
            extractor: Box::new(SitesPatternExtractor),
            target,
            policy: UnavailablePolicy::default(),
            timezone,
            result_log: None,
        }
    }

    pub fn with_policy(mut self, policy: UnavailablePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_result_log(mut self, result_log: Box<dyn ResultLog>) -> Self {
        self.result_log = Some(result_log);
        self
    }

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    /// Acquisition failures are reported by email first, then returned as the error.
    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!(
            "🔍 Checking {} for {}",
            self.target.park,
            self.target.stay_range()
        );

        let outcome = self.acquirer.acquire(&self.target).await;
        let checked_at = self.now();
        let decision = decide(&self.target, &outcome, self.extractor.as_ref(), self.policy, checked_at);

        let failure = match outcome {
            AcquisitionOutcome::Document(_) => None,
            AcquisitionOutcome::TransportError(detail) => Some(WatchError::TransportError { detail }),
            AcquisitionOutcome::InteractionError(failure) => Some(WatchError::InteractionError {
                step: failure.step,
                detail: failure.detail,
            }),
        };
        if let Some(err) = &failure {
            tracing::error!("❌ Acquisition failed: {}", err);
        }

        let notified = match &decision.message {
            Some(message) => {
                // 錯誤報告寄送失敗時直接往上拋，不再重試
                self.notifier.send(message).await?;
                true
            }
            None => {
                tracing::info!(
                    "No availability (0 sites) as of {}",
                    render_timestamp(&checked_at)
                );
                false
            }
        };

        if let Some(err) = failure {
            return Err(err);
        }

        let availability = decision.availability.unwrap_or(AvailabilityResult::Unknown);
        self.record(&checked_at, availability).await;

        match decision.classification {
            Classification::Available => tracing::info!("✅ {} sites available!", availability.sites()),
            _ => tracing::info!("✅ Check complete: no availability"),
        }

        Ok(RunReport {
            classification: decision.classification,
            availability,
            notified,
        })
    }

    async fn record(&self, checked_at: &DateTime<Tz>, availability: AvailabilityResult) {
        let Some(log) = &self.result_log else {
            return;
        };

        let count = match availability {
            AvailabilityResult::Count(n) => format!("{} sites", n),
            AvailabilityResult::Unknown => "unknown".to_string(),
        };
        let line = format!(
            "{} - {} - {}",
            render_timestamp(checked_at),
            self.target.park,
            count
        );

        if let Err(e) = log.append(&line).await {
            tracing::warn!("⚠️ Could not record result: {}", e);
        }
    }
}
