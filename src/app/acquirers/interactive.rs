use crate::browser::{BrowserLauncher, BrowserSession};
use crate::config::settings::{InteractiveConfig, Locator};
use crate::domain::model::{AcquisitionOutcome, CheckTarget, Document, InteractionFailure, Strategy};
use crate::domain::ports::Acquirer;
use async_trait::async_trait;
use std::fmt::Write;
use std::future::Future;
use std::time::Duration;

pub const STEP_LAUNCH_BROWSER: &str = "launch_browser";
pub const STEP_OPEN_LANDING_PAGE: &str = "open_landing_page";
pub const STEP_BOOK_A_STAY: &str = "book_a_stay";
pub const STEP_LOCATION_SEARCH: &str = "location_search";
pub const STEP_ARRIVAL_DATE: &str = "arrival_date";
pub const STEP_NIGHTS: &str = "nights";
pub const STEP_SHOW_RESULTS: &str = "show_results";
pub const STEP_RESULTS: &str = "results";

type StepResult<T> = std::result::Result<T, InteractionFailure>;

/// Drives the booking site's multi-step search UI in a browser.
///
/// The document handed to the extractor is the results element's attribute
/// (the accessible label by default), or empty text when it has none.
pub struct InteractiveAcquirer<L: BrowserLauncher> {
    launcher: L,
    config: InteractiveConfig,
}

impl<L: BrowserLauncher> InteractiveAcquirer<L> {
    pub fn new(launcher: L, config: InteractiveConfig) -> Self {
        Self { launcher, config }
    }

    fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.config.step_timeout_seconds)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }

    async fn step<T, F>(&self, name: &str, limit: Duration, work: F) -> StepResult<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        tracing::debug!("▶️ Step '{}' (timeout {:?})", name, limit);
        match tokio::time::timeout(limit, work).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(InteractionFailure::new(name, format!("{:#}", e))),
            Err(_) => Err(InteractionFailure::new(
                name,
                format!("timed out after {}ms", limit.as_millis()),
            )),
        }
    }

    async fn wait_for(&self, session: &dyn BrowserSession, locator: &Locator) -> anyhow::Result<()> {
        loop {
            if session.exists(locator).await? {
                return Ok(());
            }
            tokio::time::sleep(self.poll_interval()).await;
        }
    }

    async fn run_flow(&self, session: &dyn BrowserSession, target: &CheckTarget) -> StepResult<String> {
        let selectors = &self.config.selectors;
        let step_timeout = self.step_timeout();

        self.step(
            STEP_OPEN_LANDING_PAGE,
            Duration::from_secs(self.config.navigation_timeout_seconds),
            session.goto(&self.config.landing_url),
        )
        .await?;

        self.step(STEP_BOOK_A_STAY, step_timeout, async {
            self.wait_for(session, &selectors.book_a_stay).await?;
            session.click(&selectors.book_a_stay).await
        })
        .await?;

        self.step(STEP_LOCATION_SEARCH, step_timeout, async {
            self.wait_for(session, &selectors.location_input).await?;
            session.fill(&selectors.location_input, &target.park).await?;
            session.press_enter(&selectors.location_input).await
        })
        .await?;

        let mut arrival = String::new();
        write!(arrival, "{}", target.arrival.format(&self.config.date_format)).map_err(|_| {
            InteractionFailure::new(
                STEP_ARRIVAL_DATE,
                format!("invalid date_format '{}'", self.config.date_format),
            )
        })?;
        self.step(STEP_ARRIVAL_DATE, step_timeout, async {
            self.wait_for(session, &selectors.arrival_date).await?;
            session.fill(&selectors.arrival_date, &arrival).await
        })
        .await?;

        let nights = target.nights.to_string();
        self.step(STEP_NIGHTS, step_timeout, async {
            self.wait_for(session, &selectors.nights).await?;
            session.fill(&selectors.nights, &nights).await
        })
        .await?;

        self.step(STEP_SHOW_RESULTS, step_timeout, async {
            self.wait_for(session, &selectors.show_results).await?;
            session.click(&selectors.show_results).await
        })
        .await?;

        let results = selectors.results.for_park(&target.park);
        let label = self
            .step(STEP_RESULTS, step_timeout, async {
                self.wait_for(session, &results).await?;
                session.attribute(&results, &selectors.results_attribute).await
            })
            .await?;

        if label.is_none() {
            tracing::warn!(
                "Results element has no '{}' attribute; treating as unknown availability",
                selectors.results_attribute
            );
        }
        Ok(label.unwrap_or_default())
    }
}

#[async_trait]
impl<L: BrowserLauncher> Acquirer for InteractiveAcquirer<L> {
    async fn acquire(&self, target: &CheckTarget) -> AcquisitionOutcome {
        let session = match self
            .step(
                STEP_LAUNCH_BROWSER,
                Duration::from_secs(self.config.launch_timeout_seconds),
                self.launcher.launch(),
            )
            .await
        {
            Ok(session) => session,
            Err(failure) => return AcquisitionOutcome::InteractionError(failure),
        };

        let flow = self.run_flow(session.as_ref(), target).await;

        // 無論成功或失敗都要關閉瀏覽器，但不能讓關閉卡住整個執行
        let close_timeout = self.step_timeout();
        match tokio::time::timeout(close_timeout, session.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("⚠️ Failed to close browser session: {:#}", e),
            Err(_) => tracing::warn!(
                "⚠️ Browser session did not close within {}ms; abandoning it",
                close_timeout.as_millis()
            ),
        }

        match flow {
            Ok(label) => {
                tracing::debug!("Results label: {:?}", label);
                AcquisitionOutcome::Document(Document {
                    content: label,
                    source: Strategy::Interactive,
                })
            }
            Err(failure) => {
                tracing::warn!("Interaction failed at step '{}': {}", failure.step, failure.detail);
                AcquisitionOutcome::InteractionError(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Records every call; the element named `missing` never appears.
    #[derive(Clone, Default)]
    struct FakeSession {
        calls: Arc<Mutex<Vec<String>>>,
        closed: Arc<Mutex<usize>>,
        missing: Option<String>,
        label: Option<String>,
        hang_on_close: bool,
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn goto(&self, url: &str) -> anyhow::Result<()> {
            self.calls.lock().await.push(format!("goto {}", url));
            Ok(())
        }

        async fn exists(&self, locator: &Locator) -> anyhow::Result<bool> {
            Ok(self.missing.as_deref() != Some(locator.expression()))
        }

        async fn click(&self, locator: &Locator) -> anyhow::Result<()> {
            self.calls.lock().await.push(format!("click {}", locator.expression()));
            Ok(())
        }

        async fn fill(&self, locator: &Locator, value: &str) -> anyhow::Result<()> {
            self.calls
                .lock()
                .await
                .push(format!("fill {} = {}", locator.expression(), value));
            Ok(())
        }

        async fn press_enter(&self, locator: &Locator) -> anyhow::Result<()> {
            self.calls.lock().await.push(format!("enter {}", locator.expression()));
            Ok(())
        }

        async fn attribute(&self, locator: &Locator, name: &str) -> anyhow::Result<Option<String>> {
            self.calls
                .lock()
                .await
                .push(format!("attr {} {}", locator.expression(), name));
            Ok(self.label.clone())
        }

        async fn close(self: Box<Self>) -> anyhow::Result<()> {
            *self.closed.lock().await += 1;
            if self.hang_on_close {
                std::future::pending::<()>().await;
            }
            Ok(())
        }
    }

    struct FakeLauncher {
        session: FakeSession,
        fail: bool,
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        async fn launch(&self) -> anyhow::Result<Box<dyn BrowserSession>> {
            if self.fail {
                anyhow::bail!("Chromium not found");
            }
            Ok(Box::new(self.session.clone()))
        }
    }

    fn target() -> CheckTarget {
        CheckTarget::new(
            "John Pennekamp Coral Reef State Park",
            NaiveDate::from_ymd_opt(2026, 4, 4).unwrap(),
            1,
        )
    }

    fn config() -> InteractiveConfig {
        InteractiveConfig {
            step_timeout_seconds: 1,
            poll_interval_ms: 10,
            ..InteractiveConfig::default()
        }
    }

    #[tokio::test]
    async fn test_full_flow_returns_results_label() {
        let session = FakeSession {
            label: Some("John Pennekamp Coral Reef State Park, 3 sites available".to_string()),
            ..FakeSession::default()
        };
        let acquirer = InteractiveAcquirer::new(
            FakeLauncher {
                session: session.clone(),
                fail: false,
            },
            config(),
        );

        let outcome = acquirer.acquire(&target()).await;

        assert_eq!(
            outcome,
            AcquisitionOutcome::Document(Document {
                content: "John Pennekamp Coral Reef State Park, 3 sites available".to_string(),
                source: Strategy::Interactive,
            })
        );

        let calls = session.calls.lock().await.clone();
        assert_eq!(
            calls,
            vec![
                "goto https://www.floridastateparks.org/stay-night".to_string(),
                "click //a[contains(normalize-space(.), 'Book your overnight stay today')]".to_string(),
                "fill #home-search-location-input = John Pennekamp Coral Reef State Park".to_string(),
                "enter #home-search-location-input".to_string(),
                "fill #arrivaldate = 04/04/2026".to_string(),
                "fill #nights = 1".to_string(),
                "click //button[contains(normalize-space(.), 'Show Results')]".to_string(),
                "attr a[aria-label*='John Pennekamp Coral Reef State Park'] aria-label".to_string(),
            ]
        );
        assert_eq!(*session.closed.lock().await, 1);
    }

    #[tokio::test]
    async fn test_wait_timeout_names_step_and_closes_browser() {
        let session = FakeSession {
            missing: Some("#home-search-location-input".to_string()),
            ..FakeSession::default()
        };
        let acquirer = InteractiveAcquirer::new(
            FakeLauncher {
                session: session.clone(),
                fail: false,
            },
            config(),
        );

        let outcome = acquirer.acquire(&target()).await;

        match outcome {
            AcquisitionOutcome::InteractionError(failure) => {
                assert_eq!(failure.step, STEP_LOCATION_SEARCH);
                assert!(failure.detail.contains("timed out"));
            }
            other => panic!("expected interaction error, got {:?}", other),
        }
        assert_eq!(*session.closed.lock().await, 1);
    }

    #[tokio::test]
    async fn test_missing_results_card_is_results_step() {
        let session = FakeSession {
            missing: Some("a[aria-label*='John Pennekamp Coral Reef State Park']".to_string()),
            ..FakeSession::default()
        };
        let acquirer = InteractiveAcquirer::new(
            FakeLauncher {
                session: session.clone(),
                fail: false,
            },
            config(),
        );

        let outcome = acquirer.acquire(&target()).await;

        assert!(matches!(
            outcome,
            AcquisitionOutcome::InteractionError(ref failure) if failure.step == STEP_RESULTS
        ));
        assert_eq!(*session.closed.lock().await, 1);
    }

    #[tokio::test]
    async fn test_launch_failure_is_interaction_error() {
        let session = FakeSession::default();
        let acquirer = InteractiveAcquirer::new(
            FakeLauncher {
                session: session.clone(),
                fail: true,
            },
            config(),
        );

        let outcome = acquirer.acquire(&target()).await;

        match outcome {
            AcquisitionOutcome::InteractionError(failure) => {
                assert_eq!(failure.step, STEP_LAUNCH_BROWSER);
                assert!(failure.detail.contains("Chromium not found"));
            }
            other => panic!("expected interaction error, got {:?}", other),
        }
        assert_eq!(*session.closed.lock().await, 0);
    }

    #[tokio::test]
    async fn test_label_without_attribute_is_empty_document() {
        let session = FakeSession::default();
        let acquirer = InteractiveAcquirer::new(
            FakeLauncher {
                session: session.clone(),
                fail: false,
            },
            config(),
        );

        let outcome = acquirer.acquire(&target()).await;

        assert!(matches!(
            outcome,
            AcquisitionOutcome::Document(ref document) if document.content.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_unresponsive_close_does_not_block_outcome() {
        let session = FakeSession {
            missing: Some("#nights".to_string()),
            hang_on_close: true,
            ..FakeSession::default()
        };
        let acquirer = InteractiveAcquirer::new(
            FakeLauncher {
                session: session.clone(),
                fail: false,
            },
            config(),
        );

        let outcome = tokio::time::timeout(Duration::from_secs(5), acquirer.acquire(&target()))
            .await
            .expect("acquire must finish even when the browser never closes");

        assert!(matches!(
            outcome,
            AcquisitionOutcome::InteractionError(ref failure) if failure.step == STEP_NIGHTS
        ));
        assert_eq!(*session.closed.lock().await, 1);
    }
}
