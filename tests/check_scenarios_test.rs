use async_trait::async_trait;
use httpmock::prelude::*;
use park_watch::app::acquirers::DirectFetchAcquirer;
use park_watch::core::decision::UnavailablePolicy;
use park_watch::domain::model::{AvailabilityResult, Classification, NotificationMessage, Strategy};
use park_watch::domain::ports::Notifier;
use park_watch::{run_invocation, MailConfig, Settings, WatchError};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<NotificationMessage>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &NotificationMessage) -> park_watch::Result<()> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

fn env() -> HashMap<String, String> {
    [
        ("EMAIL_FROM", "watcher@example.com"),
        ("EMAIL_TO", "operator@example.com"),
        ("EMAIL_PASSWORD", "app-password"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn direct_settings(search_url: String) -> Settings {
    let mut settings = Settings::default();
    settings.acquire.strategy = Strategy::DirectFetch;
    settings.acquire.direct_fetch.search_url = search_url;
    settings.acquire.direct_fetch.timeout_seconds = 5;
    settings
}

async fn run(settings: &Settings, notifier: RecordingNotifier) -> park_watch::Result<park_watch::domain::model::RunReport> {
    let vars = env();
    run_invocation(
        settings,
        |key| vars.get(key).cloned(),
        |settings: &Settings| DirectFetchAcquirer::new(settings.acquire.direct_fetch.clone()),
        |_mail: MailConfig, _settings: &Settings| notifier,
    )
    .await
}

#[tokio::test]
async fn test_scenario_available_sites_alert() {
    let server = MockServer::start();
    let search_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/search")
            .query_param("keys", "John Pennekamp Coral Reef State Park");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(r#"<div class="card"><a href="/parks/john-pennekamp" aria-label="John Pennekamp Coral Reef State Park, 3 sites available">View</a></div>"#);
    });

    let notifier = RecordingNotifier::default();
    let report = run(&direct_settings(server.url("/search")), notifier.clone())
        .await
        .unwrap();

    search_mock.assert();
    assert_eq!(report.classification, Classification::Available);
    assert_eq!(report.availability, AvailabilityResult::Count(3));

    let sent = notifier.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("3 sites"));
    assert!(sent[0].body.contains("April 4, 2026 to April 5, 2026"));
}

#[tokio::test]
async fn test_scenario_service_unavailable_sends_error_report() {
    let server = MockServer::start();
    let search_mock = server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(503).body("Service Unavailable");
    });

    let notifier = RecordingNotifier::default();
    let result = run(&direct_settings(server.url("/search")), notifier.clone()).await;

    search_mock.assert();
    let err = result.unwrap_err();
    assert!(matches!(err, WatchError::TransportError { ref detail } if detail.contains("503")));

    let sent = notifier.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("check failed"));
    assert!(sent[0].body.contains("503"));
}

#[tokio::test]
async fn test_scenario_no_sites_text_sends_status_email() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).body("<html><body><h1>Find a park</h1></body></html>");
    });

    let notifier = RecordingNotifier::default();
    let report = run(&direct_settings(server.url("/search")), notifier.clone())
        .await
        .unwrap();

    assert_eq!(report.classification, Classification::Unavailable);
    assert_eq!(report.availability, AvailabilityResult::Unknown);
    assert!(report.notified);

    let sent = notifier.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("still no availability"));
}

#[tokio::test]
async fn test_scenario_no_sites_text_silent_policy() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).body("<html><body><h1>Find a park</h1></body></html>");
    });

    let mut settings = direct_settings(server.url("/search"));
    settings.notify.unavailable = UnavailablePolicy::Silent;

    let notifier = RecordingNotifier::default();
    let report = run(&settings, notifier.clone()).await.unwrap();

    assert_eq!(report.classification, Classification::Unavailable);
    assert!(!report.notified);
    assert!(notifier.sent.lock().await.is_empty());
}

#[tokio::test]
async fn test_result_history_written_for_completed_check() {
    let temp_dir = TempDir::new().unwrap();
    let history_path = temp_dir.path().join("history.log");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).body("John Pennekamp Coral Reef State Park, 0 sites available");
    });

    let mut settings = direct_settings(server.url("/search"));
    settings.history = Some(park_watch::config::settings::HistoryConfig {
        path: history_path.to_str().unwrap().to_string(),
    });

    run(&settings, RecordingNotifier::default()).await.unwrap();

    let history = std::fs::read_to_string(&history_path).unwrap();
    assert_eq!(history.lines().count(), 1);
    assert!(history.contains("John Pennekamp Coral Reef State Park - 0 sites"));
}
