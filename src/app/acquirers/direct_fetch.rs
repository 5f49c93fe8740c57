use crate::config::settings::DirectFetchConfig;
use crate::domain::model::{AcquisitionOutcome, CheckTarget, Document, Strategy};
use crate::domain::ports::Acquirer;
use crate::utils::error::{Result, WatchError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;

/// One GET against the search endpoint with the park as a query parameter.
pub struct DirectFetchAcquirer {
    client: Client,
    config: DirectFetchConfig,
}

impl DirectFetchAcquirer {
    pub fn new(config: DirectFetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).map_err(|e| WatchError::InvalidConfigValueError {
                field: "acquire.direct_fetch.accept_language".to_string(),
                value: config.accept_language.clone(),
                reason: e.to_string(),
            })?,
        );

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Acquirer for DirectFetchAcquirer {
    async fn acquire(&self, target: &CheckTarget) -> AcquisitionOutcome {
        let url = &self.config.search_url;
        tracing::debug!("Making search request to: {} ({}={})", url, self.config.park_param, target.park);

        let response = match self
            .client
            .get(url)
            .query(&[(self.config.park_param.as_str(), target.park.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return AcquisitionOutcome::TransportError(format!(
                    "request to {} timed out after {}s",
                    url, self.config.timeout_seconds
                ));
            }
            Err(e) => return AcquisitionOutcome::TransportError(format!("request to {} failed: {}", url, e)),
        };

        let status = response.status();
        tracing::debug!("Search response status: {}", status);

        if !status.is_success() {
            return AcquisitionOutcome::TransportError(format!("HTTP {} from {}", status, response.url()));
        }

        match response.text().await {
            Ok(body) => {
                tracing::debug!("Received {} bytes of search results", body.len());
                AcquisitionOutcome::Document(Document {
                    content: body,
                    source: Strategy::DirectFetch,
                })
            }
            Err(e) => AcquisitionOutcome::TransportError(format!("reading body from {} failed: {}", url, e)),
        }
    }
}
