//! Chromium browser sessions using chromiumoxide.

use super::{BrowserLauncher, BrowserSession};
use crate::config::settings::{InteractiveConfig, Locator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;

const EMPTY_SEARCH_RESULT: &str = "Invalid search result range";

pub struct ChromiumLauncher {
    headless: bool,
    executable: Option<PathBuf>,
}

impl ChromiumLauncher {
    pub fn new(config: &InteractiveConfig) -> Self {
        Self {
            headless: config.headless,
            executable: config.chromium_path.as_ref().map(PathBuf::from),
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if !self.headless {
            builder = builder.with_head();
        }
        // 未指定時交給 chromiumoxide 自行偵測 (CHROME 環境變數 / PATH)
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        // 先建立 session：launch 若在此之後被取消，Drop 會中止 handler
        let mut session = ChromiumSession {
            browser,
            page: None,
            handler_task,
        };

        match session.browser.new_page("about:blank").await {
            Ok(page) => session.page = Some(page),
            Err(e) => {
                let _ = Box::new(session).close().await;
                return Err(e).context("failed to open a page");
            }
        }

        tracing::debug!("Chromium launched (headless: {})", self.headless);
        Ok(Box::new(session))
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page> {
        self.page.as_ref().context("page is not open")
    }

    /// First element matching the locator, `None` when nothing matches.
    ///
    /// Transport failures and invalid selectors are errors, not absence.
    async fn lookup(&self, locator: &Locator) -> Result<Option<Element>> {
        let page = self.page()?;
        let elements = match locator {
            Locator::Css(selector) => page.find_elements(selector.as_str()).await,
            Locator::Xpath(xpath) => match page.find_xpaths(xpath.as_str()).await {
                // Chrome rejects an empty result range instead of returning no nodes
                Err(CdpError::Chrome(e)) if e.message.contains(EMPTY_SEARCH_RESULT) => Ok(Vec::new()),
                other => other,
            },
        };
        let elements = elements.with_context(|| format!("element lookup failed: {locator}"))?;
        Ok(elements.into_iter().next())
    }

    async fn element(&self, locator: &Locator) -> Result<Element> {
        self.lookup(locator)
            .await?
            .with_context(|| format!("element not found: {locator}"))
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page()?
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        Ok(())
    }

    async fn exists(&self, locator: &Locator) -> Result<bool> {
        Ok(self.lookup(locator).await?.is_some())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.element(locator)
            .await?
            .click()
            .await
            .with_context(|| format!("click failed: {locator}"))?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        let element = self.element(locator).await?;
        element.click().await?;
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .with_context(|| format!("clearing input failed: {locator}"))?;
        element
            .type_str(value)
            .await
            .with_context(|| format!("typing into input failed: {locator}"))?;
        Ok(())
    }

    async fn press_enter(&self, locator: &Locator) -> Result<()> {
        self.element(locator)
            .await?
            .press_key("Enter")
            .await
            .with_context(|| format!("pressing Enter failed: {locator}"))?;
        Ok(())
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        self.element(locator)
            .await?
            .attribute(name)
            .await
            .with_context(|| format!("reading attribute '{name}' failed: {locator}"))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        if let Some(page) = this.page.take() {
            let _ = page.close().await;
        }
        let closed = this.browser.close().await.context("failed to close Chromium");
        if closed.is_ok() {
            let _ = this.browser.wait().await;
        } else {
            // 瀏覽器沒有回應，直接終止程序
            let _ = this.browser.kill().await;
        }
        this.handler_task.abort();
        closed.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_fill_and_read_attribute() {
        let launcher = ChromiumLauncher::new(&InteractiveConfig::default());
        let session = launcher.launch().await.expect("failed to launch");

        session
            .goto("data:text/html,<input id='nights' value='9'><a aria-label='Test Park, 2 sites available'>x</a>")
            .await
            .expect("navigation failed");

        let nights = Locator::Css("#nights".to_string());
        assert!(session.exists(&nights).await.unwrap());
        session.fill(&nights, "1").await.expect("fill failed");

        let label = session
            .attribute(&Locator::Xpath("//a[contains(@aria-label, 'Test Park')]".to_string()), "aria-label")
            .await
            .unwrap();
        assert_eq!(label.as_deref(), Some("Test Park, 2 sites available"));

        // 找不到是 false，無效的選擇器則是錯誤
        assert!(!session.exists(&Locator::Xpath("//a[@id='absent']".to_string())).await.unwrap());
        assert!(!session.exists(&Locator::Css("#absent".to_string())).await.unwrap());
        assert!(session.exists(&Locator::Css("a[aria-label*='x".to_string())).await.is_err());

        session.close().await.expect("close failed");
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_cancelled_launch_releases_browser() {
        let launcher = ChromiumLauncher::new(&InteractiveConfig::default());
        // 讓 launch 在中途被取消
        let _ = tokio::time::timeout(std::time::Duration::from_millis(1), launcher.launch()).await;

        let session = launcher.launch().await.expect("relaunch after cancellation failed");
        session.close().await.expect("close failed");
    }
}
