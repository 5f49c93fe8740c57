//! Browser abstraction for the interactive acquisition strategy.
//!
//! `BrowserLauncher` starts a session and `BrowserSession` exposes the handful
//! of page operations the booking flow needs. Timeouts are applied by the
//! caller, so implementations simply await the browser.

#[cfg(feature = "browser")]
pub mod chromium;

use crate::config::settings::Locator;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a browser and open a blank page.
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// A single page in a running browser.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate the page and wait for the load to finish.
    async fn goto(&self, url: &str) -> Result<()>;
    /// Whether an element matching the locator is currently in the page.
    async fn exists(&self, locator: &Locator) -> Result<bool>;
    async fn click(&self, locator: &Locator) -> Result<()>;
    /// Replace the value of an input with `value`, typed as keystrokes.
    async fn fill(&self, locator: &Locator, value: &str) -> Result<()>;
    async fn press_enter(&self, locator: &Locator) -> Result<()>;
    async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>>;
    /// Tear down the page and the browser process.
    async fn close(self: Box<Self>) -> Result<()>;
}
