use crate::domain::model::{AcquisitionOutcome, AvailabilityResult, CheckTarget, NotificationMessage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Obtains a document describing current availability for a target.
///
/// Failures are part of the outcome, never a panic or an `Err`: the pipeline
/// turns them into an error report.
#[async_trait]
pub trait Acquirer: Send + Sync {
    async fn acquire(&self, target: &CheckTarget) -> AcquisitionOutcome;
}

#[async_trait]
impl<T: Acquirer + ?Sized> Acquirer for Box<T> {
    async fn acquire(&self, target: &CheckTarget) -> AcquisitionOutcome {
        (**self).acquire(target).await
    }
}

pub trait Extractor: Send + Sync {
    fn extract(&self, document: &str) -> AvailabilityResult;
}

/// Delivers one message. A single attempt, failures propagate.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &NotificationMessage) -> Result<()>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    async fn send(&self, message: &NotificationMessage) -> Result<()> {
        (**self).send(message).await
    }
}

/// Append-only record of completed checks.
#[async_trait]
pub trait ResultLog: Send + Sync {
    async fn append(&self, line: &str) -> Result<()>;
}
