pub mod decision;
pub mod engine;
pub mod extractor;

pub use crate::domain::model::{AcquisitionOutcome, AvailabilityResult, CheckTarget, NotificationMessage};
pub use crate::domain::ports::{Acquirer, Extractor, Notifier, ResultLog};
pub use crate::utils::error::Result;
