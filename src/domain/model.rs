use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// The park, arrival date and stay length checked by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTarget {
    pub park: String,
    pub arrival: NaiveDate,
    pub nights: u32,
}

impl CheckTarget {
    pub fn new(park: impl Into<String>, arrival: NaiveDate, nights: u32) -> Self {
        Self {
            park: park.into(),
            arrival,
            nights,
        }
    }

    pub fn departure(&self) -> NaiveDate {
        self.arrival + Duration::days(i64::from(self.nights))
    }

    /// e.g. `April 4, 2026 to April 5, 2026 (1 night)`
    pub fn stay_range(&self) -> String {
        let unit = if self.nights == 1 { "night" } else { "nights" };
        format!(
            "{} to {} ({} {})",
            self.arrival.format("%B %-d, %Y"),
            self.departure().format("%B %-d, %Y"),
            self.nights,
            unit
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityResult {
    Count(u32),
    /// No count found in the document. Treated as zero availability.
    Unknown,
}

impl AvailabilityResult {
    pub fn sites(&self) -> u32 {
        match self {
            AvailabilityResult::Count(n) => *n,
            AvailabilityResult::Unknown => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    DirectFetch,
    Interactive,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::DirectFetch => write!(f, "direct_fetch"),
            Strategy::Interactive => write!(f, "interactive"),
        }
    }
}

/// Text the extractor runs against: a raw HTML body, or the label of the results element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub source: Strategy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionFailure {
    pub step: String,
    pub detail: String,
}

impl InteractionFailure {
    pub fn new(step: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    Document(Document),
    /// The booking service could not be reached, or answered with a failure status.
    TransportError(String),
    /// A page was reached but a UI step could not be completed.
    InteractionError(InteractionFailure),
}

impl AcquisitionOutcome {
    pub fn is_error(&self) -> bool {
        !matches!(self, AcquisitionOutcome::Document(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Available,
    Unavailable,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
    pub timestamp: DateTime<Tz>,
}

impl NotificationMessage {
    pub fn rendered_timestamp(&self) -> String {
        render_timestamp(&self.timestamp)
    }
}

/// `2026-04-01 09:30:00 AM CDT`
pub fn render_timestamp(timestamp: &DateTime<Tz>) -> String {
    timestamp.format("%Y-%m-%d %I:%M:%S %p %Z").to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub classification: Classification,
    /// `None` when acquisition failed and extraction never ran.
    pub availability: Option<AvailabilityResult>,
    pub message: Option<NotificationMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub classification: Classification,
    pub availability: AvailabilityResult,
    pub notified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stay_range_single_night() {
        let target = CheckTarget::new(
            "John Pennekamp Coral Reef State Park",
            NaiveDate::from_ymd_opt(2026, 4, 4).unwrap(),
            1,
        );
        assert_eq!(target.departure(), NaiveDate::from_ymd_opt(2026, 4, 5).unwrap());
        assert_eq!(target.stay_range(), "April 4, 2026 to April 5, 2026 (1 night)");
    }

    #[test]
    fn test_stay_range_crosses_month() {
        let target = CheckTarget::new("Bahia Honda State Park", NaiveDate::from_ymd_opt(2026, 4, 29).unwrap(), 3);
        assert_eq!(target.stay_range(), "April 29, 2026 to May 2, 2026 (3 nights)");
    }

    #[test]
    fn test_render_timestamp_uses_zone_abbreviation() {
        let ts = chrono_tz::America::Chicago
            .with_ymd_and_hms(2026, 1, 15, 14, 5, 9)
            .unwrap();
        assert_eq!(render_timestamp(&ts), "2026-01-15 02:05:09 PM CST");

        let summer = chrono_tz::America::Chicago
            .with_ymd_and_hms(2026, 7, 1, 8, 0, 0)
            .unwrap();
        assert_eq!(render_timestamp(&summer), "2026-07-01 08:00:00 AM CDT");
    }

    #[test]
    fn test_unknown_counts_as_zero() {
        assert_eq!(AvailabilityResult::Unknown.sites(), 0);
        assert_eq!(AvailabilityResult::Count(4).sites(), 4);
    }
}
