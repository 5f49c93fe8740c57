use crate::domain::model::{
    render_timestamp, AcquisitionOutcome, AvailabilityResult, CheckTarget, Classification, Decision,
    NotificationMessage,
};
use crate::domain::ports::Extractor;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// What to do when a check finds no available sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailablePolicy {
    /// Send a low-priority "still unavailable" message.
    #[default]
    StatusEmail,
    /// Log only, no email.
    Silent,
}

/// Maps an acquisition outcome to a classification and the message to send.
///
/// The extractor only runs when a document was acquired.
pub fn decide<E: Extractor + ?Sized>(
    target: &CheckTarget,
    outcome: &AcquisitionOutcome,
    extractor: &E,
    policy: UnavailablePolicy,
    checked_at: DateTime<Tz>,
) -> Decision {
    let document = match outcome {
        AcquisitionOutcome::Document(document) => document,
        AcquisitionOutcome::TransportError(detail) => {
            return error_decision(target, &format!("transport error: {}", detail), checked_at);
        }
        AcquisitionOutcome::InteractionError(failure) => {
            let detail = format!("interaction error at step '{}': {}", failure.step, failure.detail);
            return error_decision(target, &detail, checked_at);
        }
    };

    let availability = extractor.extract(&document.content);
    let when = render_timestamp(&checked_at);

    match availability {
        AvailabilityResult::Count(n) if n > 0 => Decision {
            classification: Classification::Available,
            availability: Some(availability),
            message: Some(NotificationMessage {
                subject: format!("🚨 {} Available: {} sites!", target.park, n),
                body: format!(
                    "Availability detected!\n\n{} sites available at {} for {}.\n\nChecked at {}",
                    n,
                    target.park,
                    target.stay_range(),
                    when
                ),
                timestamp: checked_at,
            }),
        },
        _ => {
            let message = match policy {
                UnavailablePolicy::Silent => None,
                UnavailablePolicy::StatusEmail => {
                    let found = match availability {
                        AvailabilityResult::Unknown => "no site count was found on the results page",
                        _ => "0 sites available",
                    };
                    Some(NotificationMessage {
                        subject: format!("{}: still no availability", target.park),
                        body: format!(
                            "Checked {} for {}: {}.\n\nChecked at {}",
                            target.park,
                            target.stay_range(),
                            found,
                            when
                        ),
                        timestamp: checked_at,
                    })
                }
            };
            Decision {
                classification: Classification::Unavailable,
                availability: Some(availability),
                message,
            }
        }
    }
}

fn error_decision(target: &CheckTarget, detail: &str, checked_at: DateTime<Tz>) -> Decision {
    Decision {
        classification: Classification::Error,
        availability: None,
        message: Some(NotificationMessage {
            subject: format!("{} check failed", target.park),
            body: format!(
                "Something went wrong at {}:\n{}",
                render_timestamp(&checked_at),
                detail
            ),
            timestamp: checked_at,
        }),
    }
}
