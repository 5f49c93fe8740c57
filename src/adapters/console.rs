use crate::domain::model::NotificationMessage;
use crate::domain::ports::Notifier;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Prints the message instead of mailing it (`--dry-run`).
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    fn render(message: &NotificationMessage) -> String {
        format!(
            "Subject: {}\nDate: {}\n\n{}",
            message.subject,
            message.rendered_timestamp(),
            message.body
        )
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<()> {
        tracing::info!("🔍 DRY RUN - email not sent: {}", message.subject);
        println!("{}", Self::render(message));
        Ok(())
    }
}
