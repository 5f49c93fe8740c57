use crate::config::mail::MailConfig;
use crate::config::settings::NotifyConfig;
use crate::domain::model::NotificationMessage;
use crate::domain::ports::Notifier;
use crate::utils::error::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

/// Sends one plain-text email over SMTPS (implicit TLS).
pub struct SmtpNotifier {
    mail: MailConfig,
    host: String,
    port: u16,
    timeout: Duration,
}

impl SmtpNotifier {
    pub fn new(mail: MailConfig, notify: &NotifyConfig) -> Self {
        Self {
            mail,
            host: notify.smtp_host.clone(),
            port: notify.smtp_port,
            timeout: Duration::from_secs(notify.timeout_seconds),
        }
    }

    pub fn compose(&self, message: &NotificationMessage) -> Result<Message> {
        compose_message(&self.mail, message)
    }
}

pub fn compose_message(mail: &MailConfig, message: &NotificationMessage) -> Result<Message> {
    let mut builder = Message::builder()
        .from(mail.sender()?)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN);
    for recipient in mail.recipients()? {
        builder = builder.to(recipient);
    }
    Ok(builder.body(message.body.clone())?)
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<()> {
        let email = self.compose(message)?;

        // relay() = SMTPS；傳輸物件在此函式結束時釋放，連線隨之關閉
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)?
            .port(self.port)
            .credentials(Credentials::new(self.mail.from.clone(), self.mail.password.clone()))
            .timeout(Some(self.timeout))
            .build();

        tracing::debug!("Sending '{}' via {}:{}", message.subject, self.host, self.port);
        transport.send(email).await?;

        tracing::info!("📧 Email sent successfully: {}", message.subject);
        println!("Email sent successfully! ({})", message.subject);
        Ok(())
    }
}
