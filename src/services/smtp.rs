use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{EmailMode, SmtpSettings};
use crate::services::mailer::{MailError, Mailer, OutgoingEmail};

/// SMTP delivery with STARTTLS and password authentication
///
/// A fresh connection is opened for every message.
pub struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    fn check_credentials(&self) -> Result<(), MailError> {
        if self.settings.sender_email.is_empty() || self.settings.sender_password.is_empty() {
            return Err(MailError::Configuration(
                "SMTP credentials not configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the MIME message for `email`
    pub fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let from: Mailbox = self
            .settings
            .sender_email
            .parse()
            .map_err(|e| MailError::Address(format!("{}: {}", self.settings.sender_email, e)))?;
        let to: Mailbox = email
            .to
            .trim()
            .parse()
            .map_err(|e| MailError::Address(format!("{}: {}", email.to, e)))?;

        let builder = Message::builder().from(from).to(to).subject(&email.subject);

        let message = match &email.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse("application/octet-stream")
                    .map_err(|e| MailError::Message(e.to_string()))?;
                builder.multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::plain(email.body.clone()))
                        .singlepart(
                            Attachment::new(attachment.filename.clone())
                                .body(attachment.bytes.clone(), content_type),
                        ),
                )
            }
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.body.clone()),
        };

        message.map_err(|e| MailError::Message(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn mode(&self) -> EmailMode {
        EmailMode::Smtp
    }

    fn sender(&self) -> &str {
        &self.settings.sender_email
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.check_credentials()?;
        let message = self.build_message(&email)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.server)
            .map_err(|e| MailError::Smtp(e.to_string()))?
            .port(self.settings.port)
            .credentials(Credentials::new(
                self.settings.sender_email.clone(),
                self.settings.sender_password.clone(),
            ))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        tracing::info!("Email sent successfully via SMTP to {}", email.to);
        Ok(())
    }
}
