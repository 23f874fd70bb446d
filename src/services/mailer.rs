use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{EmailMode, Settings};
use crate::services::graph::GraphMailer;
use crate::services::smtp::SmtpMailer;

/// Subject line of receipt emails
pub const RECEIPT_SUBJECT: &str = "Thank You for Your Donation - Receipt Enclosed";

/// Subject line of configuration test emails
pub const TEST_SUBJECT: &str = "Test Email - Donor App";

/// Errors that can occur when sending email
#[derive(Debug, Error)]
pub enum MailError {
    #[error("{0}")]
    Configuration(String),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Api(String),
}

/// File attached to an outgoing email
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MailAttachment {
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "application/pdf".to_string(),
            bytes,
        }
    }
}

/// Plain-text email with an optional attachment
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<MailAttachment>,
}

/// Email delivery capability
///
/// One implementation is chosen at startup from `email.mode` and shared by
/// every request.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Transport this mailer delivers through
    fn mode(&self) -> EmailMode;

    /// Configured sender address, possibly empty
    fn sender(&self) -> &str;

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Build the mailer selected by configuration
pub fn build_mailer(settings: &Settings) -> Result<Arc<dyn Mailer>, MailError> {
    let mailer: Arc<dyn Mailer> = match settings.email.email_mode() {
        EmailMode::Smtp => Arc::new(SmtpMailer::new(settings.smtp.clone())),
        EmailMode::Microsoft => Arc::new(GraphMailer::new(settings.graph.clone())?),
    };
    Ok(mailer)
}

/// Attachment name for a receipt generated on `date`
pub fn receipt_filename(date: chrono::NaiveDate) -> String {
    format!("donation_receipt_{}.pdf", date.format("%Y%m%d"))
}

/// Test message announcing which transport delivered it
pub fn test_email(to: String, mode: EmailMode) -> OutgoingEmail {
    let transport = match mode {
        EmailMode::Smtp => "SMTP",
        EmailMode::Microsoft => "Microsoft Graph API",
    };
    OutgoingEmail {
        to,
        subject: TEST_SUBJECT.to_string(),
        body: format!("This is a test email from your donor app using {}.", transport),
        attachment: None,
    }
}
