use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{EmailMode, GraphSettings};
use crate::services::mailer::{MailError, Mailer, OutgoingEmail};

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Microsoft Graph `sendMail` delivery using the client-credentials flow
///
/// A new access token is requested for every message.
pub struct GraphMailer {
    settings: GraphSettings,
    client: Client,
}

impl GraphMailer {
    pub fn new(settings: GraphSettings) -> Result<Self, MailError> {
        let client = Client::builder().build()?;
        Ok(Self { settings, client })
    }

    /// Fetch an application access token from Azure AD
    pub async fn access_token(&self) -> Result<String, MailError> {
        if self.settings.tenant_id.is_empty()
            || self.settings.client_id.is_empty()
            || self.settings.client_secret.is_empty()
        {
            return Err(MailError::Configuration(
                "Microsoft Graph API credentials not configured. \
                 Set the Azure AD tenant, client id and client secret."
                    .to_string(),
            ));
        }

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.settings.login_url.trim_end_matches('/'),
            self.settings.tenant_id
        );

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Auth(format!(
                "Failed to get access token: {} - {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response.json().await?;

        token.access_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            MailError::Auth("No access token received from Microsoft Graph API".to_string())
        })
    }

    /// Graph `sendMail` request body for `email`
    pub fn message_payload(email: &OutgoingEmail) -> Value {
        let mut message = json!({
            "subject": email.subject,
            "body": {
                "contentType": "Text",
                "content": email.body,
            },
            "toRecipients": [
                { "emailAddress": { "address": email.to } }
            ],
        });

        if let Some(attachment) = &email.attachment {
            message["attachments"] = json!([{
                "@odata.type": "#microsoft.graph.fileAttachment",
                "name": attachment.filename,
                "contentType": attachment.content_type,
                "contentBytes": STANDARD.encode(&attachment.bytes),
            }]);
        }

        json!({ "message": message })
    }
}

#[async_trait]
impl Mailer for GraphMailer {
    fn mode(&self) -> EmailMode {
        EmailMode::Microsoft
    }

    fn sender(&self) -> &str {
        &self.settings.sender_email
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let token = self.access_token().await?;

        let url = format!(
            "{}/v1.0/users/{}/sendMail",
            self.settings.graph_url.trim_end_matches('/'),
            urlencoding::encode(&self.settings.sender_email)
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&Self::message_payload(&email))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api(format!(
                "Graph API error: {} - {}",
                status.as_u16(),
                body
            )));
        }

        tracing::info!("Email sent successfully via Microsoft Graph API to {}", email.to);
        Ok(())
    }
}
