use thiserror::Error;

use crate::config::{BloomerangSettings, MatchingSettings};
use crate::core::{ConstituentMatcher, MatchDecision};
use crate::models::{DonorRecord, MatchResult};
use crate::services::bloomerang::{BloomerangClient, BloomerangError};

/// Reasons the connectivity check can fail
#[derive(Debug, Error)]
pub enum CrmCheckError {
    #[error("Bloomerang integration is disabled")]
    Disabled,

    #[error("Bloomerang API key not configured")]
    MissingApiKey,

    #[error("Failed to connect: {0}")]
    Connection(String),
}

impl CrmCheckError {
    /// Configuration problems are the caller's to fix; connection failures are not
    pub fn is_configuration(&self) -> bool {
        matches!(self, CrmCheckError::Disabled | CrmCheckError::MissingApiKey)
    }
}

enum CrmStatus {
    Disabled,
    MissingApiKey,
    Ready(BloomerangClient),
}

/// Pushes donors to Bloomerang as constituents
///
/// Runs the matcher against the live CRM and creates a constituent when no
/// existing record qualifies. Failures are reported in the returned
/// [`MatchResult`] and never abort the surrounding submission.
pub struct CrmSync {
    status: CrmStatus,
    api_url: String,
    matcher: ConstituentMatcher,
}

impl CrmSync {
    pub fn new(
        settings: &BloomerangSettings,
        matching: &MatchingSettings,
    ) -> Result<Self, BloomerangError> {
        let status = if !settings.enabled {
            CrmStatus::Disabled
        } else if settings.api_key.is_empty() {
            CrmStatus::MissingApiKey
        } else {
            CrmStatus::Ready(BloomerangClient::from_settings(settings)?)
        };

        Ok(Self {
            status,
            api_url: settings.api_url.clone(),
            matcher: ConstituentMatcher::new(matching.match_weights(), matching.scan_limits()),
        })
    }

    /// Sync is disabled entirely
    pub fn disabled() -> Self {
        Self {
            status: CrmStatus::Disabled,
            api_url: String::new(),
            matcher: ConstituentMatcher::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.status, CrmStatus::Disabled)
    }

    pub fn has_api_key(&self) -> bool {
        matches!(self.status, CrmStatus::Ready(_))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Resolve the donor to a constituent, creating one when needed
    pub async fn sync(&self, donor: &DonorRecord) -> MatchResult {
        let client = match &self.status {
            CrmStatus::Disabled => {
                tracing::info!("Bloomerang integration is disabled");
                return MatchResult::not_synced("Bloomerang integration disabled");
            }
            CrmStatus::MissingApiKey => {
                tracing::warn!("Bloomerang API key not configured");
                return MatchResult::not_synced("Bloomerang API key not configured");
            }
            CrmStatus::Ready(client) => client,
        };

        match self.matcher.resolve(donor, client).await {
            MatchDecision::Existing(found) => MatchResult::existing(found.id),
            MatchDecision::CreateNew(payload) => match client.create_constituent(&payload).await {
                Ok(id) => MatchResult::created(id),
                Err(BloomerangError::ApiError { body, .. }) => {
                    MatchResult::not_synced(format!("Failed to create constituent: {}", body))
                }
                Err(e) => {
                    tracing::error!("Bloomerang error: {}", e);
                    MatchResult::not_synced(e.to_string())
                }
            },
        }
    }

    /// Verify the CRM is reachable with the configured key
    pub async fn test_connection(&self) -> Result<&str, CrmCheckError> {
        let client = match &self.status {
            CrmStatus::Disabled => return Err(CrmCheckError::Disabled),
            CrmStatus::MissingApiKey => return Err(CrmCheckError::MissingApiKey),
            CrmStatus::Ready(client) => client,
        };

        match client.test_connection().await {
            Ok(()) => Ok(&self.api_url),
            Err(BloomerangError::ApiError { status, body }) => Err(CrmCheckError::Connection(
                format!("{} - {}", status.as_u16(), body),
            )),
            Err(e) => Err(CrmCheckError::Connection(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn donor() -> DonorRecord {
        DonorRecord {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "Jane@Example.com ".to_string(),
            phone: "(305) 555-1234".to_string(),
            address: "   ".to_string(),
            donation_type: "clothing".to_string(),
            merchandise_items: vec![],
            donation_date: "2024-01-15".to_string(),
            location: "Main Office".to_string(),
        }
    }

    fn enabled(url: String) -> BloomerangSettings {
        BloomerangSettings {
            enabled: true,
            api_key: "key".to_string(),
            api_url: url,
            verify_ssl: true,
        }
    }

    #[tokio::test]
    async fn test_disabled_is_not_synced() {
        let result = CrmSync::disabled().sync(&donor()).await;
        assert!(!result.synced);
        assert_eq!(result.message, "Bloomerang integration disabled");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_synced() {
        let settings = BloomerangSettings {
            api_key: String::new(),
            ..enabled("http://localhost".to_string())
        };
        let crm = CrmSync::new(&settings, &MatchingSettings::default()).unwrap();

        let result = crm.sync(&donor()).await;

        assert!(crm.is_enabled());
        assert!(!crm.has_api_key());
        assert_eq!(result.message, "Bloomerang API key not configured");
        assert!(matches!(
            crm.test_connection().await,
            Err(CrmCheckError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_existing_constituent_is_reused() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/constituents")
            .match_query(Matcher::UrlEncoded("skip".into(), "0".into()))
            .with_status(200)
            .with_body(
                json!({"Results": [
                    {"Id": 3, "FullName": "Other", "FirstName": "Other", "LastName": "Person"},
                    {"Id": 2, "FullName": "Jane Doe", "PrimaryEmail": {"Value": "jane@example.com"}}
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        let create = server
            .mock("POST", "/constituent")
            .expect(0)
            .create_async()
            .await;

        let crm = CrmSync::new(&enabled(server.url()), &MatchingSettings::default()).unwrap();
        let result = crm.sync(&donor()).await;

        create.assert_async().await;
        assert_eq!(result, MatchResult::existing(2));
    }

    #[tokio::test]
    async fn test_no_match_creates_constituent_without_blank_address() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/constituents")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"Results": []}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/constituent")
            .match_body(Matcher::PartialJson(json!({"FirstName": "Jane", "LastName": "Doe"})))
            .with_status(200)
            .with_body(r#"{"Id": 55}"#)
            .create_async()
            .await;

        let crm = CrmSync::new(&enabled(server.url()), &MatchingSettings::default()).unwrap();
        let result = crm.sync(&donor()).await;

        create.assert_async().await;
        assert!(result.synced);
        assert!(result.created_new);
        assert_eq!(result.matched_id, Some(55));
        assert_eq!(result.message, "Successfully added to Bloomerang");
    }

    #[tokio::test]
    async fn test_create_failure_reports_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/constituents")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;
        server
            .mock("POST", "/constituent")
            .with_status(400)
            .with_body("LastName is required")
            .create_async()
            .await;

        let crm = CrmSync::new(&enabled(server.url()), &MatchingSettings::default()).unwrap();
        let result = crm.sync(&donor()).await;

        assert!(!result.synced);
        assert_eq!(result.message, "Failed to create constituent: LastName is required");
    }

    #[tokio::test]
    async fn test_connection_failure_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/constituents")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let crm = CrmSync::new(&enabled(server.url()), &MatchingSettings::default()).unwrap();
        let err = crm.test_connection().await.unwrap_err();

        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "Failed to connect: 403 - forbidden");
    }
}
