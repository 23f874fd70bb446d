use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::config::BloomerangSettings;
use crate::core::ConstituentDirectory;
use crate::models::{CandidateConstituent, NewConstituent};

/// Errors that can occur when interacting with Bloomerang
#[derive(Debug, Error)]
pub enum BloomerangError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    ApiError { status: StatusCode, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Bloomerang REST API client
///
/// Handles all communication with the CRM:
/// - Paginated constituent listing (used by the matcher)
/// - Creating constituents
/// - Connectivity checks for the settings page
pub struct BloomerangClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl BloomerangClient {
    /// Create a new Bloomerang client
    ///
    /// `verify_ssl = false` accepts invalid certificates and is meant for local
    /// troubleshooting behind intercepting proxies only.
    pub fn new(base_url: String, api_key: String, verify_ssl: bool) -> Result<Self, BloomerangError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!verify_ssl)
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    pub fn from_settings(settings: &BloomerangSettings) -> Result<Self, BloomerangError> {
        Self::new(
            settings.api_url.clone(),
            settings.api_key.clone(),
            settings.verify_ssl,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Fetch one page of constituents ordered by descending Id
    pub async fn list_page(
        &self,
        skip: usize,
        take: usize,
    ) -> Result<Vec<CandidateConstituent>, BloomerangError> {
        let url = self.url("constituents");

        tracing::debug!("Listing constituents skip={} take={}", skip, take);

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(&[
                ("skip", skip.to_string()),
                ("take", take.to_string()),
                ("orderBy", "Id".to_string()),
                ("orderDirection", "Desc".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BloomerangError::ApiError { status, body });
        }

        let json: Value = response.json().await?;

        let results = json
            .get("Results")
            .and_then(|r| r.as_array())
            .ok_or_else(|| BloomerangError::InvalidResponse("Missing Results array".into()))?;

        let constituents: Vec<CandidateConstituent> = results
            .iter()
            .filter_map(|entry| match serde_json::from_value(entry.clone()) {
                Ok(constituent) => Some(constituent),
                Err(e) => {
                    tracing::debug!("Skipping unreadable constituent: {}", e);
                    None
                }
            })
            .collect();

        Ok(constituents)
    }

    /// Create a constituent, returning its Id when the API reports one
    pub async fn create_constituent(
        &self,
        constituent: &NewConstituent,
    ) -> Result<Option<i64>, BloomerangError> {
        // The create endpoint is singular, unlike the listing
        let url = self.url("constituent");

        let response = self
            .client
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .json(constituent)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Failed to create constituent: {} - {}", status, body);
            return Err(BloomerangError::ApiError { status, body });
        }

        let json: Value = response.json().await?;
        let id = json.get("Id").and_then(|id| id.as_i64());

        tracing::info!("Created new constituent: {:?}", id);

        Ok(id)
    }

    /// Issue a minimal listing request to verify credentials and reachability
    pub async fn test_connection(&self) -> Result<(), BloomerangError> {
        let response = self
            .client
            .get(self.url("constituents"))
            .header("X-API-Key", &self.api_key)
            .query(&[("take", "1")])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(BloomerangError::ApiError { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl ConstituentDirectory for BloomerangClient {
    type Error = BloomerangError;

    async fn list_constituents(
        &self,
        skip: usize,
        take: usize,
    ) -> Result<Vec<CandidateConstituent>, BloomerangError> {
        self.list_page(skip, take).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(url: String) -> BloomerangClient {
        BloomerangClient::new(url, "test_key".to_string(), true).unwrap()
    }

    #[test]
    fn test_bloomerang_client_creation() {
        let client = client("https://api.bloomerang.test/v2/".to_string());
        assert_eq!(client.url("constituents"), "https://api.bloomerang.test/v2/constituents");
        assert_eq!(client.api_key, "test_key");
    }

    #[tokio::test]
    async fn test_list_page_sends_paging_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/constituents")
            .match_header("X-API-Key", "test_key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("skip".into(), "100".into()),
                Matcher::UrlEncoded("take".into(), "50".into()),
                Matcher::UrlEncoded("orderBy".into(), "Id".into()),
                Matcher::UrlEncoded("orderDirection".into(), "Desc".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "Total": 2,
                    "Results": [
                        {"Id": 12, "FullName": "Jane Doe", "FirstName": "Jane", "LastName": "Doe",
                         "PrimaryEmail": {"Value": "jane@example.com"}},
                        {"Id": 11, "FullName": "Old Record", "FirstName": null,
                         "PrimaryEmail": "not-an-object", "PhoneNumber": "305-555-1234"},
                        {"FullName": "No Id"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let page = client(server.url()).list_page(100, 50).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].email(), "jane@example.com");
        assert!(page[1].primary_email.is_none());
        assert_eq!(page[1].phone(), "305-555-1234");
    }

    #[tokio::test]
    async fn test_list_page_reports_status_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/constituents")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("bad key")
            .create_async()
            .await;

        let err = client(server.url()).list_page(0, 50).await.unwrap_err();

        match err {
            BloomerangError::ApiError { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "bad key");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_page_requires_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/constituents")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"Total": 0}"#)
            .create_async()
            .await;

        let err = client(server.url()).list_page(0, 50).await.unwrap_err();

        assert!(matches!(err, BloomerangError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_create_constituent_posts_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/constituent")
            .match_header("X-API-Key", "test_key")
            .match_body(Matcher::PartialJson(json!({
                "Type": "Individual",
                "Status": "Active",
                "FirstName": "Jane",
                "PrimaryEmail": {"Type": "Home", "Value": "jane@example.com"},
                "PrimaryPhone": {"Type": "Mobile", "Number": "305-555-1234"}
            })))
            .with_status(201)
            .with_body(r#"{"Id": 991}"#)
            .create_async()
            .await;

        let payload = NewConstituent {
            kind: "Individual".to_string(),
            status: "Active".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            primary_email: crate::models::domain::TypedValue {
                kind: "Home".to_string(),
                value: "jane@example.com".to_string(),
            },
            primary_phone: crate::models::domain::TypedNumber {
                kind: "Mobile".to_string(),
                number: "305-555-1234".to_string(),
            },
            primary_address: None,
        };

        let id = client(server.url()).create_constituent(&payload).await.unwrap();

        mock.assert_async().await;
        assert_eq!(id, Some(991));
    }

    #[tokio::test]
    async fn test_connection_check() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/constituents")
            .match_query(Matcher::UrlEncoded("take".into(), "1".into()))
            .with_status(200)
            .with_body(r#"{"Results": []}"#)
            .create_async()
            .await;

        assert!(client(server.url()).test_connection().await.is_ok());
    }
}
