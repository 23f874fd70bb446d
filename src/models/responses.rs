use serde::{Deserialize, Serialize};

/// Generic success/failure response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

/// Response for the submit donation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDonationResponse {
    pub success: bool,
    pub message: String,
    pub submission_id: String,
    pub record_saved: bool,
    pub email_sent: bool,
    pub bloomerang_synced: bool,
    pub bloomerang_message: String,
    pub constituent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationsResponse {
    pub success: bool,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplateResponse {
    pub success: bool,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormTitleResponse {
    pub success: bool,
    pub title: String,
}

/// Bloomerang connectivity check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmTestResponse {
    pub success: bool,
    pub message: String,
    pub api_url: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub email_mode: String,
    pub bloomerang_enabled: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
