use serde::{Deserialize, Serialize};

/// Request to send a test email
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Request to add or remove a donation location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRequest {
    #[serde(default)]
    pub location: String,
}

/// Request to replace the email template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplateRequest {
    #[serde(default)]
    pub template: String,
}

/// Request to replace the form title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormTitleRequest {
    #[serde(default)]
    pub title: String,
}
