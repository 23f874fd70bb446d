use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

/// Donor submission as received from the intake form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DonorRecord {
    #[validate(custom(function = "validate_not_blank", message = "First name is required"))]
    #[serde(rename = "firstName", alias = "first_name", default)]
    pub first_name: String,
    #[validate(custom(function = "validate_not_blank", message = "Last name is required"))]
    #[serde(rename = "lastName", alias = "last_name", default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[validate(custom(function = "validate_not_blank", message = "Donation type is required"))]
    #[serde(rename = "donationType", alias = "donation_type", default)]
    pub donation_type: String,
    #[serde(rename = "merchandiseItems", alias = "merchandise_items", default)]
    pub merchandise_items: Vec<String>,
    #[validate(custom(function = "validate_donation_date"))]
    #[serde(rename = "donationDate", alias = "donation_date", default)]
    pub donation_date: String,
    #[serde(default)]
    pub location: String,
}

impl DonorRecord {
    /// True when the receipt should itemize merchandise rather than the donation type
    pub fn itemizes_merchandise(&self) -> bool {
        self.donation_type == "merchandise" && !self.merchandise_items.is_empty()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_donation_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| {
            let mut err = ValidationError::new("donation_date");
            err.message = Some("Donation date must be formatted as YYYY-MM-DD".into());
            err
        })
}

/// Constituent record as returned by the Bloomerang listing endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CandidateConstituent {
    pub id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<PrimaryEmail>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub primary_phone: Option<PrimaryPhone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl CandidateConstituent {
    /// Primary email value, falling back to the legacy flat field
    pub fn email(&self) -> &str {
        self.primary_email
            .as_ref()
            .and_then(|e| e.value.as_deref())
            .filter(|v| !v.is_empty())
            .or(self.email_address.as_deref())
            .unwrap_or("")
    }

    /// Primary phone number, falling back to the legacy flat field
    pub fn phone(&self) -> &str {
        self.primary_phone
            .as_ref()
            .and_then(|p| p.number.as_deref())
            .filter(|v| !v.is_empty())
            .or(self.phone_number.as_deref())
            .unwrap_or("")
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimaryEmail {
    #[serde(rename = "Value", default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimaryPhone {
    #[serde(rename = "Number", default)]
    pub number: Option<String>,
}

/// Nested CRM objects occasionally arrive as strings or arrays; treat those as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Payload for creating a constituent in Bloomerang
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewConstituent {
    #[serde(rename = "Type")]
    pub kind: String,
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub primary_email: TypedValue,
    pub primary_phone: TypedNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_address: Option<TypedStreet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypedValue {
    #[serde(rename = "Type")]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypedNumber {
    #[serde(rename = "Type")]
    pub kind: String,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypedStreet {
    pub street: String,
    #[serde(rename = "Type")]
    pub kind: String,
}

impl NewConstituent {
    pub fn from_donor(donor: &DonorRecord) -> Self {
        let primary_address = if donor.address.trim().is_empty() {
            None
        } else {
            Some(TypedStreet {
                street: donor.address.clone(),
                kind: "Home".to_string(),
            })
        };

        Self {
            kind: "Individual".to_string(),
            status: "Active".to_string(),
            first_name: donor.first_name.clone(),
            last_name: donor.last_name.clone(),
            primary_email: TypedValue {
                kind: "Home".to_string(),
                value: donor.email.clone(),
            },
            primary_phone: TypedNumber {
                kind: "Mobile".to_string(),
                number: donor.phone.clone(),
            },
            primary_address,
        }
    }
}

/// Field that contributed to a candidate's match score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Email,
    Phone,
    Name,
}

impl std::fmt::Display for MatchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MatchField::Email => "email",
            MatchField::Phone => "phone",
            MatchField::Name => "name",
        };
        f.write_str(label)
    }
}

/// Outcome of resolving a donor against the CRM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "matchedId")]
    pub matched_id: Option<i64>,
    #[serde(rename = "createdNew")]
    pub created_new: bool,
    pub synced: bool,
    pub message: String,
}

impl MatchResult {
    pub fn existing(id: i64) -> Self {
        Self {
            matched_id: Some(id),
            created_new: false,
            synced: true,
            message: "Found existing constituent".to_string(),
        }
    }

    pub fn created(id: Option<i64>) -> Self {
        Self {
            matched_id: id,
            created_new: true,
            synced: true,
            message: "Successfully added to Bloomerang".to_string(),
        }
    }

    pub fn not_synced(message: impl Into<String>) -> Self {
        Self {
            matched_id: None,
            created_new: false,
            synced: false,
            message: message.into(),
        }
    }
}

/// Match scoring weights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchWeights {
    pub email: u32,
    pub phone: u32,
    pub name: u32,
    pub threshold: u32,
    pub min_phone_digits: usize,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            email: 100,
            phone: 50,
            name: 30,
            threshold: 80,
            min_phone_digits: 10,
        }
    }
}

/// Per-step outcome of a donation submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub record_saved: bool,
    pub email_sent: bool,
    pub crm: MatchResult,
}
