//! Field normalization shared by donor input and CRM candidates.

/// Lowercase and trim an email address
#[inline]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Keep only the digits of a phone number
#[inline]
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Lowercase and trim a first or last name
#[inline]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Donor identity fields after normalization, computed once per scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDonor {
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
}

impl NormalizedDonor {
    pub fn new(email: &str, phone: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            email: normalize_email(email),
            phone: normalize_phone(phone),
            first_name: normalize_name(first_name),
            last_name: normalize_name(last_name),
        }
    }
}

impl From<&crate::models::DonorRecord> for NormalizedDonor {
    fn from(donor: &crate::models::DonorRecord) -> Self {
        Self::new(&donor.email, &donor.phone, &donor.first_name, &donor.last_name)
    }
}
