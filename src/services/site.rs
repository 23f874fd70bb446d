use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;

use crate::core::DEFAULT_EMAIL_TEMPLATE;

pub const LOCATIONS_FILE: &str = "donation_locations.json";
pub const FORM_TITLE_FILE: &str = "form_title.txt";
pub const EMAIL_TEMPLATE_FILE: &str = "email_template.txt";

pub const DEFAULT_FORM_TITLE: &str = "Marketing Donor Registration Form";

/// Locations offered before any have been configured
pub fn default_locations() -> Vec<String> {
    vec![
        "Gulliver Prep | Marian C. Krutulis PK-8 Campus".to_string(),
        "Gulliver Prep | Upper School Campus".to_string(),
    ]
}

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Location name cannot be empty")]
    EmptyLocation,

    #[error("Location already exists")]
    DuplicateLocation,

    #[error("Location not found")]
    LocationNotFound,

    #[error("Cannot delete the last location")]
    LastLocation,

    #[error("Template cannot be empty")]
    EmptyTemplate,

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SiteError {
    /// Rejected input, as opposed to a storage failure
    pub fn is_validation(&self) -> bool {
        !matches!(self, SiteError::Io(_) | SiteError::Serialization(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SiteError::LocationNotFound)
    }
}

/// File-backed settings edited from the settings page
///
/// Reads fall back to built-in defaults when a file is missing or unreadable.
#[derive(Debug, Clone)]
pub struct SiteStore {
    dir: PathBuf,
}

impl SiteStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub async fn locations(&self) -> Vec<String> {
        let path = self.file(LOCATIONS_FILE);
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Error loading locations from {}: {}", path.display(), e);
                default_locations()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => default_locations(),
            Err(e) => {
                tracing::warn!("Error loading locations from {}: {}", path.display(), e);
                default_locations()
            }
        }
    }

    async fn save_locations(&self, locations: &[String]) -> Result<(), SiteError> {
        let json = serde_json::to_string_pretty(locations)?;
        fs::write(self.file(LOCATIONS_FILE), json).await?;
        Ok(())
    }

    pub async fn add_location(&self, location: &str) -> Result<(), SiteError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(SiteError::EmptyLocation);
        }

        let mut locations = self.locations().await;
        if locations.iter().any(|l| l == location) {
            return Err(SiteError::DuplicateLocation);
        }

        locations.push(location.to_string());
        self.save_locations(&locations).await
    }

    pub async fn remove_location(&self, location: &str) -> Result<(), SiteError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(SiteError::EmptyLocation);
        }

        let mut locations = self.locations().await;
        let index = locations
            .iter()
            .position(|l| l == location)
            .ok_or(SiteError::LocationNotFound)?;

        if locations.len() <= 1 {
            return Err(SiteError::LastLocation);
        }

        locations.remove(index);
        self.save_locations(&locations).await
    }

    pub async fn form_title(&self) -> String {
        match fs::read_to_string(self.file(FORM_TITLE_FILE)).await {
            Ok(title) => title.trim().to_string(),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Error loading form title: {}", e);
                }
                DEFAULT_FORM_TITLE.to_string()
            }
        }
    }

    pub async fn set_form_title(&self, title: &str) -> Result<(), SiteError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SiteError::EmptyTitle);
        }
        fs::write(self.file(FORM_TITLE_FILE), title).await?;
        Ok(())
    }

    pub async fn email_template(&self) -> String {
        match fs::read_to_string(self.file(EMAIL_TEMPLATE_FILE)).await {
            Ok(template) => template,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Error loading template: {}", e);
                }
                DEFAULT_EMAIL_TEMPLATE.to_string()
            }
        }
    }

    pub async fn set_email_template(&self, template: &str) -> Result<(), SiteError> {
        if template.is_empty() {
            return Err(SiteError::EmptyTemplate);
        }
        fs::write(self.file(EMAIL_TEMPLATE_FILE), template).await?;
        Ok(())
    }

    /// Overwrite the stored template with the default and return it
    pub async fn reset_email_template(&self) -> Result<String, SiteError> {
        self.set_email_template(DEFAULT_EMAIL_TEMPLATE).await?;
        Ok(DEFAULT_EMAIL_TEMPLATE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_when_nothing_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = SiteStore::new(dir.path());

        assert_eq!(store.locations().await, default_locations());
        assert_eq!(store.form_title().await, DEFAULT_FORM_TITLE);
        assert_eq!(store.email_template().await, DEFAULT_EMAIL_TEMPLATE);
    }

    #[tokio::test]
    async fn test_add_and_remove_locations() {
        let dir = tempfile::tempdir().unwrap();
        let store = SiteStore::new(dir.path());

        store.add_location("  Coral Gables Store ").await.unwrap();
        assert!(matches!(
            store.add_location("Coral Gables Store").await,
            Err(SiteError::DuplicateLocation)
        ));
        assert_eq!(store.locations().await.last().unwrap(), "Coral Gables Store");

        store.remove_location("Gulliver Prep | Upper School Campus").await.unwrap();
        assert_eq!(store.locations().await.len(), 2);

        let err = store.remove_location("Nowhere").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_cannot_remove_last_location() {
        let dir = tempfile::tempdir().unwrap();
        let store = SiteStore::new(dir.path());
        let locations = default_locations();

        store.remove_location(&locations[0]).await.unwrap();
        let err = store.remove_location(&locations[1]).await.unwrap_err();

        assert!(matches!(err, SiteError::LastLocation));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_blank_inputs_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SiteStore::new(dir.path());

        assert!(matches!(store.add_location("   ").await, Err(SiteError::EmptyLocation)));
        assert!(matches!(store.set_form_title(" ").await, Err(SiteError::EmptyTitle)));
        assert!(matches!(store.set_email_template("").await, Err(SiteError::EmptyTemplate)));
    }

    #[tokio::test]
    async fn test_corrupt_locations_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LOCATIONS_FILE), "{not json").unwrap();

        let store = SiteStore::new(dir.path());

        assert_eq!(store.locations().await, default_locations());
    }

    #[tokio::test]
    async fn test_title_and_template_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SiteStore::new(dir.path());

        store.set_form_title("  Spring Drive  ").await.unwrap();
        store.set_email_template("Hi {firstName}").await.unwrap();
        assert_eq!(store.form_title().await, "Spring Drive");
        assert_eq!(store.email_template().await, "Hi {firstName}");

        let restored = store.reset_email_template().await.unwrap();
        assert_eq!(restored, DEFAULT_EMAIL_TEMPLATE);
        assert_eq!(store.email_template().await, DEFAULT_EMAIL_TEMPLATE);
    }
}
