use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::ScanLimits;
use crate::models::MatchWeights;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub organization: OrganizationSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub email: EmailSettings,
    #[serde(default)]
    pub smtp: SmtpSettings,
    #[serde(default)]
    pub graph: GraphSettings,
    #[serde(default)]
    pub bloomerang: BloomerangSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
    #[serde(default)]
    pub debug: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            debug: false,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }

/// Organization details printed on receipts
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationSettings {
    #[serde(default = "default_org_name")]
    pub name: String,
    #[serde(default = "default_org_address")]
    pub address: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl Default for OrganizationSettings {
    fn default() -> Self {
        Self {
            name: default_org_name(),
            address: default_org_address(),
            tax_id: String::new(),
            phone: String::new(),
            email: String::new(),
        }
    }
}

fn default_org_name() -> String { "Goodwill Industries of South Florida, Inc.".to_string() }
fn default_org_address() -> String { "2121 NW 21st Street, Miami, FL 33142".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_csv_file")]
    pub csv_file: PathBuf,
    /// Directory for locations, form title and email template files
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_web_root")]
    pub web_root: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            csv_file: default_csv_file(),
            data_dir: None,
            web_root: default_web_root(),
        }
    }
}

impl StorageSettings {
    /// Azure App Service only persists `/home` across deployments
    pub fn resolved_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None if Path::new("/home/site/wwwroot").exists() => PathBuf::from("/home"),
            None => PathBuf::from("."),
        }
    }
}

fn default_csv_file() -> PathBuf { PathBuf::from("donors.csv") }
fn default_web_root() -> PathBuf { PathBuf::from("web") }

/// Email transport selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailMode {
    Smtp,
    Microsoft,
}

impl EmailMode {
    pub fn label(&self) -> &'static str {
        match self {
            EmailMode::Smtp => "SMTP",
            EmailMode::Microsoft => "Microsoft Graph API",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    #[serde(default = "default_email_mode")]
    pub mode: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self { mode: default_email_mode() }
    }
}

impl EmailSettings {
    /// Anything other than `microsoft` falls back to SMTP
    pub fn email_mode(&self) -> EmailMode {
        match self.mode.trim().to_lowercase().as_str() {
            "microsoft" => EmailMode::Microsoft,
            _ => EmailMode::Smtp,
        }
    }
}

fn default_email_mode() -> String { "smtp".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    #[serde(default = "default_smtp_server")]
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub sender_email: String,
    #[serde(default)]
    pub sender_password: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            server: default_smtp_server(),
            port: default_smtp_port(),
            sender_email: String::new(),
            sender_password: String::new(),
        }
    }
}

fn default_smtp_server() -> String { "smtp.gmail.com".to_string() }
fn default_smtp_port() -> u16 { 587 }

/// Microsoft Graph (client credentials) settings
#[derive(Debug, Clone, Deserialize)]
pub struct GraphSettings {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub sender_email: String,
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            sender_email: String::new(),
            login_url: default_login_url(),
            graph_url: default_graph_url(),
        }
    }
}

fn default_login_url() -> String { "https://login.microsoftonline.com".to_string() }
fn default_graph_url() -> String { "https://graph.microsoft.com".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct BloomerangSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_bloomerang_url")]
    pub api_url: String,
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

impl Default for BloomerangSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            api_url: default_bloomerang_url(),
            verify_ssl: true,
        }
    }
}

fn default_bloomerang_url() -> String { "https://api.bloomerang.co/v2".to_string() }
fn default_true() -> bool { true }

/// Constituent matching policy
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default)]
    pub weights: WeightsConfig,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            weights: WeightsConfig::default(),
        }
    }
}

impl MatchingSettings {
    pub fn scan_limits(&self) -> ScanLimits {
        ScanLimits {
            page_size: self.page_size,
            max_pages: self.max_pages,
        }
    }

    pub fn match_weights(&self) -> MatchWeights {
        MatchWeights {
            email: self.weights.email,
            phone: self.weights.phone,
            name: self.weights.name,
            threshold: self.weights.threshold,
            min_phone_digits: self.weights.min_phone_digits,
        }
    }
}

fn default_page_size() -> usize { 50 }
fn default_max_pages() -> usize { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_email_weight")]
    pub email: u32,
    #[serde(default = "default_phone_weight")]
    pub phone: u32,
    #[serde(default = "default_name_weight")]
    pub name: u32,
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    #[serde(default = "default_min_phone_digits")]
    pub min_phone_digits: usize,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            email: default_email_weight(),
            phone: default_phone_weight(),
            name: default_name_weight(),
            threshold: default_threshold(),
            min_phone_digits: default_min_phone_digits(),
        }
    }
}

fn default_email_weight() -> u32 { 100 }
fn default_phone_weight() -> u32 { 50 }
fn default_name_weight() -> u32 { 30 }
fn default_threshold() -> u32 { 80 }
fn default_min_phone_digits() -> usize { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

/// Flat environment variables from earlier deployments, mapped onto config keys
const LEGACY_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("DEBUG", "server.debug"),
    ("EMAIL_MODE", "email.mode"),
    ("SMTP_SERVER", "smtp.server"),
    ("SMTP_PORT", "smtp.port"),
    ("SENDER_EMAIL", "smtp.sender_email"),
    ("SENDER_PASSWORD", "smtp.sender_password"),
    ("AZURE_TENANT_ID", "graph.tenant_id"),
    ("AZURE_CLIENT_ID", "graph.client_id"),
    ("AZURE_CLIENT_SECRET", "graph.client_secret"),
    ("MS_SENDER_EMAIL", "graph.sender_email"),
    ("BLOOMERANG_ENABLED", "bloomerang.enabled"),
    ("BLOOMERANG_API_KEY", "bloomerang.api_key"),
    ("BLOOMERANG_API_URL", "bloomerang.api_url"),
    ("BLOOMERANG_VERIFY_SSL", "bloomerang.verify_ssl"),
    ("ORG_NAME", "organization.name"),
    ("ORG_ADDRESS", "organization.address"),
    ("ORG_TAX_ID", "organization.tax_id"),
    ("ORG_PHONE", "organization.phone"),
    ("ORG_EMAIL", "organization.email"),
    ("CSV_FILE", "storage.csv_file"),
];

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the structs
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables prefixed with DONOR, e.g. DONOR__SMTP__PORT
    /// 5. Flat legacy variables such as SMTP_SERVER or BLOOMERANG_API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("DONOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_legacy_env(settings, |name| std::env::var(name).ok())?;

        settings.try_deserialize()
    }

    /// Default log filter, `debug` when the server runs in debug mode
    pub fn log_directive(&self) -> &str {
        if self.server.debug {
            "debug"
        } else {
            &self.logging.level
        }
    }
}

/// Layer the legacy variables returned by `lookup` over an already built config
fn apply_legacy_env<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in LEGACY_ENV_OVERRIDES {
        if let Some(value) = lookup(var) {
            builder = builder.set_override(*key, value)?;
        }
    }

    builder.build()
}
