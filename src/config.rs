use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::services::NotifierSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub roster: RosterSettings,
    #[serde(default)]
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterSettings {
    /// CSV file path or http(s) URL
    pub source: String,
    #[serde(default = "default_roster_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

fn default_roster_ttl() -> u64 { 600 }
fn default_download_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    #[serde(default = "default_geocoding_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_geocoding_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_roster_lookup_timeout")]
    pub roster_timeout_secs: u64,
    /// Pause between consecutive roster lookups
    #[serde(default = "default_lookup_interval")]
    pub lookup_interval_ms: u64,
    #[serde(default = "default_country_hint")]
    pub country_hint: String,
    #[serde(default = "default_region_hint")]
    pub region_hint: String,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            endpoint: default_geocoding_endpoint(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_geocoding_timeout(),
            roster_timeout_secs: default_roster_lookup_timeout(),
            lookup_interval_ms: default_lookup_interval(),
            country_hint: default_country_hint(),
            region_hint: default_region_hint(),
        }
    }
}

fn default_geocoding_endpoint() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { concat!("lifegroup-finder/", env!("CARGO_PKG_VERSION")).to_string() }
fn default_geocoding_timeout() -> u64 { 30 }
fn default_roster_lookup_timeout() -> u64 { 10 }
fn default_lookup_interval() -> u64 { 1000 }
fn default_country_hint() -> String { "Brasil".to_string() }
fn default_region_hint() -> String { "São Paulo".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub test_mode: bool,
    pub test_contact: Option<String>,
    #[serde(default = "default_messaging_base_url")]
    pub messaging_base_url: String,
    #[serde(default = "default_message_template")]
    pub message_template: String,
    #[serde(default = "default_notify_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            test_mode: false,
            test_contact: None,
            messaging_base_url: default_messaging_base_url(),
            message_template: default_message_template(),
            request_timeout_secs: default_notify_timeout(),
        }
    }
}

fn default_messaging_base_url() -> String { crate::services::notifier::DEFAULT_MESSAGING_BASE_URL.to_string() }
fn default_message_template() -> String { crate::services::notifier::DEFAULT_MESSAGE_TEMPLATE.to_string() }
fn default_notify_timeout() -> u64 { 15 }

impl NotificationSettings {
    /// Dispatcher settings derived from this section
    pub fn notifier_settings(&self) -> NotifierSettings {
        NotifierSettings {
            webhook_url: self.webhook_url.clone().filter(|url| !url.is_empty()),
            test_mode: self.test_mode,
            test_contact: self.test_contact.clone(),
            messaging_base_url: self.messaging_base_url.clone(),
            message_template: self.message_template.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_showcase_limit")]
    pub showcase_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { showcase_limit: default_showcase_limit() }
    }
}

fn default_showcase_limit() -> usize { crate::core::DEFAULT_SHOWCASE_LIMIT }

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

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LIFEGROUPS_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = base_builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LIFEGROUPS__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = base_builder()?
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn base_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("roster.source", "Cadastro dos Lifegroups.csv")
}

fn environment() -> Environment {
    Environment::with_prefix("LIFEGROUPS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the plain deployment variables on top of the layered config
///
/// `ROSTER_SOURCE` and `WEBHOOK_URL` win over every other source.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(source) = env::var("ROSTER_SOURCE") {
        builder = builder.set_override("roster.source", source)?;
    }
    if let Ok(webhook_url) = env::var("WEBHOOK_URL") {
        builder = builder.set_override("notifications.webhook_url", webhook_url)?;
    }

    builder.build()
}
