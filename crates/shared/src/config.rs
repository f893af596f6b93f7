//! Application configuration management.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration. Absent means the in-memory ledger is used.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Message intake configuration.
    #[serde(default)]
    pub intake: IntakeConfig,
    /// OpenAI-compatible extraction provider.
    #[serde(default)]
    pub openai: Option<OpenAiConfig>,
    /// WhatsApp Cloud API transport.
    #[serde(default)]
    pub whatsapp: Option<WhatsAppConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// IANA timezone used to compute "local midnight" for daily windows.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

impl LedgerConfig {
    /// Parses the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns an error message if the name is not a known IANA zone.
    pub fn tz(&self) -> Result<chrono_tz::Tz, String> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| format!("unknown timezone: {}", self.timezone))
    }
}

/// Message intake configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    /// Upper bound for a single extractor call, in seconds.
    #[serde(default = "default_extraction_timeout")]
    pub extraction_timeout_secs: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            extraction_timeout_secs: default_extraction_timeout(),
        }
    }
}

fn default_extraction_timeout() -> u64 {
    30
}

impl IntakeConfig {
    /// Extraction timeout as a `Duration`.
    #[must_use]
    pub const fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }
}

/// OpenAI-compatible provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Base URL of the API.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Model used for text extraction.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Model used for receipt images.
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    /// Model used for audio transcription.
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_vision_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

/// WhatsApp Cloud API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WhatsAppConfig {
    /// Permanent or system-user access token.
    pub access_token: String,
    /// Sending phone number id.
    pub phone_number_id: String,
    /// Token echoed back during webhook verification.
    #[serde(default)]
    pub verify_token: String,
    /// Graph API version.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Graph API base URL.
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,
}

fn default_api_version() -> String {
    "v18.0".to_string()
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ARA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(src: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(src, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_apply_to_empty_config() {
        let cfg = from_toml("");
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.database.is_none());
        assert_eq!(cfg.ledger.timezone, "America/Sao_Paulo");
        assert_eq!(cfg.intake.extraction_timeout(), Duration::from_secs(30));
        assert!(cfg.openai.is_none());
        assert!(cfg.whatsapp.is_none());
    }

    #[test]
    fn test_provider_sections() {
        let cfg = from_toml(
            r#"
            [openai]
            api_key = "sk-test"

            [whatsapp]
            access_token = "tok"
            phone_number_id = "123"
            "#,
        );
        let openai = cfg.openai.unwrap();
        assert_eq!(openai.chat_model, "gpt-3.5-turbo");
        assert_eq!(openai.transcription_model, "whisper-1");
        let wa = cfg.whatsapp.unwrap();
        assert_eq!(wa.api_version, "v18.0");
        assert_eq!(wa.base_url, "https://graph.facebook.com");
    }

    #[test]
    fn test_timezone_parsing() {
        let ok = LedgerConfig::default();
        assert_eq!(ok.tz().unwrap(), chrono_tz::America::Sao_Paulo);

        let bad = LedgerConfig {
            timezone: "Mars/Olympus".into(),
        };
        assert!(bad.tz().is_err());
    }
}
