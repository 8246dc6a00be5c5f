//! Chatbot configuration system.
//!
//! Provides TOML-based configuration with full validation. All config
//! sections use sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chatbot_config::{load_config, config_to_json};
//!
//! let config = load_config(None, None).expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{ChatbotConfig, LogLevel, CONFIG_SCHEMA_VERSION};

use std::path::Path;

use chatbot_common::ConfigError;

/// Environment variable that replaces `api.base_url` after loading.
pub const API_URL_ENV: &str = "CHATBOT_API_URL";

/// Load, apply URL overrides, and validate the config.
///
/// With `path` set, that file must exist. Without it the platform default
/// location is used and a commented default file is created if missing.
/// `base_url` (e.g. from the command line) takes precedence over
/// `CHATBOT_API_URL`, which takes precedence over the file.
pub fn load_config(path: Option<&Path>, base_url: Option<String>) -> Result<ChatbotConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    resolve(config, std::env::var(API_URL_ENV).ok(), base_url)
}

/// Apply both URL overrides in precedence order, then validate once.
fn resolve(
    mut config: ChatbotConfig,
    env_url: Option<String>,
    base_url: Option<String>,
) -> Result<ChatbotConfig, ConfigError> {
    apply_overrides(&mut config, env_url);
    apply_overrides(&mut config, base_url);
    validation::validate(&config)?;
    Ok(config)
}

/// Apply an externally supplied backend URL on top of the file config.
pub fn apply_overrides(config: &mut ChatbotConfig, api_url: Option<String>) {
    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
        tracing::debug!("api.base_url overridden to {url}");
        config.api.base_url = url.trim().to_string();
    }
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &ChatbotConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let json = config_to_json(&ChatbotConfig::default());
        assert!(json.contains("\"api\""));
        assert!(json.contains("\"chat\""));
        assert!(json.contains("\"logging\""));
        assert!(json.contains("\"INFO\""));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let json = config_to_json(&ChatbotConfig::default());
        let parsed: ChatbotConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.api.base_url, "http://localhost:8000");
        assert_eq!(parsed.chat.greeting, "Hello! Ask me anything.");
    }

    #[test]
    fn override_replaces_base_url() {
        let mut config = ChatbotConfig::default();
        apply_overrides(&mut config, Some(" https://chat.internal ".into()));
        assert_eq!(config.api.base_url, "https://chat.internal");
    }

    #[test]
    fn blank_override_is_ignored() {
        let mut config = ChatbotConfig::default();
        apply_overrides(&mut config, Some("   ".into()));
        apply_overrides(&mut config, None);
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn load_config_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\nmax_input_chars = 0\n").unwrap();

        let err = load_config(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_config_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn explicit_url_overrides_invalid_env_url() {
        let config = resolve(
            ChatbotConfig::default(),
            Some("not a url".into()),
            Some("https://chat.example.com".into()),
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://chat.example.com");
    }

    #[test]
    fn env_url_applies_without_explicit_url() {
        let config = resolve(
            ChatbotConfig::default(),
            Some("http://10.1.2.3:8000".into()),
            None,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://10.1.2.3:8000");

        let err = resolve(ChatbotConfig::default(), Some("ftp://nope".into()), None).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
