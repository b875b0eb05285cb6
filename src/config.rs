use crate::error::Result;
use serde::Deserialize;
use std::env;
use std::fs;
use std::time::Duration;
use tracing::debug;

const CONFIG_PATH: &str = "config.toml";

/// Settings read from `config.toml`. Every field has a default so the file is
/// optional; credentials never live here, they come from the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub providers: ProviderSettings,
    pub ai: AiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub default_timeout_seconds: u64,
    pub ticketmaster_timeout_seconds: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            default_timeout_seconds: 8,
            ticketmaster_timeout_seconds: 10,
        }
    }
}

impl ProviderSettings {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_seconds)
    }

    pub fn ticketmaster_timeout(&self) -> Duration {
        Duration::from_secs(self.ticketmaster_timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 1000,
            temperature: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub ticketmaster_api_key: Option<String>,
    pub eventbrite_api_key: Option<String>,
    pub dice_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub bandsintown_app_id: String,
    pub settings: FileConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let settings = match fs::read_to_string(CONFIG_PATH) {
            Ok(content) => toml::from_str(&content)?,
            Err(_) => {
                debug!("No {} found, using default settings", CONFIG_PATH);
                FileConfig::default()
            }
        };

        Ok(Self {
            ticketmaster_api_key: env_opt("TICKETMASTER_API_KEY"),
            eventbrite_api_key: env_opt("EVENTBRITE_API_KEY"),
            dice_api_key: env_opt("DICE_API_KEY"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            bandsintown_app_id: env_opt("BANDSINTOWN_APP_ID")
                .unwrap_or_else(|| "concert-scout".to_string()),
            settings,
        })
    }
}

/// Treat unset and empty environment variables the same way.
fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_defaults_when_empty() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.providers.default_timeout_seconds, 8);
        assert_eq!(config.providers.ticketmaster_timeout_seconds, 10);
        assert_eq!(config.ai.model, "gpt-3.5-turbo");
        assert_eq!(config.ai.max_tokens, 1000);
    }

    #[test]
    fn file_config_overrides() {
        let config: FileConfig = toml::from_str(
            r#"
            [providers]
            default_timeout_seconds = 3

            [ai]
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();
        assert_eq!(config.providers.default_timeout(), Duration::from_secs(3));
        // Untouched sections keep their defaults
        assert_eq!(config.providers.ticketmaster_timeout(), Duration::from_secs(10));
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert!((config.ai.temperature - 0.3).abs() < f32::EPSILON);
    }
}
