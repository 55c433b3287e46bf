use crate::core::currency::{DEFAULT_BASE_CURRENCY, currency_info};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Environment variable overriding the configured exchange rate API key.
pub const APP_ID_ENV: &str = "XCONV_OPENEXCHANGE_APP_ID";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenExchangeRatesConfig {
    pub base_url: String,
    #[serde(default)]
    pub app_id: Option<String>,
}

impl Default for OpenExchangeRatesConfig {
    fn default() -> Self {
        OpenExchangeRatesConfig {
            base_url: "https://openexchangerates.org/api".to_string(),
            app_id: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openexchangerates: OpenExchangeRatesConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// How long fetched rates are served without asking the network.
    pub ttl_secs: u64,
    /// Minimum time between two network requests.
    pub min_refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: 30 * 60,
            min_refresh_interval_secs: 60,
            request_timeout_secs: 10,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn min_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.min_refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_base_currency() -> String {
    DEFAULT_BASE_CURRENCY.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_currency: default_base_currency(),
            providers: ProvidersConfig::default(),
            cache: CacheConfig::default(),
            data_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "xconv", "xconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "xconv", "xconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        if currency_info(&config.base_currency).is_none() {
            bail!("Unsupported base currency: {}", config.base_currency);
        }
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// API key from the environment, else from the config file.
    pub fn app_id(&self) -> Option<String> {
        std::env::var(APP_ID_ENV)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| self.providers.openexchangerates.app_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
base_currency: "EUR"
providers:
  openexchangerates:
    base_url: "http://example.com/api"
    app_id: "abcdef123456"
cache:
  ttl_secs: 600
data_path: "/tmp/xconv"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(
            config.providers.openexchangerates.base_url,
            "http://example.com/api"
        );
        assert_eq!(
            config.providers.openexchangerates.app_id.as_deref(),
            Some("abcdef123456")
        );
        assert_eq!(config.cache.ttl(), Duration::from_secs(600));
        // Unset cache fields keep their defaults
        assert_eq!(config.cache.min_refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.cache.request_timeout(), Duration::from_secs(10));
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/xconv")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.base_currency, "USD");
        assert_eq!(
            config.providers.openexchangerates.base_url,
            "https://openexchangerates.org/api"
        );
        assert!(config.providers.openexchangerates.app_id.is_none());
        assert_eq!(config.cache.ttl(), Duration::from_secs(1800));
    }

    #[test]
    fn test_unknown_base_currency_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "base_currency: \"EURO\"\n").unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported base currency: EURO");

        fs::write(&path, "base_currency: \"eur\"\n").unwrap();
        assert!(AppConfig::load_from_path(&path).is_ok());
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/definitely/not/here/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
