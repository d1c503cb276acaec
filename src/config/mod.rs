use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

/// Overrides `api.base_url` when set.
pub static API_URL_ENV: &str = "KELAS_API_URL";

mod config_dir;
pub use config_dir::{find_config_file, read_config, read_config_at, user_config_file};

mod error;
pub use error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    api: Api,
    ui: Ui,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Api {
    base_url: String,
    timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Ui {
    debounce_ms: u64,
    rows_per_page: Vec<u32>,
    catalog_page_size: u32,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: String::from("http://127.0.0.1:3000"),
            timeout_secs: 30,
        }
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            debounce_ms: 800,
            rows_per_page: vec![10, 25, 50],
            catalog_page_size: 6,
        }
    }
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                match Self::load(use_local) {
                    Ok(config) => config,
                    Err(e) => {
                        crate::error::log_error(&e);
                        tracing::error!("Config is invalid.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    /// Reads the config file, falling back to defaults when there is none,
    /// then applies environment overrides.
    pub fn load(use_local: bool) -> ConfigResult<Self> {
        let mut config = match read_config(use_local) {
            Ok(bytes) => Self::from_slice(&bytes)?,
            Err(ConfigError::ConfigNotFound(_)) => {
                tracing::debug!("no config file found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };

        let _ = dotenvy::dotenv();
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api.base_url = url;
        }

        config.api.url()?;
        Ok(config)
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let text = String::from_utf8_lossy(bytes);
        Ok(toml::from_str(&text)?)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    #[inline]
    pub fn api(&self) -> &Api {
        &self.api
    }

    #[inline]
    pub fn ui(&self) -> &Ui {
        &self.ui
    }
}

impl Api {
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self) -> ConfigResult<url::Url> {
        url::Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            source,
        })
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Ui {
    #[inline]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[inline]
    pub fn rows_per_page(&self) -> &[u32] {
        &self.rows_per_page
    }

    #[inline]
    pub fn catalog_page_size(&self) -> u32 {
        self.catalog_page_size
    }
}
