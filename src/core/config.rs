use crate::core::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::core::chain::DEFAULT_TIMEOUT;
use crate::core::model::Account;
use crate::providers::{frankfurter, open_er};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default = "default_primary")]
    pub primary: ProviderConfig,
    #[serde(default = "default_secondary")]
    pub secondary: ProviderConfig,
}

fn default_primary() -> ProviderConfig {
    ProviderConfig {
        base_url: frankfurter::DEFAULT_BASE_URL.to_string(),
    }
}

fn default_secondary() -> ProviderConfig {
    ProviderConfig {
        base_url: open_er::DEFAULT_BASE_URL.to_string(),
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            primary: default_primary(),
            secondary: default_secondary(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RatesConfig {
    /// Upper bound on each provider request.
    pub timeout_secs: u64,
    /// How long a fetched rate is reused.
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
    /// Extra attempts after a failed request.
    pub retries: usize,
}

impl Default for RatesConfig {
    fn default() -> Self {
        RatesConfig {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            cache_capacity: DEFAULT_CAPACITY,
            retries: 1,
        }
    }
}

impl RatesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Preferred currency for totals.
    pub currency: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Display names for account categories.
    #[serde(default)]
    pub categories: HashMap<String, String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub rates: RatesConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "networth").context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.currency.trim().is_empty() {
            bail!("Preferred currency must not be empty");
        }
        let mut seen = HashSet::new();
        for account in &self.accounts {
            if account.id.trim().is_empty() {
                bail!("Account '{}' has an empty id", account.name);
            }
            if !seen.insert(account.id.as_str()) {
                bail!("Duplicate account id: {}", account.id);
            }
            if account.currency.trim().is_empty() {
                bail!("Account '{}' has no currency", account.id);
            }
        }
        Ok(())
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }
}
