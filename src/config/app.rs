// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use super::{CATEGORY_NAME, DEFAULT_CONFIG_PATH, FIRST_RUN_DELAY_SECS, NEWSAPI_ENDPOINT};
use crate::scheduler::Recurrence;

pub const ENV_CONFIG_PATH: &str = "AUTOPOST_CONFIG_PATH";
pub const ENV_API_KEY: &str = "TECH_NEWS_API_KEY";
pub const ENV_DATA_PATH: &str = "AUTOPOST_DATA_PATH";
pub const ENV_BIND_ADDR: &str = "AUTOPOST_BIND_ADDR";

fn default_endpoint() -> String {
    NEWSAPI_ENDPOINT.to_string()
}
fn default_news_category() -> String {
    "technology".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_page_size() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_category_name() -> String {
    CATEGORY_NAME.to_string()
}
fn default_first_run_delay_secs() -> u64 {
    FIRST_RUN_DELAY_SECS
}
fn default_data_path() -> PathBuf {
    PathBuf::from("data/content.json")
}
fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// NewsAPI credential. Missing or blank means fallback articles only.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// NewsAPI `category` query parameter.
    #[serde(default = "default_news_category")]
    pub news_category: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name of the category published items are filed under.
    #[serde(default = "default_category_name")]
    pub category_name: String,
    #[serde(default = "default_first_run_delay_secs")]
    pub first_run_delay_secs: u64,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            news_category: default_news_category(),
            language: default_language(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            category_name: default_category_name(),
            first_run_delay_secs: default_first_run_delay_secs(),
            recurrence: Recurrence::default(),
            data_path: default_data_path(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl AppConfig {
    /// Load using env var + fallbacks:
    /// 1) $AUTOPOST_CONFIG_PATH (must exist)
    /// 2) config/autopost.toml
    /// 3) built-in defaults
    ///
    /// Env overrides are applied last.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        path.display()
                    ));
                }
                Self::from_path(&path)?
            }
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_path(&path)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides(|k| env::var(k).ok());
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing config at {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Apply overrides from a key lookup (usually the process environment).
    pub fn apply_env_overrides<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(p) = get(ENV_DATA_PATH).filter(|p| !p.trim().is_empty()) {
            self.data_path = PathBuf::from(p);
        }
        if let Some(addr) = get(ENV_BIND_ADDR).filter(|a| !a.trim().is_empty()) {
            self.bind_addr = addr;
        }
    }

    /// The credential, if present and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    fn sanitize(&mut self) {
        self.page_size = self.page_size.clamp(1, 100);
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        self.category_name = self.category_name.trim().to_string();
        if self.category_name.is_empty() {
            self.category_name = default_category_name();
        }
        // never later than one full period after activation
        self.first_run_delay_secs = self
            .first_run_delay_secs
            .min(self.recurrence.period().as_secs());
    }
}
