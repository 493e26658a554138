//! # Configuration System
//!
//! Explicit, validated configuration for a maintenance run. All settings
//! come from the file named by `-c` (YAML or TOML), with environment
//! variables prefixed `EVENTSWEEP_` overriding file values. There are no
//! silent fallbacks: a file that fails to decode or validate is fatal
//! before any connection is opened.

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};

use crate::models::Tenant;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Default page size for every scan.
fn default_page_size() -> u32 {
    crate::scanner::DEFAULT_PAGE_SIZE
}

/// Default connection pool size per link.
fn default_pool() -> u32 {
    5
}

/// Default connection timeout; the legacy job waited 30 seconds.
fn default_connect_timeout() -> u64 {
    30
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweepConfig {
    /// Link 0 - primary document store.
    pub primary: LinkConfig,
    /// Link 1 - secondary relational store.
    pub secondary: LinkConfig,
    /// Run settings; every field has a default.
    #[serde(default)]
    pub run: RunSettings,
}

/// Connection settings for one link.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    pub url: String,
    #[serde(default = "default_pool")]
    pub pool: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

/// Settings governing the shape of a run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunSettings {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Optional single-tenant override; skips the registry scan.
    #[serde(default)]
    pub appid: Option<String>,
    /// Registry id paired with `appid`, needed by the join-driven
    /// operation.
    #[serde(default)]
    pub lib_id: Option<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            appid: None,
            lib_id: None,
        }
    }
}

impl SweepConfig {
    /// Validate the loaded configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.primary.url.is_empty() {
            return Err(ConfigurationError::invalid("primary.url must be set"));
        }
        if self.secondary.url.is_empty() {
            return Err(ConfigurationError::invalid("secondary.url must be set"));
        }
        if self.run.page_size == 0 {
            return Err(ConfigurationError::invalid("run.page_size must be >= 1"));
        }
        Ok(())
    }

    /// The configured single-tenant override, if any.
    pub fn tenant_override(&self) -> Option<Tenant> {
        self.run.appid.as_ref().map(|appid| Tenant {
            appid: appid.clone(),
            lib_id: self.run.lib_id.clone().unwrap_or_default(),
        })
    }
}
