//! Configuration Loader
//!
//! Loads the file named on the command line and layers environment
//! overrides (`EVENTSWEEP_` prefix, `__` separator - e.g.
//! `EVENTSWEEP_PRIMARY__URL`) on top, then validates the result.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::{ConfigResult, ConfigurationError};
use super::SweepConfig;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "EVENTSWEEP";

/// Loaded, validated configuration plus where it came from.
#[derive(Debug)]
pub struct ConfigManager {
    config: SweepConfig,
    path: PathBuf,
}

impl ConfigManager {
    /// Load and validate configuration from a file path.
    pub fn load_from_path(path: &Path) -> ConfigResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX).separator("__"),
            )
            .build()
            .map_err(|err| ConfigurationError::load(path.display().to_string(), err))?;

        let config: SweepConfig = settings
            .try_deserialize()
            .map_err(|err| ConfigurationError::load(path.display().to_string(), err))?;

        config.validate()?;

        debug!(
            path = %path.display(),
            page_size = config.run.page_size,
            "configuration loaded"
        );

        Ok(Self {
            config,
            path: path.to_path_buf(),
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
