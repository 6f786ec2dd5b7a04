use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5052";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub endpoint: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub color: bool,
    pub public_url: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            color: true,
            public_url: None,
        }
    }
}

/// Values given on the command line. Anything set here wins over the file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub no_color: bool,
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "loaded config");
        config.validate()
    }

    /// File values (or defaults without a file) with the overrides applied.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(overrides).validate()
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(poll_interval_secs) = overrides.poll_interval_secs {
            self.poll_interval_secs = poll_interval_secs;
        }
        if overrides.no_color {
            self.color = false;
        }
        self
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Zero {
                field: "poll_interval_secs",
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Zero {
                field: "request_timeout_secs",
            });
        }
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// URL handed to consensus clients in the setup guide.
    pub fn public_url<'a>(&'a self, status_public_url: Option<&'a str>) -> &'a str {
        self.public_url
            .as_deref()
            .or(status_public_url)
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.endpoint)
    }
}
