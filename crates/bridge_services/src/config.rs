//! Typed bridge configuration loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bridge_host::ProductKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name the host shell looks for in its config directory.
pub const BRIDGE_CONFIG_FILE: &str = "bridge.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Runtime settings for the bridge services. Every field has a default.
pub struct BridgeConfig {
    /// Product used when `Billing.queryProduct`/`Billing.purchase` omit `productId`.
    pub default_product_id: String,
    /// Product family used when `Billing.queryProduct` omits `productKind`.
    pub default_product_kind: ProductKind,
    /// Upper bound for every call into an external service, in milliseconds.
    pub external_timeout_ms: u64,
    /// Event length applied when a calendar request has no end time.
    pub default_event_duration_minutes: i64,
    /// Time-zone identifier stored with inserted events; process-local when unset.
    pub time_zone: Option<String>,
    /// Directory name for sandboxed storage under the host data directory.
    pub storage_dir_name: String,
    /// Default `tracing` filter; `RUST_LOG` takes precedence.
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_product_id: "trip_premium".to_string(),
            default_product_kind: ProductKind::Subscription,
            external_timeout_ms: 30_000,
            default_event_duration_minutes: 60,
            time_zone: None,
            storage_dir_name: "storage_files".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Error)]
/// Failure to read or decode a bridge config file.
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Config path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not valid bridge TOML.
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },
}

impl BridgeConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, unknown keys or out-of-range values.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Self::parse(Path::new("<inline>"), raw)
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let config: Self = toml::from_str(raw).map_err(|err| parse_error(err.to_string()))?;
        if config.default_event_duration_minutes <= 0 {
            return Err(parse_error(format!(
                "default_event_duration_minutes must be positive, got {}",
                config.default_event_duration_minutes
            )));
        }
        if config.external_timeout_ms == 0 {
            return Err(parse_error("external_timeout_ms must be positive".to_string()));
        }
        Ok(config)
    }

    /// Loads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and [`ConfigError::Parse`]
    /// when it does not decode or holds out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &body)
    }

    /// Loads a config file, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`] for files that exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Returns the external-call limit as a [`Duration`].
    pub fn external_timeout(&self) -> Duration {
        Duration::from_millis(self.external_timeout_ms)
    }

    /// Returns the default event length in milliseconds.
    pub fn default_event_duration_ms(&self) -> i64 {
        self.default_event_duration_minutes.saturating_mul(60_000)
    }
}
