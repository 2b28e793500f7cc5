//! Configuration file management.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use wastewatch_reports::ServicePolicy;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "WASTEWATCH_DATA_DIR";

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Authorization policy.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
    /// Upper bound on the serialized size of one stored record.
    #[serde(default = "default_max_record_bytes")]
    pub max_record_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Require the registered identity to resolve reports.
    #[serde(default = "default_true")]
    pub resolve_requires_authorization: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "debug" | "info" | "warn" | "error". `RUST_LOG` wins if set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_max_record_bytes() -> usize {
    wastewatch_types::DEFAULT_MAX_RECORD_BYTES
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            max_record_bytes: default_max_record_bytes(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            resolve_requires_authorization: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl From<&PolicyConfig> for ServicePolicy {
    fn from(config: &PolicyConfig) -> Self {
        ServicePolicy {
            resolve_requires_authorization: config.resolve_requires_authorization,
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join("wastewatch.db")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.data_dir().join("wastewatch.sock")
    }

    fn config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".wastewatch"))
            .unwrap_or_else(|_| PathBuf::from("/tmp/wastewatch"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(
            config.storage.max_record_bytes,
            wastewatch_types::DEFAULT_MAX_RECORD_BYTES
        );
        assert!(config.policy.resolve_requires_authorization);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config() {
        let config = DaemonConfig::parse(
            r#"
            [storage]
            data_dir = "/var/lib/wastewatch"

            [policy]
            resolve_requires_authorization = false
            "#,
        )
        .expect("parse");
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/wastewatch"));
        assert_eq!(
            config.db_path(),
            PathBuf::from("/var/lib/wastewatch/wastewatch.db")
        );
        assert_eq!(
            config.storage.max_record_bytes,
            wastewatch_types::DEFAULT_MAX_RECORD_BYTES
        );
        assert!(!ServicePolicy::from(&config.policy).resolve_requires_authorization);
    }

    #[test]
    fn test_config_serialization() {
        let config = DaemonConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let _parsed: DaemonConfig = toml::from_str(&toml_str).expect("parse");
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(DaemonConfig::parse("[storage]\nmax_record_bytes = \"big\"").is_err());
    }
}
