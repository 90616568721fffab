//! Session configuration.
//!
//! A [`SessionConfig`] names the database file and the table prefix, and can
//! be kept in a YAML file next to the data.
//!
//! # Example YAML
//!
//! ```yaml
//! path: data/objects.db
//! prefix: mj_
//! ```
//!
//! Omitting `path` opens an in-memory database; omitting `prefix` uses
//! [`DEFAULT_PREFIX`].

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Table prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "mj_";

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

/// Where and how a [`Session`](crate::Session) stores its objects.
///
/// # Examples
///
/// ```
/// use managed_json_sqlite::SessionConfig;
///
/// let config: SessionConfig = serde_yaml::from_str("path: objects.db").unwrap();
/// assert_eq!(config.prefix, "mj_");
/// assert!(!config.is_in_memory());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Database file; `None` means an in-memory database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Prefix prepended to every table name.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: None,
            prefix: default_prefix(),
        }
    }
}

impl SessionConfig {
    /// Configuration for a database file with the default prefix.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Returns `true` when no database file is configured.
    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::SessionError::IoError) if the file cannot
    /// be read, or [`ConfigError`](crate::SessionError::ConfigError) if
    /// parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::SessionError::IoError) if the file cannot
    /// be written, or [`ConfigError`](crate::SessionError::ConfigError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionError;

    #[test]
    fn test_parse_full_yaml() {
        let config: SessionConfig = serde_yaml::from_str("path: /tmp/x.db\nprefix: app_\n").unwrap();
        assert_eq!(config.path, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(config.prefix, "app_");
    }

    #[test]
    fn test_empty_yaml_is_in_memory_default() {
        let config: SessionConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert!(config.is_in_memory());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.yaml");
        let config = SessionConfig::file(dir.path().join("objects.db"));

        config.save(&path).unwrap();
        assert_eq!(SessionConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SessionConfig::load("/nonexistent/session.yaml").unwrap_err();
        assert!(matches!(err, SessionError::IoError(_)));
    }

    #[test]
    fn test_load_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "prefix: [unclosed").unwrap();
        let err = SessionConfig::load(&path).unwrap_err();
        assert!(matches!(err, SessionError::ConfigError(_)));
    }
}
