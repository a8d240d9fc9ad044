//! Store connection settings.
//!
//! The connection surface is the classic four-field form {host, user,
//! password, database}, persisted as a TOML file the CLI can edit at
//! runtime. The daemon's writer re-reads the file before each append, so
//! edits apply on the next write with no restart.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Connection parameters for the count-event store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "facetally".to_string(),
            password: "facetally".to_string(),
            database: "face_counter".to_string(),
        }
    }
}

impl StoreConfig {
    /// Reject any empty (or whitespace-only) field.
    pub fn validate(&self) -> Result<(), StoreError> {
        let fields: [(&'static str, &str); 4] = [
            ("host", &self.host),
            ("user", &self.user),
            ("password", &self.password),
            ("database", &self.database),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(StoreError::InvalidConfig { field });
            }
        }
        Ok(())
    }

    /// Load and validate settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let config: StoreConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and persist settings to a TOML file, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Database file for the embedded backend, keyed by the `database`
    /// field under the daemon's data directory.
    pub fn db_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{}.sqlite3", self.database))
    }
}

/// Default data directory: `$XDG_DATA_HOME/facetally`, falling back to
/// `~/.local/share/facetally`.
pub fn default_data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("facetally")
}

/// Default settings-file path under the data directory.
pub fn default_settings_path() -> PathBuf {
    default_data_dir().join("settings.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        StoreConfig::default().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_each_empty_field() {
        for field in ["host", "user", "password", "database"] {
            let mut config = StoreConfig::default();
            match field {
                "host" => config.host = String::new(),
                "user" => config.user = "  ".to_string(),
                "password" => config.password = String::new(),
                _ => config.database = String::new(),
            }
            let err = config.validate().unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidConfig { field: f } if f == field),
                "expected InvalidConfig for {field}, got {err}"
            );
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let config = StoreConfig {
            host: "db.example".to_string(),
            user: "operator".to_string(),
            password: "secret".to_string(),
            database: "lobby_counts".to_string(),
        };
        config.save(&path).unwrap();

        let loaded = StoreConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut config = StoreConfig::default();
        config.database = String::new();
        assert!(config.save(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StoreConfig::load(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_db_path_uses_database_name() {
        let config = StoreConfig::default();
        let path = config.db_path(Path::new("/var/lib/facetally"));
        assert_eq!(path, Path::new("/var/lib/facetally/face_counter.sqlite3"));
    }
}
