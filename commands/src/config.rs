//! Front-end configuration.
//!
//! Loaded from a YAML file; every field is optional and falls back to its
//! default.
//!
//! # Example YAML
//!
//! ```yaml
//! database: patient_monitoring.db
//! listing:
//!   order_by: date
//!   descending: false
//! log_filter: warn
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::command::ListRecords;
use crate::error::Result;

/// Default sort order for record listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Column to sort by.
    pub order_by: String,
    /// Sort newest/highest first.
    pub descending: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            order_by: "date".to_string(),
            descending: false,
        }
    }
}

impl ListingConfig {
    /// Builds the listing command this configuration describes.
    pub fn command(&self) -> ListRecords {
        let list = ListRecords::new(self.order_by.clone());
        if self.descending { list.descending() } else { list }
    }
}

/// Top-level configuration for a vitals front end.
///
/// # Examples
///
/// ```
/// use vitals_commands::MonitorConfig;
///
/// let config: MonitorConfig = serde_yaml::from_str("database: ward.db").unwrap();
/// assert_eq!(config.database.to_str(), Some("ward.db"));
/// assert_eq!(config.listing.order_by, "date");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// SQLite database file.
    pub database: PathBuf,
    /// Default listing order.
    pub listing: ListingConfig,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("patient_monitoring.db"),
            listing: ListingConfig::default(),
            log_filter: "warn".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CommandError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::CommandError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use vitals_core::OrderBy;

    use super::*;

    #[test]
    fn test_deserialize_complete() {
        let yaml = r#"
database: /var/lib/vitals/ward.db
listing:
  order_by: patient_id
  descending: true
log_filter: debug
"#;
        let config: MonitorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.database, PathBuf::from("/var/lib/vitals/ward.db"));
        assert_eq!(config.listing.order_by, "patient_id");
        assert!(config.listing.descending);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: MonitorConfig = serde_yaml::from_str("listing:\n  descending: true\n").unwrap();
        assert_eq!(config.database, PathBuf::from("patient_monitoring.db"));
        assert_eq!(config.listing.order_by, "date");
        assert!(config.listing.descending);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_listing_command() {
        let listing = ListingConfig {
            order_by: "patient_id".into(),
            descending: true,
        };
        assert_eq!(listing.command().order(), &OrderBy::desc("patient_id"));
        assert_eq!(ListingConfig::default().command(), ListRecords::by_date());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vitals.yml");

        let original = MonitorConfig {
            database: PathBuf::from("ward.db"),
            listing: ListingConfig {
                order_by: "patient_id".into(),
                descending: false,
            },
            log_filter: "info".into(),
        };
        original.save(&path).unwrap();

        assert_eq!(MonitorConfig::load(&path).unwrap(), original);
    }

    #[test]
    fn test_load_missing_file() {
        let err = MonitorConfig::load("/nonexistent/vitals.yml").unwrap_err();
        assert!(matches!(err, crate::CommandError::IoError(_)));
    }
}
