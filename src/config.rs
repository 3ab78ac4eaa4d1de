//! Startup configuration.
//!
//! Read from an optional TOML file and then overridden by command-line flags
//! or environment variables:
//!
//! ```toml
//! store_path = "/var/lib/bank/accounts.dat"
//! temp_path = "/var/lib/bank/accounts.dat.tmp"
//!
//! [admin]
//! username = "operator"
//! password = "change-me"
//! ```

use crate::admin::AdminCredentials;
use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;
use crate::store::RecordStore;
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

fn default_store_path() -> PathBuf {
    PathBuf::from("accounts.dat")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Primary account store file.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Temp file used during replaces. Defaults to `<store_path>.tmp`.
    #[serde(default)]
    pub temp_path: Option<PathBuf>,

    /// Admin credentials. Admin access is disabled when absent.
    #[serde(default)]
    pub admin: Option<AdminCredentials>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            store_path: default_store_path(),
            temp_path: None,
            admin: None,
        }
    }
}

impl LedgerConfig {
    /// Reads and parses a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::parse(&text).map_err(|e| LedgerError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        info!("Config loaded from {}", path.display());
        Ok(config)
    }

    /// Parses TOML config text. Missing keys take their defaults.
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Replaces the admin credentials when both parts are given.
    pub fn override_admin(&mut self, username: Option<String>, password: Option<String>) {
        match (username, password) {
            (Some(username), Some(password)) => {
                self.admin = Some(AdminCredentials::new(username, password));
            }
            (None, None) => {}
            _ => warn!("Ignoring admin override: username and password must be given together"),
        }
    }

    /// Opens the configured store, honoring an explicit temp path.
    pub fn record_store(&self) -> RecordStore {
        match &self.temp_path {
            Some(temp) => RecordStore::with_temp_path(&self.store_path, temp),
            None => RecordStore::open(&self.store_path),
        }
    }

    /// Builds a ledger with the default SHA-256 PIN hasher.
    pub fn into_ledger(self) -> Ledger {
        let ledger = Ledger::new(self.record_store());
        match self.admin {
            Some(credentials) => ledger.with_admin(credentials),
            None => ledger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LedgerConfig::parse("").unwrap();
        assert_eq!(config.store_path, PathBuf::from("accounts.dat"));
        assert!(config.temp_path.is_none());
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = LedgerConfig::parse(
            r#"
store_path = "/srv/bank/accounts.dat"
temp_path = "/srv/bank/swap.dat"

[admin]
username = "operator"
password = "pw"
"#,
        )
        .unwrap();

        assert_eq!(config.store_path, PathBuf::from("/srv/bank/accounts.dat"));
        let store = config.record_store();
        assert_eq!(store.temp_path(), Path::new("/srv/bank/swap.dat"));
        assert_eq!(config.admin, Some(AdminCredentials::new("operator", "pw")));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(LedgerConfig::parse("store = \"x\"").is_err());
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "store_path = [").unwrap();

        match LedgerConfig::load(file.path()) {
            Err(LedgerError::Config { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = LedgerConfig::load(Path::new("/nonexistent/bank.toml"));
        assert!(matches!(result, Err(LedgerError::Io(_))));
    }

    #[test]
    fn test_admin_override_needs_both_parts() {
        let mut config = LedgerConfig::default();
        config.override_admin(Some("ops".into()), None);
        assert!(config.admin.is_none());

        config.override_admin(Some("ops".into()), Some("pw".into()));
        assert_eq!(config.admin, Some(AdminCredentials::new("ops", "pw")));
    }
}
