//! Service configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Runtime configuration, loadable from a JSON file. Fields missing from
/// the file take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Directory holding the fitted artifact files, one per mode.
    pub artifact_dir: PathBuf,
    /// Staging area for uploaded batches.
    pub uploads_dir: PathBuf,
    /// Storage area for scored result sets.
    pub results_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".to_string(),
            artifact_dir: PathBuf::from("model_files"),
            uploads_dir: PathBuf::from("uploaded_files"),
            results_dir: PathBuf::from("outputs"),
        }
    }
}

impl ServiceConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().map_err(|e| {
            Error::Config(format!(
                "invalid listen address {:?}: {}",
                self.listen_addr, e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:8000");
        assert_eq!(config.artifact_dir, PathBuf::from("model_files"));
        assert_eq!(config.uploads_dir, PathBuf::from("uploaded_files"));
        assert_eq!(config.results_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"listen_addr": "0.0.0.0:9100"}}"#).unwrap();

        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:9100");
        assert_eq!(config.results_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_invalid_file_reports_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen_addr = nope").unwrap();

        assert!(matches!(
            ServiceConfig::from_file(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_socket_addr_parsing() {
        let mut config = ServiceConfig::default();
        assert!(config.socket_addr().is_ok());

        config.listen_addr = "not-an-address".to_string();
        assert!(matches!(config.socket_addr(), Err(Error::Config(_))));
    }
}
