//! Runtime configuration for an export session.
//!
//! Holds everything except the connection parameters themselves: driver
//! options, timing knobs and the locations of scratch and state files.

use crate::error::ExportError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default SQL Server TCP port.
pub const DEFAULT_PORT: u16 = 1433;

/// Configuration shared by the SQL Server adapter and the local services.
///
/// # Security
/// This struct never stores passwords; those travel in
/// [`ConnectionParameters`](crate::security::ConnectionParameters).
///
/// # Example
/// ```rust
/// use exportador_core::config::ExportConfig;
/// use std::time::Duration;
///
/// let config = ExportConfig::default()
///     .with_port(14330)
///     .with_view_settle_delay(Duration::from_millis(0));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Port used when the server name carries neither an instance nor a port
    pub port: u16,
    /// Accept the server certificate without validation
    pub trust_server_certificate: bool,
    /// Upper bound for opening a connection
    pub connect_timeout: Duration,
    /// Pause after view provisioning so the server catalog settles
    pub view_settle_delay: Duration,
    /// Scratch directory for CSV files; the OS temp directory when unset
    pub temp_dir: Option<PathBuf>,
    /// Directory holding `export_result.json` and `settings.json`
    pub storage_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            trust_server_certificate: true,
            connect_timeout: Duration::from_secs(10),
            view_settle_delay: Duration::from_millis(2000),
            temp_dir: None,
            storage_dir: default_storage_dir(),
        }
    }
}

/// `<data dir>/exportador`, or `./exportador` when the platform has none.
pub fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("exportador")
}

impl ExportConfig {
    /// Validates configuration values.
    ///
    /// # Errors
    /// Returns a configuration error for a zero port or zero connect timeout
    pub fn validate(&self) -> crate::Result<()> {
        if self.port == 0 {
            return Err(ExportError::configuration("port must be greater than 0"));
        }

        if self.connect_timeout.is_zero() {
            return Err(ExportError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.storage_dir.as_os_str().is_empty() {
            return Err(ExportError::configuration("storage_dir cannot be empty"));
        }

        Ok(())
    }

    /// Builder method to set the default port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method to toggle certificate trust.
    pub fn with_trust_server_certificate(mut self, trust: bool) -> Self {
        self.trust_server_certificate = trust;
        self
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set the post-provisioning pause.
    pub fn with_view_settle_delay(mut self, delay: Duration) -> Self {
        self.view_settle_delay = delay;
        self
    }

    /// Builder method to override the scratch directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Builder method to set the state directory.
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert_eq!(config.port, 1433);
        assert!(config.trust_server_certificate);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.view_settle_delay, Duration::from_millis(2000));
        assert!(config.temp_dir.is_none());
        assert!(config.storage_dir.ends_with("exportador"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = ExportConfig::default()
            .with_port(1500)
            .with_trust_server_certificate(false)
            .with_connect_timeout(Duration::from_secs(3))
            .with_view_settle_delay(Duration::ZERO)
            .with_temp_dir("/tmp/exp")
            .with_storage_dir("/var/lib/exp");

        assert_eq!(config.port, 1500);
        assert!(!config.trust_server_certificate);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(config.view_settle_delay.is_zero());
        assert_eq!(config.temp_dir, Some(PathBuf::from("/tmp/exp")));
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/exp"));
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let config = ExportConfig::default().with_port(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ExportConfig::default().with_connect_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
