use std::time::Duration;

use reedchess_scanner::{ConfigError, ScanConfig};

/// Tuning for the polling service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Pause between two scans.
    pub poll_interval: Duration,
    /// Consecutive failed scans after which polling gives up.
    pub fault_threshold: u32,
    /// Notifications queued for the consumer before new ones are dropped.
    pub notification_capacity: usize,
    /// Matrix scan timing.
    pub scan: ScanConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            fault_threshold: 5,
            notification_capacity: 64,
            scan: ScanConfig::default(),
        }
    }
}

impl Settings {
    /// Checks the settings for values the service cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error if the fault threshold or notification capacity is
    /// zero, or if the scan configuration is invalid.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.fault_threshold == 0 {
            return Err(SettingsError::ZeroFaultThreshold);
        }
        if self.notification_capacity == 0 {
            return Err(SettingsError::ZeroCapacity);
        }
        self.scan.validate()?;
        Ok(())
    }
}

/// Rejected service settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SettingsError {
    /// Polling would stop before the first scan.
    #[display("fault threshold must be at least 1")]
    ZeroFaultThreshold,
    /// A zero-capacity queue could never hold a notification.
    #[display("notification capacity must be at least 1")]
    ZeroCapacity,
    /// The scan configuration is invalid.
    #[display("invalid scan configuration: {_0}")]
    Scan(#[from] ConfigError),
}
