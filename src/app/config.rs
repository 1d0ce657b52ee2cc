// Application configuration types
//
// Constants and small config structs for telemetry refresh cadence and the
// topology view (pan/zoom bounds).

use std::time::{Duration, Instant};

/// Minimum telemetry refresh interval in milliseconds
pub const MIN_REFRESH_MS: u64 = 500;

/// Maximum telemetry refresh interval in milliseconds
pub const MAX_REFRESH_MS: u64 = 10_000;

/// Refresh interval adjustment step in milliseconds
pub const REFRESH_STEP: u64 = 500;

/// Default telemetry refresh interval in milliseconds
pub const DEFAULT_REFRESH_MS: u64 = 2000;

/// Zoom bounds for the topology view
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;

/// Zoom adjustment step
pub const ZOOM_STEP: f64 = 0.25;

/// Pan step in canvas units
pub const PAN_STEP: f64 = 4.0;

/// Configuration for the telemetry refresh cadence
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Refresh interval in milliseconds (bounded by MIN/MAX_REFRESH_MS)
    pub refresh_ms: u64,

    /// Timestamp of last interval change (for visual feedback)
    pub last_change: Option<Instant>,
}

impl RefreshConfig {
    pub fn new() -> Self {
        Self {
            refresh_ms: DEFAULT_REFRESH_MS,
            last_change: None,
        }
    }

    /// Telemetry refresh interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_config_defaults() {
        let config = RefreshConfig::new();
        assert_eq!(config.refresh_ms, DEFAULT_REFRESH_MS);
        assert_eq!(config.interval(), Duration::from_millis(DEFAULT_REFRESH_MS));
        assert!(config.last_change.is_none());
    }
}
