// This is free and unencumbered software released into the public domain.

use crate::shared::{DroneError, DroneResult, TimestampMode};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct CapturerConfig {
    /// How often the adapter re-reads the product and camera state.
    pub poll_interval: Duration,
    /// How often `start_capture` retries while no camera is available.
    pub bootstrap_interval: Duration,
    pub hardware_decode: bool,
    pub fast_upload: bool,
    /// Follow the Lightbridge 2 bandwidth allocation and swap feeds on demand.
    pub lightbridge2: bool,
    pub timestamp_mode: TimestampMode,
    pub event_capacity: usize,
}

impl Default for CapturerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            bootstrap_interval: Duration::from_millis(200),
            hardware_decode: true,
            fast_upload: true,
            lightbridge2: false,
            timestamp_mode: TimestampMode::Monotonic,
            event_capacity: 16,
        }
    }
}

impl CapturerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_bootstrap_interval(mut self, interval: Duration) -> Self {
        self.bootstrap_interval = interval;
        self
    }

    pub fn with_hardware_decode(mut self, enabled: bool) -> Self {
        self.hardware_decode = enabled;
        self
    }

    pub fn with_fast_upload(mut self, enabled: bool) -> Self {
        self.fast_upload = enabled;
        self
    }

    pub fn with_lightbridge2(mut self, enabled: bool) -> Self {
        self.lightbridge2 = enabled;
        self
    }

    pub fn with_timestamp_mode(mut self, mode: TimestampMode) -> Self {
        self.timestamp_mode = mode;
        self
    }

    pub fn with_event_capacity(mut self, n: usize) -> Self {
        self.event_capacity = n;
        self
    }

    pub fn validate(&self) -> DroneResult<()> {
        if self.poll_interval.is_zero() {
            return Err(DroneError::invalid_config("poll interval must be non-zero"));
        }
        if self.bootstrap_interval.is_zero() {
            return Err(DroneError::invalid_config(
                "bootstrap interval must be non-zero",
            ));
        }
        if self.event_capacity == 0 {
            return Err(DroneError::invalid_config("event capacity must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_vendor_timings() {
        let config = CapturerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.bootstrap_interval, Duration::from_millis(200));
        assert!(config.hardware_decode && config.fast_upload);
        assert!(!config.lightbridge2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let config = CapturerConfig::new().with_poll_interval(Duration::ZERO);
        assert!(matches!(config.validate(), Err(DroneError::InvalidConfig(_))));

        let config = CapturerConfig::new().with_bootstrap_interval(Duration::ZERO);
        assert!(matches!(config.validate(), Err(DroneError::InvalidConfig(_))));

        let config = CapturerConfig::new().with_event_capacity(0);
        assert!(matches!(config.validate(), Err(DroneError::InvalidConfig(_))));
    }
}
