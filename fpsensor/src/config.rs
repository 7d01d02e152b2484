//! Scanner configuration

use std::time::Duration;

use fpsensor_core::constants::{polling, timing, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};

use crate::error::{Error, Result};

/// Polling bounds and delays for the capture loops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePolicy {
    /// Delay between image polls while waiting for a finger
    pub poll_interval: Duration,

    /// Polls before giving up on a finger
    pub finger_polls: u32,

    /// Polls for the single verification retry
    pub retry_finger_polls: u32,

    pub removal_interval: Duration,

    /// Polls before removal is abandoned with a diagnostic
    pub removal_polls: u32,

    /// Attempts in the quality-seeking loop
    pub quality_attempts: u32,
    pub quality_retry_delay: Duration,
    pub match_retry_delay: Duration,

    /// Pause between the two enrollment scans
    pub enroll_removal_delay: Duration,

    /// Pause between conversion and download
    pub pre_download_delay: Duration,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            poll_interval: polling::POLL_INTERVAL,
            finger_polls: polling::FINGER_POLLS,
            retry_finger_polls: polling::RETRY_FINGER_POLLS,
            removal_interval: polling::REMOVAL_INTERVAL,
            removal_polls: polling::REMOVAL_POLLS,
            quality_attempts: polling::QUALITY_ATTEMPTS,
            quality_retry_delay: polling::QUALITY_RETRY_DELAY,
            match_retry_delay: polling::MATCH_RETRY_DELAY,
            enroll_removal_delay: polling::ENROLL_REMOVAL_DELAY,
            pre_download_delay: polling::PRE_DOWNLOAD_DELAY,
        }
    }
}

impl CapturePolicy {
    pub fn with_finger_polls(mut self, polls: u32) -> Self {
        self.finger_polls = polls;
        self
    }

    pub fn with_removal_polls(mut self, polls: u32) -> Self {
        self.removal_polls = polls;
        self
    }

    pub fn with_quality_attempts(mut self, attempts: u32) -> Self {
        self.quality_attempts = attempts;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("finger_polls", self.finger_polls),
            ("retry_finger_polls", self.retry_finger_polls),
            ("removal_polls", self.removal_polls),
            ("quality_attempts", self.quality_attempts),
        ];

        match bounds.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(Error::InvalidConfig(format!("{} must be at least 1", name))),
            None => Ok(()),
        }
    }
}

/// Template upload settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    /// Payload bytes per data frame
    pub chunk_size: usize,

    /// Delay after every data frame
    pub inter_packet_delay: Duration,

    /// Delay between the upload command and reading its ack
    pub command_settle: Duration,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            inter_packet_delay: timing::INTER_PACKET_DELAY,
            command_settle: timing::COMMAND_SETTLE,
        }
    }
}

impl TransferConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_inter_packet_delay(mut self, delay: Duration) -> Self {
        self.inter_packet_delay = delay;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(Error::InvalidConfig(format!(
                "chunk_size must be 1..={}, got {}",
                MAX_CHUNK_SIZE, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Everything a [`Scanner`](crate::Scanner) needs besides the device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannerConfig {
    pub capture: CapturePolicy,
    pub transfer: TransferConfig,
}

impl ScannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capture(mut self, capture: CapturePolicy) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_transfer(mut self, transfer: TransferConfig) -> Self {
        self.transfer = transfer;
        self
    }

    /// Check every bound and size
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a zero polling bound or a chunk
    /// size outside `1..=254`.
    pub fn validate(&self) -> Result<()> {
        self.capture.validate()?;
        self.transfer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ScannerConfig::default();

        assert_eq!(config.capture.finger_polls, 200);
        assert_eq!(config.capture.poll_interval, Duration::from_millis(50));
        assert_eq!(config.transfer.chunk_size, 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chunk_size_bounds() {
        for size in [0, 255, 512] {
            let config = ScannerConfig::new().with_transfer(TransferConfig::default().with_chunk_size(size));
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))), "size {}", size);
        }
        for size in [1, 64, 254] {
            assert!(TransferConfig::default().with_chunk_size(size).validate().is_ok());
        }
    }

    #[test]
    fn test_zero_poll_bound_rejected() {
        let config = ScannerConfig::new().with_capture(CapturePolicy::default().with_removal_polls(0));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("removal_polls"));
    }
}
