//! Protocol constants

use std::time::Duration;

/// Frame start code, high byte first
pub const HEADER: [u8; 2] = [0xEF, 0x01];

/// Default module address (accepted by every factory-fresh module)
pub const BROADCAST_ADDRESS: u32 = 0xFFFF_FFFF;

/// Default handshake password
pub const DEFAULT_PASSWORD: u32 = 0;

/// Default template chunk size for uploads
pub const DEFAULT_CHUNK_SIZE: usize = 128;

/// Largest chunk that still fits a 256-byte module packet with its checksum
pub const MAX_CHUNK_SIZE: usize = 254;

/// Wire timing defaults
pub mod timing {
    use super::Duration;

    /// Wait for the first header byte after a command (covers device processing)
    pub const FIRST_BYTE_TIMEOUT: Duration = Duration::from_millis(2000);

    /// Wait for every other byte of a frame
    pub const BYTE_TIMEOUT: Duration = Duration::from_millis(100);

    /// Pause after a command packet before reading its ack
    pub const COMMAND_SETTLE: Duration = Duration::from_millis(100);

    /// Pause between upload data packets
    pub const INTER_PACKET_DELAY: Duration = Duration::from_millis(20);
}

/// Finger polling defaults
pub mod polling {
    use super::Duration;

    /// Delay between image acquisition attempts
    pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Acquisition attempts before giving up on a finger (about 10 s)
    pub const FINGER_POLLS: u32 = 200;

    /// Acquisition attempts for the single verification retry
    pub const RETRY_FINGER_POLLS: u32 = 100;

    /// Delay between "is the finger gone yet" polls
    pub const REMOVAL_INTERVAL: Duration = Duration::from_millis(100);

    /// Removal polls before reporting a lingering finger
    pub const REMOVAL_POLLS: u32 = 300;

    /// Attempts of the quality-seeking capture loop
    pub const QUALITY_ATTEMPTS: u32 = 200;

    /// Back-off after a noisy or featureless image
    pub const QUALITY_RETRY_DELAY: Duration = Duration::from_millis(500);

    /// Back-off before the verification retry
    pub const MATCH_RETRY_DELAY: Duration = Duration::from_millis(500);

    /// Time given to lift the finger between enrollment scans
    pub const ENROLL_REMOVAL_DELAY: Duration = Duration::from_millis(2000);

    /// Settle time between conversion and template download
    pub const PRE_DOWNLOAD_DELAY: Duration = Duration::from_millis(200);
}
