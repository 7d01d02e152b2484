//! Type definitions for fpsensor

pub mod digest;
pub mod error;
pub mod score;
pub mod sensor_info;
pub mod slot;
pub mod template;

pub use digest::Digest;
pub use error::{Error, Result};
pub use score::MatchScore;
pub use sensor_info::{SensorInfo, StatusFlags, SystemParameters};
pub use slot::Slot;
pub use template::Template;
