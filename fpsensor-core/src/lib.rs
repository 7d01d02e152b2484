//! # fpsensor-core
//!
//! Core protocol implementation for R30x/AS608 optical fingerprint modules.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding/decoding
//! - Checksum calculation
//! - Instruction and confirmation codes
//! - Protocol constants

pub mod ack;
pub mod checksum;
pub mod code;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;

pub use ack::Ack;
pub use code::ConfirmationCode;
pub use command::Instruction;
pub use error::{Error, Result};
pub use frame::{ChecksumPolicy, Frame, FrameField, PacketType};

/// Default UART baud rate of the module
pub const DEFAULT_BAUD_RATE: u32 = 57_600;

/// Largest packet the module sends (256-byte data payload)
pub const MAX_PACKET_SIZE: usize = Frame::OVERHEAD + 256;
