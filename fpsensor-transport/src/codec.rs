//! Streaming frame codec
//!
//! Reads a frame one byte at a time from a [`Transport`], applying a long
//! timeout to the first header byte (the module may still be processing the
//! previous command) and a short one to every byte after it.

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use fpsensor_core::{
    constants::{timing, BROADCAST_ADDRESS, HEADER},
    ChecksumPolicy, Frame, FrameField, PacketType,
};
use tracing::{trace, warn};

use crate::{error::*, Transport};

/// Per-byte read timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTimeouts {
    /// Timeout for the first header byte
    pub first_byte: Duration,

    /// Timeout for every following byte
    pub byte: Duration,
}

impl Default for ReadTimeouts {
    fn default() -> Self {
        Self {
            first_byte: timing::FIRST_BYTE_TIMEOUT,
            byte: timing::BYTE_TIMEOUT,
        }
    }
}

/// A frame as it came off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    /// Decoded frame
    pub frame: Frame,

    /// Trailer bytes as received, `None` if they never arrived
    pub checksum: Option<u16>,
}

impl Received {
    /// Check the received trailer against the frame contents
    pub fn checksum_valid(&self) -> bool {
        self.checksum == Some(self.frame.checksum())
    }
}

/// Frame encoder/decoder bound to one module address
#[derive(Debug, Clone)]
pub struct FrameCodec {
    address: u32,
    timeouts: ReadTimeouts,
    policy: ChecksumPolicy,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(BROADCAST_ADDRESS)
    }
}

impl FrameCodec {
    /// Create a codec for a module address with default timeouts
    pub fn new(address: u32) -> Self {
        Self {
            address,
            timeouts: ReadTimeouts::default(),
            policy: ChecksumPolicy::default(),
        }
    }

    /// Set read timeouts
    pub fn with_timeouts(mut self, timeouts: ReadTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set checksum policy
    pub fn with_checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Module address written into outgoing frames
    pub fn address(&self) -> u32 {
        self.address
    }

    /// Read timeouts
    pub fn timeouts(&self) -> ReadTimeouts {
        self.timeouts
    }

    /// Checksum policy
    pub fn checksum_policy(&self) -> ChecksumPolicy {
        self.policy
    }

    /// Build and send a frame
    pub async fn write_frame<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        packet_type: PacketType,
        payload: &[u8],
    ) -> Result<Frame> {
        let frame = Frame::with_address(
            self.address,
            packet_type,
            Bytes::copy_from_slice(payload),
        );
        frame.validate()?;

        trace!("Sending: {:?}", frame);
        transport.send(&frame.encode()).await?;

        Ok(frame)
    }

    /// Read one frame
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] tagged with the field that stalled
    /// - [`Error::Protocol`] for a bad header, unknown packet type, invalid
    ///   length, or (strict policy only) checksum mismatch
    pub async fn read_frame<T: Transport + ?Sized>(&self, transport: &mut T) -> Result<Received> {
        let b1 = self.read(transport, self.timeouts.first_byte, FrameField::Header).await?;
        let b2 = self.read(transport, self.timeouts.byte, FrameField::Header).await?;

        if [b1, b2] != HEADER {
            warn!("Invalid frame header: {:02X} {:02X}", b1, b2);
            return Err(fpsensor_core::Error::BadHeader { found: [b1, b2] }.into());
        }

        let mut address = [0u8; 4];
        for byte in &mut address {
            *byte = self.read(transport, self.timeouts.byte, FrameField::Address).await?;
        }

        let raw_type = self.read(transport, self.timeouts.byte, FrameField::PacketType).await?;

        let len_hi = self.read(transport, self.timeouts.byte, FrameField::Length).await?;
        let len_lo = self.read(transport, self.timeouts.byte, FrameField::Length).await?;
        let length = u16::from_be_bytes([len_hi, len_lo]);

        let packet_type = PacketType::try_from(raw_type)?;
        if length < 2 {
            return Err(fpsensor_core::Error::InvalidLength(length).into());
        }

        let payload_len = length as usize - 2;
        let mut payload = BytesMut::with_capacity(payload_len);
        for _ in 0..payload_len {
            let byte = self.read(transport, self.timeouts.byte, FrameField::Payload).await?;
            payload.put_u8(byte);
        }

        let checksum = self.read_checksum(transport).await?;

        let frame = Frame {
            address: u32::from_be_bytes(address),
            packet_type,
            payload: payload.freeze(),
        };

        if self.policy == ChecksumPolicy::Strict {
            let expected = frame.checksum();
            match checksum {
                Some(received) if received != expected => {
                    return Err(fpsensor_core::Error::ChecksumMismatch { expected, received }.into());
                }
                None => return Err(Error::Timeout { field: FrameField::Checksum }),
                _ => {}
            }
        }

        trace!("Received: {:?}", frame);

        Ok(Received { frame, checksum })
    }

    async fn read_checksum<T: Transport + ?Sized>(&self, transport: &mut T) -> Result<Option<u16>> {
        let hi = transport.read_byte(self.timeouts.byte).await;
        let lo = transport.read_byte(self.timeouts.byte).await;

        match (hi, lo) {
            (Ok(hi), Ok(lo)) => Ok(Some(u16::from_be_bytes([hi, lo]))),
            (Err(Error::ReadTimeout), _) | (_, Err(Error::ReadTimeout)) => Ok(None),
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }

    async fn read<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        wait: Duration,
        field: FrameField,
    ) -> Result<u8> {
        transport.read_byte(wait).await.map_err(|e| match e {
            Error::ReadTimeout => Error::Timeout { field },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockTransport;
    use fpsensor_core::{Ack, ConfirmationCode, Instruction};
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn test_read_frame() {
        let mut mock = MockTransport::new();
        let sent = Frame::new(PacketType::Data, vec![0x11; 128]);
        mock.push_frame(&sent);

        let received = FrameCodec::default().read_frame(&mut mock).await.unwrap();

        assert_eq!(received.frame, sent);
        assert!(received.checksum_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_frame_keeps_address() {
        let mut mock = MockTransport::new();
        mock.push_frame(&Frame::with_address(0xDEAD_BEEF, PacketType::Ack, vec![0x00]));

        let received = FrameCodec::default().read_frame(&mut mock).await.unwrap();
        assert_eq!(received.frame.address, 0xDEAD_BEEF);
    }

    #[tokio::test(start_paused = true)]
    async fn test_header_timeout() {
        let mut mock = MockTransport::new();

        let result = FrameCodec::default().read_frame(&mut mock).await;
        assert_eq!(result.unwrap_err().frame_timeout(), Some(FrameField::Header));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_header_byte_timeout() {
        let mut mock = MockTransport::new();
        mock.push_bytes(&[0xEF]);

        let result = FrameCodec::default().read_frame(&mut mock).await;
        assert_eq!(result.unwrap_err().frame_timeout(), Some(FrameField::Header));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_header() {
        let mut mock = MockTransport::new();
        mock.push_bytes(&[0xEF, 0x02]);

        let result = FrameCodec::default().read_frame(&mut mock).await;
        assert!(matches!(
            result,
            Err(Error::Protocol(fpsensor_core::Error::BadHeader { found: [0xEF, 0x02] }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_after_header_are_tagged() {
        let cases = [
            (4, FrameField::Address),
            (6, FrameField::PacketType),
            (8, FrameField::Length),
            (12, FrameField::Payload),
        ];

        for (cut, field) in cases {
            let bytes = Frame::new(PacketType::Data, vec![0x55; 8]).encode();
            let mut mock = MockTransport::new();
            mock.push_bytes(&bytes[..cut]);

            let result = FrameCodec::default().read_frame(&mut mock).await;
            assert_eq!(result.unwrap_err().frame_timeout(), Some(field), "cut at {}", cut);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_packet_type() {
        let mut bytes = Frame::new(PacketType::Data, vec![0x00]).encode();
        bytes[6] = 0x09;
        let mut mock = MockTransport::new();
        mock.push_bytes(&bytes);

        let result = FrameCodec::default().read_frame(&mut mock).await;
        assert!(matches!(
            result,
            Err(Error::Protocol(fpsensor_core::Error::UnknownPacketType(0x09)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lenient_accepts_bad_checksum() {
        let mut bytes = Frame::new(PacketType::Ack, vec![0x00]).encode();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let mut mock = MockTransport::new();
        mock.push_bytes(&bytes);

        let received = FrameCodec::default().read_frame(&mut mock).await.unwrap();

        assert!(!received.checksum_valid());
        assert_eq!(Ack::from_frame(&received.frame).unwrap().code, ConfirmationCode::Ok);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lenient_accepts_missing_checksum() {
        let bytes = Frame::new(PacketType::Ack, vec![0x00]).encode();
        let mut mock = MockTransport::new();
        mock.push_bytes(&bytes[..bytes.len() - 2]);

        let received = FrameCodec::default().read_frame(&mut mock).await.unwrap();
        assert_eq!(received.checksum, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_strict_rejects_bad_checksum() {
        let mut bytes = Frame::new(PacketType::Ack, vec![0x00]).encode();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let mut mock = MockTransport::new();
        mock.push_bytes(&bytes);

        let codec = FrameCodec::default().with_checksum_policy(ChecksumPolicy::Strict);
        let result = codec.read_frame(&mut mock).await;

        assert!(matches!(
            result,
            Err(Error::Protocol(fpsensor_core::Error::ChecksumMismatch { .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_strict_rejects_missing_checksum() {
        let bytes = Frame::new(PacketType::Ack, vec![0x00]).encode();
        let mut mock = MockTransport::new();
        mock.push_bytes(&bytes[..bytes.len() - 1]);

        let codec = FrameCodec::default().with_checksum_policy(ChecksumPolicy::Strict);
        let result = codec.read_frame(&mut mock).await;

        assert_eq!(result.unwrap_err().frame_timeout(), Some(FrameField::Checksum));
    }

    #[tokio::test]
    async fn test_write_frame() {
        let mut mock = MockTransport::new();
        let codec = FrameCodec::new(0x0000_0001);

        let frame = codec
            .write_frame(&mut mock, PacketType::Command, &[Instruction::GenImg.into()])
            .await
            .unwrap();

        assert_eq!(frame.address, 1);
        assert_eq!(
            mock.written(),
            &[0xEF, 0x01, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00, 0x03, 0x01, 0x00, 0x05]
        );
    }
}
