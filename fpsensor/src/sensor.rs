//! Real module over a transport

use std::sync::Arc;

use async_trait::async_trait;
use fpsensor_core::{constants::DEFAULT_PASSWORD, ChecksumPolicy, Frame, PacketType};
use fpsensor_transport::{FrameCodec, ReadTimeouts, TcpTransport, Transport};
use tracing::{debug, info, warn};

use crate::device::FingerSensorDevice;
use crate::diagnostics::{DiagnosticSink, Event, TracingSink};
use crate::error::{Error, Result, Stage};

/// Fingerprint module
///
/// Drives an R30x/AS608 module over any [`Transport`].
///
/// # Examples
///
/// ```no_run
/// use fpsensor::Sensor;
///
/// #[tokio::main]
/// async fn main() -> fpsensor::Result<()> {
///     let mut sensor = Sensor::tcp("192.168.1.50", 2000);
///
///     sensor.connect().await?;
///     println!("Connected!");
///
///     sensor.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Sensor<T> {
    transport: T,
    codec: FrameCodec,
    password: u32,
    sink: Arc<dyn DiagnosticSink>,
}

impl Sensor<TcpTransport> {
    /// Create a sensor behind a serial-to-TCP bridge
    pub fn tcp(addr: impl Into<String>, port: u16) -> Self {
        Self::new(TcpTransport::new(addr, port))
    }
}

impl<T: Transport> Sensor<T> {
    /// Create a sensor at the broadcast address with default timeouts
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            codec: FrameCodec::default(),
            password: DEFAULT_PASSWORD,
            sink: Arc::new(TracingSink),
        }
    }

    /// Set module address
    pub fn with_address(mut self, address: u32) -> Self {
        self.codec = FrameCodec::new(address)
            .with_timeouts(self.codec.timeouts())
            .with_checksum_policy(self.codec.checksum_policy());
        self
    }

    /// Set per-byte read timeouts
    pub fn with_read_timeouts(mut self, timeouts: ReadTimeouts) -> Self {
        self.codec = self.codec.with_timeouts(timeouts);
        self
    }

    /// Set checksum policy (default: lenient)
    pub fn with_checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.codec = self.codec.with_checksum_policy(policy);
        self
    }

    /// Set handshake password (default: 0)
    pub fn with_password(mut self, password: u32) -> Self {
        self.password = password;
        self
    }

    /// Set diagnostic sink
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn codec(&self) -> &FrameCodec {
        &self.codec
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Open the transport and verify the password
    ///
    /// # Errors
    ///
    /// - [`Error::Device`] with stage `Handshake` if the module rejects the
    ///   password
    /// - [`Error::Timeout`] with stage `Handshake` if the module stays silent
    pub async fn connect(&mut self) -> Result<()> {
        info!("Connecting to {}...", self.transport.remote_addr());

        if !self.transport.is_connected() {
            self.transport.connect().await?;
        }

        let code = self
            .verify_password(self.password)
            .await
            .map_err(|e| e.at(Stage::Handshake))?;

        if !code.is_ok() {
            warn!("Password rejected: {}", code);
            return Err(Error::Device {
                stage: Stage::Handshake,
                code,
            });
        }

        info!("Connected to module at {:08X}", self.codec.address());
        Ok(())
    }

    /// Close the transport
    pub async fn disconnect(&mut self) -> Result<()> {
        if !self.transport.is_connected() {
            return Ok(());
        }

        info!("Disconnecting from {}...", self.transport.remote_addr());
        self.transport.disconnect().await?;

        Ok(())
    }
}

#[async_trait]
impl<T: Transport> FingerSensorDevice for Sensor<T> {
    async fn send_packet(&mut self, packet_type: PacketType, payload: &[u8]) -> Result<()> {
        let frame = self
            .codec
            .write_frame(&mut self.transport, packet_type, payload)
            .await?;

        self.sink.record(&Event::FrameSent {
            packet_type,
            len: frame.payload.len(),
        });
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Frame> {
        let received = self.codec.read_frame(&mut self.transport).await?;

        if !received.checksum_valid() {
            debug!("Accepting frame with bad checksum: {:?}", received.frame);
            self.sink.record(&Event::ChecksumMismatch {
                expected: received.frame.checksum(),
                received: received.checksum,
            });
        }

        self.sink.record(&Event::FrameReceived {
            packet_type: received.frame.packet_type,
            len: received.frame.payload.len(),
        });

        Ok(received.frame)
    }

    fn attach_sink(&mut self, sink: Arc<dyn DiagnosticSink>) {
        self.sink = sink;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use fpsensor_core::{Ack, ConfirmationCode, Instruction};
    use fpsensor_transport::MockTransport;
    use pretty_assertions::assert_eq;

    fn ack(code: ConfirmationCode, data: &[u8]) -> Frame {
        Ack::with_data(code, data.to_vec()).to_frame(0xFFFF_FFFF)
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_sends_password() {
        let mut mock = MockTransport::new();
        mock.push_frame(&ack(ConfirmationCode::Ok, &[]));

        let mut sensor = Sensor::new(mock).with_password(0x0102_0304);
        sensor.connect().await.unwrap();

        let written = sensor.transport().written().to_vec();
        let sent = Frame::decode(written.as_slice().into(), ChecksumPolicy::Strict).unwrap();
        assert_eq!(
            &sent.payload[..],
            &[u8::from(Instruction::VfyPwd), 0x01, 0x02, 0x03, 0x04]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_wrong_password() {
        let mut mock = MockTransport::new();
        mock.push_frame(&ack(ConfirmationCode::PasswordFail, &[]));

        let mut sensor = Sensor::new(mock);
        let err = sensor.connect().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Device {
                stage: Stage::Handshake,
                code: ConfirmationCode::PasswordFail
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_silent_module() {
        let mut sensor = Sensor::new(MockTransport::new());

        let err = sensor.connect().await.unwrap_err();
        assert!(matches!(err, Error::Timeout(Stage::Handshake)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_image() {
        let mut mock = MockTransport::new();
        mock.push_frame(&ack(ConfirmationCode::NoFinger, &[]));

        let mut sensor = Sensor::new(mock).with_address(0x0000_0001);
        let code = sensor.acquire_image().await.unwrap();

        assert_eq!(code, ConfirmationCode::NoFinger);
        assert_eq!(
            sensor.transport().written(),
            &[0xEF, 0x01, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00, 0x03, 0x01, 0x00, 0x05]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_checksum_is_recorded() {
        let mut bytes = ack(ConfirmationCode::Ok, &[]).encode();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let mut mock = MockTransport::new();
        mock.push_bytes(&bytes);

        let sink = Arc::new(MemorySink::new());
        let mut sensor = Sensor::new(mock).with_sink(sink.clone());

        let ack = sensor.receive_ack().await.unwrap();
        assert!(ack.is_ok());
        assert_eq!(sink.count(|e| matches!(e, Event::ChecksumMismatch { .. })), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_strict_policy_rejects_bad_checksum() {
        let mut bytes = ack(ConfirmationCode::Ok, &[]).encode();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let mut mock = MockTransport::new();
        mock.push_bytes(&bytes);

        let mut sensor = Sensor::new(mock).with_checksum_policy(ChecksumPolicy::Strict);
        let err = sensor.receive_ack().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Framing(fpsensor_core::Error::ChecksumMismatch { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_commands() {
        let params = [
            0x00, 0x00, 0x00, 0x00, 0x00, 0xA3, 0x00, 0x03, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x02,
            0x00, 0x06,
        ];
        let mut mock = MockTransport::new();
        mock.push_frame(&ack(ConfirmationCode::Ok, &params))
            .push_frame(&ack(ConfirmationCode::Ok, &[0x00, 0x07]));

        let mut sensor = Sensor::new(mock);

        let parameters = sensor.read_parameters().await.unwrap();
        assert_eq!(parameters.capacity, 163);
        assert_eq!(sensor.template_count().await.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_receive_ack_rejects_data_frame() {
        let mut mock = MockTransport::new();
        mock.push_frame(&Frame::new(PacketType::Data, vec![0x00; 4]));

        let mut sensor = Sensor::new(mock);
        let err = sensor.receive_ack().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Framing(fpsensor_core::Error::UnexpectedPacket { .. })
        ));
    }
}
