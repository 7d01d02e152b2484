//! Device capability
//!
//! Everything above the wire talks to the module through
//! [`FingerSensorDevice`]. Implementors provide raw frame I/O; the command
//! primitives default to issuing the matching instruction and returning the
//! confirmation code from the ack.

use std::sync::Arc;

use async_trait::async_trait;
use fpsensor_core::{Ack, ConfirmationCode, Frame, Instruction, PacketType};
use fpsensor_types::{Slot, SystemParameters};

use crate::diagnostics::DiagnosticSink;
use crate::error::{Error, Result, Stage};

/// A fingerprint module the orchestrators can drive
#[async_trait]
pub trait FingerSensorDevice: Send {
    /// Send one frame
    async fn send_packet(&mut self, packet_type: PacketType, payload: &[u8]) -> Result<()>;

    /// Read the next frame of any type
    async fn read_frame(&mut self) -> Result<Frame>;

    /// Send wire-level events to `sink`; devices without any ignore it
    fn attach_sink(&mut self, _sink: Arc<dyn DiagnosticSink>) {}

    /// Send a command frame
    async fn send_command(&mut self, instruction: Instruction, params: &[u8]) -> Result<()> {
        let mut payload = Vec::with_capacity(1 + params.len());
        payload.push(u8::from(instruction));
        payload.extend_from_slice(params);
        self.send_packet(PacketType::Command, &payload).await
    }

    /// Read the next frame and require it to be an ack
    async fn receive_ack(&mut self) -> Result<Ack> {
        let frame = self.read_frame().await?;
        Ok(Ack::from_frame(&frame)?)
    }

    /// Send a command and read its ack
    async fn execute(&mut self, instruction: Instruction, params: &[u8]) -> Result<Ack> {
        self.send_command(instruction, params).await?;
        self.receive_ack().await
    }

    /// Capture an image into the image buffer (`GenImg`)
    async fn acquire_image(&mut self) -> Result<ConfirmationCode> {
        Ok(self.execute(Instruction::GenImg, &[]).await?.code)
    }

    /// Extract features from the image buffer into a slot (`Img2Tz`)
    async fn convert_image(&mut self, slot: Slot) -> Result<ConfirmationCode> {
        Ok(self.execute(Instruction::Img2Tz, &[slot.id()]).await?.code)
    }

    /// Merge both slots into a template (`RegModel`)
    async fn create_model(&mut self) -> Result<ConfirmationCode> {
        Ok(self.execute(Instruction::RegModel, &[]).await?.code)
    }

    /// Password handshake (`VfyPwd`)
    async fn verify_password(&mut self, password: u32) -> Result<ConfirmationCode> {
        Ok(self
            .execute(Instruction::VfyPwd, &password.to_be_bytes())
            .await?
            .code)
    }

    /// Read the system parameter block (`ReadSysPara`)
    async fn read_parameters(&mut self) -> Result<SystemParameters> {
        let ack = self.execute(Instruction::ReadSysPara, &[]).await?;
        if !ack.is_ok() {
            return Err(Error::Device {
                stage: Stage::Probe,
                code: ack.code,
            });
        }
        Ok(SystemParameters::parse(&ack.data)?)
    }

    /// Number of templates stored in the library (`TemplateNum`)
    async fn template_count(&mut self) -> Result<u16> {
        let ack = self.execute(Instruction::TemplateNum, &[]).await?;
        if !ack.is_ok() {
            return Err(Error::Device {
                stage: Stage::Probe,
                code: ack.code,
            });
        }
        Ok(ack.u16_at(0)?)
    }
}
