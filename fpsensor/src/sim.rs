//! Scripted module for tests and demos
//!
//! Capture primitives answer from per-primitive queues, so a scenario can be
//! written as "no finger, no finger, finger" without encoding ack frames.
//! Everything else (acks for upload, download and match, template data
//! frames, stalls) is queued on a [`MockTransport`] and decoded by the real
//! [`FrameCodec`], so transfers exercise the same framing as hardware.

use std::collections::VecDeque;

use async_trait::async_trait;
use fpsensor_core::{Ack, ConfirmationCode, Frame, Instruction, PacketType};
use fpsensor_transport::{FrameCodec, MockTransport};
use fpsensor_types::Slot;

use crate::device::FingerSensorDevice;
use crate::error::Result;

/// Simulated fingerprint module
#[derive(Debug)]
pub struct SimulatedSensor {
    wire: MockTransport,
    codec: FrameCodec,
    images: VecDeque<ConfirmationCode>,
    conversions: VecDeque<ConfirmationCode>,
    models: VecDeque<ConfirmationCode>,
    sent: Vec<Frame>,
    image_polls: usize,
    converted: Vec<Slot>,
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSensor {
    /// Create a module with no finger on it
    pub fn new() -> Self {
        Self {
            wire: MockTransport::new(),
            codec: FrameCodec::default(),
            images: VecDeque::new(),
            conversions: VecDeque::new(),
            models: VecDeque::new(),
            sent: Vec::new(),
            image_polls: 0,
            converted: Vec::new(),
        }
    }

    /// Queue `acquire_image` results; `NoFinger` once exhausted
    pub fn script_images(&mut self, codes: impl IntoIterator<Item = ConfirmationCode>) -> &mut Self {
        self.images.extend(codes);
        self
    }

    /// Queue `acquire_image` results: `misses` empty polls, then a finger
    pub fn finger_after(&mut self, misses: usize) -> &mut Self {
        self.script_images(
            std::iter::repeat(ConfirmationCode::NoFinger)
                .take(misses)
                .chain(std::iter::once(ConfirmationCode::Ok)),
        )
    }

    /// Queue `convert_image` results; `Ok` once exhausted
    pub fn script_conversions(
        &mut self,
        codes: impl IntoIterator<Item = ConfirmationCode>,
    ) -> &mut Self {
        self.conversions.extend(codes);
        self
    }

    /// Queue `create_model` results; `Ok` once exhausted
    pub fn script_models(&mut self, codes: impl IntoIterator<Item = ConfirmationCode>) -> &mut Self {
        self.models.extend(codes);
        self
    }

    /// Queue an ack frame
    pub fn push_ack(&mut self, code: ConfirmationCode, data: &[u8]) -> &mut Self {
        let frame = Ack::with_data(code, data.to_vec()).to_frame(self.codec.address());
        self.wire.push_frame(&frame);
        self
    }

    /// Queue any frame
    pub fn push_frame(&mut self, frame: &Frame) -> &mut Self {
        self.wire.push_frame(frame);
        self
    }

    /// Queue template bytes as data frames of `chunk` bytes, the last one EndData
    pub fn push_template(&mut self, bytes: &[u8], chunk: usize) -> &mut Self {
        let count = bytes.chunks(chunk).len();
        for (index, part) in bytes.chunks(chunk).enumerate() {
            let packet_type = if index + 1 == count {
                PacketType::EndData
            } else {
                PacketType::Data
            };
            self.wire.push_frame(&Frame::new(packet_type, part.to_vec()));
        }
        self
    }

    /// Queue template bytes as data frames only, with no EndData
    pub fn push_data(&mut self, bytes: &[u8], chunk: usize) -> &mut Self {
        for part in bytes.chunks(chunk) {
            self.wire.push_frame(&Frame::new(PacketType::Data, part.to_vec()));
        }
        self
    }

    /// Make the next frame read time out
    pub fn push_stall(&mut self) -> &mut Self {
        self.wire.push_stall();
        self
    }

    /// Frames sent to the module, in order
    pub fn sent(&self) -> &[Frame] {
        &self.sent
    }

    /// Instructions sent to the module over the wire, in order
    ///
    /// Capture primitives answered from the scripts are not included.
    pub fn commands(&self) -> Vec<Instruction> {
        self.sent
            .iter()
            .filter(|f| f.packet_type == PacketType::Command)
            .filter_map(|f| f.payload.first())
            .filter_map(|&b| Instruction::try_from(b).ok())
            .collect()
    }

    /// Number of `Match` commands sent
    pub fn match_commands(&self) -> usize {
        self.commands()
            .into_iter()
            .filter(|&i| i == Instruction::Match)
            .count()
    }

    /// Number of `acquire_image` calls
    pub fn image_polls(&self) -> usize {
        self.image_polls
    }

    /// Slots passed to `convert_image`, in order
    pub fn converted(&self) -> &[Slot] {
        &self.converted
    }

    pub fn wire(&self) -> &MockTransport {
        &self.wire
    }

    pub fn wire_mut(&mut self) -> &mut MockTransport {
        &mut self.wire
    }
}

#[async_trait]
impl FingerSensorDevice for SimulatedSensor {
    async fn send_packet(&mut self, packet_type: PacketType, payload: &[u8]) -> Result<()> {
        let frame = self
            .codec
            .write_frame(&mut self.wire, packet_type, payload)
            .await?;
        self.sent.push(frame);
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Frame> {
        Ok(self.codec.read_frame(&mut self.wire).await?.frame)
    }

    async fn acquire_image(&mut self) -> Result<ConfirmationCode> {
        self.image_polls += 1;
        Ok(self.images.pop_front().unwrap_or(ConfirmationCode::NoFinger))
    }

    async fn convert_image(&mut self, slot: Slot) -> Result<ConfirmationCode> {
        self.converted.push(slot);
        Ok(self.conversions.pop_front().unwrap_or(ConfirmationCode::Ok))
    }

    async fn create_model(&mut self) -> Result<ConfirmationCode> {
        Ok(self.models.pop_front().unwrap_or(ConfirmationCode::Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn test_scripted_images() {
        let mut sim = SimulatedSensor::new();
        sim.finger_after(2);

        assert_eq!(sim.acquire_image().await.unwrap(), ConfirmationCode::NoFinger);
        assert_eq!(sim.acquire_image().await.unwrap(), ConfirmationCode::NoFinger);
        assert_eq!(sim.acquire_image().await.unwrap(), ConfirmationCode::Ok);
        assert_eq!(sim.acquire_image().await.unwrap(), ConfirmationCode::NoFinger);
        assert_eq!(sim.image_polls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_go_through_codec() {
        let mut sim = SimulatedSensor::new();
        sim.push_ack(ConfirmationCode::Ok, &[0x00, 0x2A]);

        let ack = sim.execute(Instruction::Match, &[]).await.unwrap();

        assert_eq!(ack.u16_at(0).unwrap(), 42);
        assert_eq!(sim.commands(), vec![Instruction::Match]);
        assert_eq!(sim.match_commands(), 1);
        assert_eq!(sim.wire().written().len(), Frame::OVERHEAD + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_template_frames() {
        let mut sim = SimulatedSensor::new();
        sim.push_template(&[0x11; 300], 128);

        let types: Vec<PacketType> = [
            sim.read_frame().await.unwrap(),
            sim.read_frame().await.unwrap(),
            sim.read_frame().await.unwrap(),
        ]
        .iter()
        .map(|f| f.packet_type)
        .collect();

        assert_eq!(types, vec![PacketType::Data, PacketType::Data, PacketType::EndData]);
    }
}
