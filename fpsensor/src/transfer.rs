//! Template transfer
//!
//! Download reads a template out of a slot as a run of data frames; upload
//! writes one into a slot the same way. Neither direction acknowledges
//! individual data frames.

use bytes::{BufMut, BytesMut};
use fpsensor_core::{FrameField, Instruction, PacketType};
use fpsensor_types::{Slot, Template};
use tokio::time::sleep;
use tracing::{debug, trace, warn};

use crate::config::TransferConfig;
use crate::device::FingerSensorDevice;
use crate::diagnostics::{DiagnosticSink, Event};
use crate::error::{Error, Result, Stage};

/// A downloaded template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub template: Template,

    /// Template bytes that actually arrived; the rest are zero
    pub received: usize,

    /// Data frames read
    pub frames: usize,
}

impl Downloaded {
    /// Check if the transfer ended early and the template was zero-filled
    pub fn is_degraded(&self) -> bool {
        self.received < Template::SIZE
    }
}

/// Read the template held in `slot`
///
/// A transfer that stops short is zero-filled and returned flagged as
/// degraded, whether it was ended by an EndData frame or by the module going
/// quiet between frames. Going quiet before the first data byte is a hard
/// timeout.
///
/// # Errors
///
/// - [`Error::Device`] if the module refuses the upload command
/// - [`Error::Timeout`] with stage `Download` if no data arrives, or a frame
///   stalls part-way through
/// - [`Error::Framing`] if an ack or command frame arrives mid-transfer
pub async fn download<D>(device: &mut D, slot: Slot, sink: &dyn DiagnosticSink) -> Result<Downloaded>
where
    D: FingerSensorDevice + ?Sized,
{
    let stage = Stage::Download;

    let ack = device
        .execute(Instruction::UpChar, &[slot.id()])
        .await
        .map_err(|e| e.at(stage))?;

    if !ack.is_ok() {
        return Err(Error::Device {
            stage,
            code: ack.code,
        });
    }

    let mut buf = BytesMut::with_capacity(Template::SIZE);
    let mut frames = 0;

    while buf.len() < Template::SIZE {
        let frame = match device.read_frame().await {
            Ok(frame) => frame,
            Err(e) if e.frame_timeout() == Some(FrameField::Header) && !buf.is_empty() => {
                warn!("Module went quiet after {} template bytes", buf.len());
                break;
            }
            Err(e) => return Err(e.at(stage)),
        };

        match frame.packet_type {
            PacketType::Data | PacketType::EndData => {
                frames += 1;
                let room = Template::SIZE - buf.len();
                let take = frame.payload.len().min(room);
                if take < frame.payload.len() {
                    debug!("Discarding {} bytes past template end", frame.payload.len() - take);
                }
                buf.put_slice(&frame.payload[..take]);
                trace!("Template {}/{} bytes", buf.len(), Template::SIZE);

                if frame.packet_type == PacketType::EndData {
                    break;
                }
            }
            found => {
                return Err(fpsensor_core::Error::UnexpectedPacket {
                    expected: PacketType::Data,
                    found,
                }
                .into());
            }
        }
    }

    let received = buf.len();
    if received < Template::SIZE {
        sink.record(&Event::TemplatePadded { received });
        buf.resize(Template::SIZE, 0);
    }

    Ok(Downloaded {
        template: Template::from_slice(&buf)?,
        received,
        frames,
    })
}

/// Write `template` into `slot`
///
/// Returns the number of data frames sent.
///
/// # Errors
///
/// - [`Error::InvalidConfig`] for a chunk size outside `1..=254`
/// - [`Error::Device`] with stage `Upload` if the module refuses the command
pub async fn upload<D>(
    device: &mut D,
    template: &Template,
    slot: Slot,
    config: &TransferConfig,
    sink: &dyn DiagnosticSink,
) -> Result<usize>
where
    D: FingerSensorDevice + ?Sized,
{
    config.validate()?;
    let stage = Stage::Upload;

    device
        .send_command(Instruction::DownChar, &[slot.id()])
        .await
        .map_err(|e| e.at(stage))?;

    sleep(config.command_settle).await;

    let ack = device.receive_ack().await.map_err(|e| e.at(stage))?;
    if !ack.is_ok() {
        return Err(Error::Device {
            stage,
            code: ack.code,
        });
    }

    let chunks = template.as_bytes().chunks(config.chunk_size);
    let count = chunks.len();

    for (index, chunk) in chunks.enumerate() {
        let last = index + 1 == count;
        let packet_type = if last {
            PacketType::EndData
        } else {
            PacketType::Data
        };

        device
            .send_packet(packet_type, chunk)
            .await
            .map_err(|e| e.at(stage))?;

        sink.record(&Event::UploadChunk {
            index,
            len: chunk.len(),
            last,
        });
        sleep(config.inter_packet_delay).await;
    }

    debug!("Uploaded template into {} in {} frames", slot, count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::sim::SimulatedSensor;
    use fpsensor_core::{ConfirmationCode, Frame};
    use pretty_assertions::assert_eq;

    fn pattern() -> Vec<u8> {
        (0..Template::SIZE).map(|i| (i % 251) as u8).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_complete() {
        let mut sim = SimulatedSensor::new();
        sim.push_ack(ConfirmationCode::Ok, &[])
            .push_template(&pattern(), 128);
        let sink = MemorySink::new();

        let downloaded = download(&mut sim, Slot::One, &sink).await.unwrap();

        assert!(!downloaded.is_degraded());
        assert_eq!(downloaded.frames, 4);
        assert_eq!(&downloaded.template.as_bytes()[..], &pattern()[..]);
        assert_eq!(sim.commands(), vec![Instruction::UpChar]);
        assert_eq!(&sim.sent()[0].payload[..], &[0x08, 0x01]);
        assert!(sink.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_refused() {
        let mut sim = SimulatedSensor::new();
        sim.push_ack(ConfirmationCode::UploadFeatureFail, &[]);

        let err = download(&mut sim, Slot::One, &MemorySink::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Device {
                stage: Stage::Download,
                code: ConfirmationCode::UploadFeatureFail
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_discards_overflow() {
        let mut sim = SimulatedSensor::new();
        sim.push_ack(ConfirmationCode::Ok, &[])
            .push_data(&[0x22; 384], 128)
            .push_frame(&Frame::new(PacketType::Data, vec![0x33; 200]));

        let downloaded = download(&mut sim, Slot::One, &MemorySink::new())
            .await
            .unwrap();

        assert_eq!(downloaded.received, Template::SIZE);
        assert_eq!(downloaded.template.as_bytes()[511], 0x33);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_mid_frame_stall_is_hard() {
        let mut sim = SimulatedSensor::new();
        sim.push_ack(ConfirmationCode::Ok, &[])
            .push_data(&[0x22; 128], 128);
        let partial = Frame::new(PacketType::Data, vec![0x44; 128]).encode();
        sim.wire_mut().push_bytes(&partial[..40]);

        let err = download(&mut sim, Slot::One, &MemorySink::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout(Stage::Download)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_frames() {
        let mut sim = SimulatedSensor::new();
        sim.push_ack(ConfirmationCode::Ok, &[]);
        let template = Template::from_slice(&pattern()).unwrap();

        let count = upload(
            &mut sim,
            &template,
            Slot::Two,
            &TransferConfig::default(),
            &MemorySink::new(),
        )
        .await
        .unwrap();

        assert_eq!(count, 4);
        let sent = sim.sent();
        assert_eq!(&sent[0].payload[..], &[0x09, 0x02]);
        assert_eq!(sent.len(), 5);
        assert!(sent[1..4].iter().all(|f| f.packet_type == PacketType::Data));
        assert_eq!(sent[4].packet_type, PacketType::EndData);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_refused() {
        let mut sim = SimulatedSensor::new();
        sim.push_ack(ConfirmationCode::PacketReceiveError, &[]);
        let template = Template::new([0; Template::SIZE]);

        let err = upload(
            &mut sim,
            &template,
            Slot::Two,
            &TransferConfig::default(),
            &MemorySink::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Device { stage: Stage::Upload, .. }));
        assert_eq!(sim.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_silent_module() {
        let mut sim = SimulatedSensor::new();
        let template = Template::new([0; Template::SIZE]);

        let err = upload(
            &mut sim,
            &template,
            Slot::Two,
            &TransferConfig::default(),
            &MemorySink::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Timeout(Stage::Upload)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_rejects_bad_chunk_size() {
        let mut sim = SimulatedSensor::new();
        let template = Template::new([0; Template::SIZE]);
        let config = TransferConfig::default().with_chunk_size(0);

        let err = upload(&mut sim, &template, Slot::Two, &config, &MemorySink::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(sim.sent().is_empty());
    }
}
