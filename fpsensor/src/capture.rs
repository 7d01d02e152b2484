//! Capture state machine
//!
//! Bounded polling loops around the module's image primitives. Each loop
//! sleeps between polls, so a caller on a paused test clock runs them
//! instantly.

use fpsensor_core::ConfirmationCode;
use fpsensor_types::Slot;
use tokio::time::sleep;
use tracing::{debug, trace, warn};

use crate::config::CapturePolicy;
use crate::device::FingerSensorDevice;
use crate::diagnostics::{DiagnosticSink, Event};
use crate::error::{Error, Result, Stage};

/// Poll until an image is captured
///
/// # Errors
///
/// Returns [`Error::Timeout`] tagged with `stage` once `polls` attempts have
/// seen no finger.
pub async fn wait_for_finger<D>(
    device: &mut D,
    polls: u32,
    policy: &CapturePolicy,
    stage: Stage,
    sink: &dyn DiagnosticSink,
) -> Result<()>
where
    D: FingerSensorDevice + ?Sized,
{
    for poll in 1..=polls {
        let code = device.acquire_image().await.map_err(|e| e.at(stage))?;
        if code.is_ok() {
            sink.record(&Event::FingerDetected { stage, polls: poll });
            return Ok(());
        }

        trace!("No image for {} ({}), poll {}/{}", stage, code, poll, polls);
        sleep(policy.poll_interval).await;
    }

    debug!("Gave up waiting for finger after {} polls", polls);
    Err(Error::Timeout(stage))
}

/// Wait for a finger and convert the image into `slot`
///
/// Any non-success conversion code, including the two quality failures, is
/// a hard failure on this path.
pub async fn capture_into<D>(
    device: &mut D,
    slot: Slot,
    policy: &CapturePolicy,
    stage: Stage,
    sink: &dyn DiagnosticSink,
) -> Result<()>
where
    D: FingerSensorDevice + ?Sized,
{
    wait_for_finger(device, policy.finger_polls, policy, stage, sink).await?;

    let code = device.convert_image(slot).await.map_err(|e| e.at(stage))?;
    if !code.is_ok() {
        debug!("Conversion into {} failed: {}", slot, code);
        return Err(Error::Device { stage, code });
    }

    Ok(())
}

/// Capture into slot one, retrying on poor image quality
///
/// Returns the number of attempts used.
///
/// # Errors
///
/// - [`Error::Device`] for a conversion code other than success or the two
///   quality failures
/// - [`Error::Timeout`] with stage `QualityCapture` once the attempt bound is
///   exhausted
pub async fn capture_quality<D>(
    device: &mut D,
    policy: &CapturePolicy,
    sink: &dyn DiagnosticSink,
) -> Result<u32>
where
    D: FingerSensorDevice + ?Sized,
{
    let stage = Stage::QualityCapture;

    for attempt in 1..=policy.quality_attempts {
        let code = device.acquire_image().await.map_err(|e| e.at(stage))?;
        if !code.is_ok() {
            sleep(policy.poll_interval).await;
            continue;
        }

        let converted = device
            .convert_image(Slot::One)
            .await
            .map_err(|e| e.at(stage))?;

        if converted.is_ok() {
            sink.record(&Event::FingerDetected {
                stage,
                polls: attempt,
            });
            return Ok(attempt);
        }

        if !converted.is_quality_failure() {
            return Err(Error::Device {
                stage,
                code: converted,
            });
        }

        sink.record(&Event::QualityRejected {
            code: converted,
            attempt,
        });
        sleep(policy.quality_retry_delay).await;
    }

    Err(Error::Timeout(stage))
}

/// Poll until the finger is lifted
///
/// Never fails the surrounding operation: if the finger is still present
/// after `removal_polls`, or the module stops answering, a diagnostic is
/// recorded and `false` is returned. A silent module ends the wait on the
/// first unanswered poll, so the wait costs at most one ack timeout.
pub async fn wait_for_removal<D>(
    device: &mut D,
    policy: &CapturePolicy,
    sink: &dyn DiagnosticSink,
) -> bool
where
    D: FingerSensorDevice + ?Sized,
{
    for poll in 1..=policy.removal_polls {
        match device.acquire_image().await {
            Ok(ConfirmationCode::NoFinger) => {
                sink.record(&Event::FingerRemoved { polls: poll });
                return true;
            }
            Ok(_) => {}
            Err(e) if e.is_timeout() => {
                debug!("No answer while waiting for removal, poll {}", poll);
                sink.record(&Event::RemovalUnanswered { polls: poll });
                return false;
            }
            Err(e) => {
                warn!("Stopped waiting for finger removal: {}", e);
                return false;
            }
        }

        sleep(policy.removal_interval).await;
    }

    sink.record(&Event::FingerLingering {
        polls: policy.removal_polls,
    });
    false
}
