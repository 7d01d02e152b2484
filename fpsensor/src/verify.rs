//! Verification
//!
//! Compares a live scan against a caller-held template by uploading the
//! template into slot two and asking the module to match the slots. A
//! mismatch on the first comparison earns exactly one more scan.

use fpsensor_core::{Ack, ConfirmationCode, Instruction};
use fpsensor_types::{MatchScore, Slot, Template};
use tokio::time::sleep;

use crate::capture::{capture_quality, wait_for_finger, wait_for_removal};
use crate::config::ScannerConfig;
use crate::device::FingerSensorDevice;
use crate::diagnostics::{DiagnosticSink, Event};
use crate::error::{Error, Result, Stage};
use crate::session::{Operation, Session};
use crate::transfer::upload;

/// Successful match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub score: MatchScore,

    /// The match succeeded on the retry scan
    pub retried: bool,
}

/// Verify the finger on the sensor against `candidate`
///
/// # Errors
///
/// - [`Error::NoMatch`] if the module rejects the match, after the retry
///   when the first result was a mismatch
/// - [`Error::Timeout`] with stage `QualityCapture` if no usable image is
///   captured
/// - any upload error
pub async fn verify<D>(
    device: &mut D,
    candidate: &Template,
    config: &ScannerConfig,
    sink: &dyn DiagnosticSink,
) -> Result<Verification>
where
    D: FingerSensorDevice + ?Sized,
{
    let mut session = Session::new(Operation::Verify, sink);

    let result = run(device, candidate, config, &mut session).await;
    match &result {
        Ok(v) => sink.record(&Event::MatchFound {
            score: v.score,
            retried: v.retried,
        }),
        Err(Error::NoMatch { code }) => sink.record(&Event::MatchRejected { code: *code }),
        Err(_) => {}
    }

    wait_for_removal(device, &config.capture, sink).await;

    session.finish(&result);
    result
}

async fn run<D>(
    device: &mut D,
    candidate: &Template,
    config: &ScannerConfig,
    session: &mut Session<'_>,
) -> Result<Verification>
where
    D: FingerSensorDevice + ?Sized,
{
    let sink = session.sink();
    let policy = &config.capture;

    session.advance(Stage::QualityCapture);
    capture_quality(device, policy, sink).await?;

    session.advance(Stage::Upload);
    upload(device, candidate, Slot::Two, &config.transfer, sink).await?;

    session.advance(Stage::Match);
    session.attempt();
    let ack = match_slots(device).await?;

    match ack.code {
        ConfirmationCode::Ok => return matched(&ack, false),
        ConfirmationCode::EnrollMismatch => sink.record(&Event::MatchRetry { code: ack.code }),
        code => return Err(Error::NoMatch { code }),
    }

    sleep(policy.match_retry_delay).await;

    session.advance(Stage::RetryCapture);
    match wait_for_finger(device, policy.retry_finger_polls, policy, Stage::RetryCapture, sink).await {
        Ok(()) => {}
        Err(Error::Timeout(_)) => {
            return Err(Error::NoMatch {
                code: ConfirmationCode::NoFinger,
            })
        }
        Err(e) => return Err(e),
    }

    let code = device
        .convert_image(Slot::One)
        .await
        .map_err(|e| e.at(Stage::RetryCapture))?;
    if !code.is_ok() {
        return Err(Error::NoMatch { code });
    }

    session.advance(Stage::Match);
    session.attempt();
    let ack = match_slots(device).await?;

    match ack.code {
        ConfirmationCode::Ok => matched(&ack, true),
        code => Err(Error::NoMatch { code }),
    }
}

async fn match_slots<D>(device: &mut D) -> Result<Ack>
where
    D: FingerSensorDevice + ?Sized,
{
    device
        .execute(Instruction::Match, &[])
        .await
        .map_err(|e| e.at(Stage::Match))
}

fn matched(ack: &Ack, retried: bool) -> Result<Verification> {
    Ok(Verification {
        score: MatchScore(ack.u16_at(0)?),
        retried,
    })
}
