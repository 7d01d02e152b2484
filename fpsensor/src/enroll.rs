//! Enrollment
//!
//! Two scans of the same finger are merged on the module into one template,
//! which is then downloaded.

use fpsensor_core::ConfirmationCode;
use fpsensor_types::Slot;
use tokio::time::sleep;

use crate::capture::{capture_into, wait_for_removal};
use crate::config::CapturePolicy;
use crate::device::FingerSensorDevice;
use crate::diagnostics::{DiagnosticSink, Event};
use crate::error::{Error, Result, Stage};
use crate::session::{Operation, Session};
use crate::transfer::{download, Downloaded};

/// Enroll a finger and return its template
///
/// # Errors
///
/// - [`Error::Timeout`] with stage `FirstScan` or `SecondScan` if no finger
///   is placed
/// - [`Error::Timeout`] with stage `Removal` if the finger is not lifted
///   between the two scans
/// - [`Error::EnrollMismatch`] if the module judges the scans to be of
///   different fingers
/// - [`Error::Device`] for any other non-success code
pub async fn enroll<D>(
    device: &mut D,
    policy: &CapturePolicy,
    sink: &dyn DiagnosticSink,
) -> Result<Downloaded>
where
    D: FingerSensorDevice + ?Sized,
{
    let mut session = Session::new(Operation::Enroll, sink);

    let result = run(device, policy, &mut session).await;
    wait_for_removal(device, policy, sink).await;

    session.finish(&result);
    result
}

async fn run<D>(device: &mut D, policy: &CapturePolicy, session: &mut Session<'_>) -> Result<Downloaded>
where
    D: FingerSensorDevice + ?Sized,
{
    let sink = session.sink();

    session.advance(Stage::FirstScan);
    capture_into(device, Slot::One, policy, Stage::FirstScan, sink).await?;

    sleep(policy.enroll_removal_delay).await;
    session.advance(Stage::Removal);
    if !wait_for_removal(device, policy, sink).await {
        // a finger left on the sensor would be read again as the second scan
        return Err(Error::Timeout(Stage::Removal));
    }

    session.advance(Stage::SecondScan);
    capture_into(device, Slot::Two, policy, Stage::SecondScan, sink).await?;

    session.advance(Stage::CreateModel);
    let code = device
        .create_model()
        .await
        .map_err(|e| e.at(Stage::CreateModel))?;

    match code {
        ConfirmationCode::Ok => sink.record(&Event::ModelCreated),
        ConfirmationCode::EnrollMismatch => return Err(Error::EnrollMismatch),
        code => {
            return Err(Error::Device {
                stage: Stage::CreateModel,
                code,
            })
        }
    }

    session.advance(Stage::Download);
    download(device, Slot::One, sink).await
}
