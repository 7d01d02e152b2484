//! Template identity
//!
//! A template is content-addressed by its SHA-256 digest. Digest comparison
//! walks every byte whatever the inputs, so its running time does not depend
//! on where two digests first differ.

use fpsensor_types::{Digest, Slot, Template};
use sha2::{Digest as _, Sha256};
use tokio::time::sleep;

use crate::capture::{capture_into, wait_for_removal};
use crate::config::CapturePolicy;
use crate::device::FingerSensorDevice;
use crate::diagnostics::DiagnosticSink;
use crate::error::{Result, Stage};
use crate::session::{Operation, Session};
use crate::transfer::download;

/// SHA-256 of the template bytes
///
/// # Examples
///
/// ```
/// use fpsensor::identity::compute_digest;
/// use fpsensor_types::Template;
///
/// let digest = compute_digest(&Template::new([0xAA; 512]));
/// assert_eq!(
///     digest.to_hex(),
///     "799edf40e8115dc980109a64ff0a7ae2c6b62e20313c4a01f9871d0e189aa7c2"
/// );
/// ```
pub fn compute_digest(template: &Template) -> Digest {
    let mut hash = [0u8; Digest::SIZE];
    hash.copy_from_slice(&Sha256::digest(template.as_bytes()));
    Digest::new(hash)
}

/// Compare two digests without an early exit
pub fn digests_equal(a: &Digest, b: &Digest) -> bool {
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// A captured template and its digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedTemplate {
    pub digest: Digest,
    pub template: Template,

    /// Template bytes that actually arrived; the rest are zero
    pub received: usize,
}

impl HashedTemplate {
    /// Check if the digest was taken over a zero-filled template
    pub fn is_degraded(&self) -> bool {
        self.received < Template::SIZE
    }
}

/// Scan once, download the template from slot one and hash it
///
/// No quality retry: a messy image fails the call.
pub async fn capture_and_hash<D>(
    device: &mut D,
    policy: &CapturePolicy,
    sink: &dyn DiagnosticSink,
) -> Result<HashedTemplate>
where
    D: FingerSensorDevice + ?Sized,
{
    let mut session = Session::new(Operation::CaptureAndHash, sink);

    let result = run(device, policy, &mut session).await;
    wait_for_removal(device, policy, sink).await;

    session.finish(&result);
    result
}

async fn run<D>(device: &mut D, policy: &CapturePolicy, session: &mut Session<'_>) -> Result<HashedTemplate>
where
    D: FingerSensorDevice + ?Sized,
{
    let sink = session.sink();

    session.advance(Stage::Capture);
    capture_into(device, Slot::One, policy, Stage::Capture, sink).await?;
    sleep(policy.pre_download_delay).await;

    session.advance(Stage::Download);
    let downloaded = download(device, Slot::One, sink).await?;

    Ok(HashedTemplate {
        digest: compute_digest(&downloaded.template),
        template: downloaded.template,
        received: downloaded.received,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::error::Error;
    use crate::sim::SimulatedSensor;
    use fpsensor_core::ConfirmationCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_digests() {
        let zero = compute_digest(&Template::new([0x00; Template::SIZE]));
        assert_eq!(
            zero.to_hex(),
            "076a27c79e5ace2a3d47f9dd2e83e4ff6ea8872b3c2218f66c92b89b55f36560"
        );
    }

    #[test]
    fn test_digest_reflexive() {
        let template = Template::new([0x5A; Template::SIZE]);
        let a = compute_digest(&template);
        let b = compute_digest(&template.clone());

        assert!(digests_equal(&a, &b));
        assert!(digests_equal(&a, &a));
    }

    #[test]
    fn test_distinct_templates_distinct_digests() {
        let mut bytes = [0x5A; Template::SIZE];
        let a = compute_digest(&Template::new(bytes));
        bytes[Template::SIZE - 1] ^= 0x01;
        let b = compute_digest(&Template::new(bytes));

        assert!(!digests_equal(&a, &b));
    }

    #[test]
    fn test_digests_equal_checks_every_byte() {
        let a = Digest::new([0x11; Digest::SIZE]);
        let mut last = [0x11; Digest::SIZE];
        last[Digest::SIZE - 1] = 0x10;
        let mut first = [0x11; Digest::SIZE];
        first[0] = 0x10;

        assert!(!digests_equal(&a, &Digest::new(last)));
        assert!(!digests_equal(&a, &Digest::new(first)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_and_hash() {
        let mut sim = SimulatedSensor::new();
        sim.finger_after(1)
            .push_ack(ConfirmationCode::Ok, &[])
            .push_template(&[0xAA; Template::SIZE], 128);
        let sink = MemorySink::new();

        let hashed = capture_and_hash(&mut sim, &CapturePolicy::default(), &sink)
            .await
            .unwrap();

        assert!(!hashed.is_degraded());
        assert_eq!(
            hashed.digest.to_hex(),
            "799edf40e8115dc980109a64ff0a7ae2c6b62e20313c4a01f9871d0e189aa7c2"
        );
        assert_eq!(sim.converted(), &[Slot::One]);
        // two polls for the finger, one to see it lifted
        assert_eq!(sim.image_polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_and_hash_rejects_messy_image() {
        let mut sim = SimulatedSensor::new();
        sim.finger_after(0)
            .script_conversions([ConfirmationCode::ImageMess]);

        let err = capture_and_hash(&mut sim, &CapturePolicy::default(), &MemorySink::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Device {
                stage: Stage::Capture,
                code: ConfirmationCode::ImageMess
            }
        ));
        assert!(sim.commands().is_empty());
    }
}
