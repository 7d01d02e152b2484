//! Scanner facade
//!
//! Owns one device and serialises every operation on it. The module can only
//! run one command sequence at a time, so each entry point holds the device
//! lock from its first command to its final removal poll.

use std::sync::Arc;

use fpsensor_types::{SensorInfo, Slot, Template};
use tokio::sync::Mutex;
use tracing::info;

use crate::config::ScannerConfig;
use crate::device::FingerSensorDevice;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::enroll::enroll;
use crate::error::{Result, Stage};
use crate::identity::{capture_and_hash, HashedTemplate};
use crate::session::{Operation, Session};
use crate::transfer::{download, upload, Downloaded};
use crate::verify::{verify, Verification};

/// High-level fingerprint scanner
///
/// # Examples
///
/// ```no_run
/// use fpsensor::{Scanner, Sensor};
///
/// #[tokio::main]
/// async fn main() -> fpsensor::Result<()> {
///     let mut sensor = Sensor::tcp("192.168.1.50", 2000);
///     sensor.connect().await?;
///
///     let scanner = Scanner::new(sensor);
///     let enrolled = scanner.enroll().await?;
///
///     let verification = scanner.verify(&enrolled.template).await?;
///     println!("Match score: {}", verification.score);
///     Ok(())
/// }
/// ```
pub struct Scanner<D> {
    device: Mutex<D>,
    config: ScannerConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl<D: FingerSensorDevice> Scanner<D> {
    /// Create a scanner with the default configuration
    pub fn new(device: D) -> Self {
        Self {
            device: Mutex::new(device),
            config: ScannerConfig::default(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Create a scanner with a validated configuration
    pub fn with_config(device: D, config: ScannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(device)
        })
    }

    /// Set diagnostic sink
    ///
    /// The device receives the same sink, so wire events such as checksum
    /// mismatches land next to the operation events.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.device.get_mut().attach_sink(sink.clone());
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Read the module parameters and library occupancy
    pub async fn probe(&self) -> Result<SensorInfo> {
        let mut device = self.device.lock().await;
        let mut session = Session::new(Operation::Probe, self.sink.as_ref());
        session.advance(Stage::Probe);

        let result = read_info(&mut *device).await;

        if let Ok(info) = &result {
            info!("Probed {}", info);
        }
        session.finish(&result);
        result
    }

    /// Enroll a finger and return its template
    pub async fn enroll(&self) -> Result<Downloaded> {
        let mut device = self.device.lock().await;
        enroll(&mut *device, &self.config.capture, self.sink.as_ref()).await
    }

    /// Verify the finger on the sensor against a stored template
    pub async fn verify(&self, candidate: &Template) -> Result<Verification> {
        let mut device = self.device.lock().await;
        verify(&mut *device, candidate, &self.config, self.sink.as_ref()).await
    }

    /// Scan once and return the template with its digest
    pub async fn read_and_hash(&self) -> Result<HashedTemplate> {
        let mut device = self.device.lock().await;
        capture_and_hash(&mut *device, &self.config.capture, self.sink.as_ref()).await
    }

    /// Download whatever template a slot currently holds
    pub async fn download_template(&self, slot: Slot) -> Result<Downloaded> {
        let mut device = self.device.lock().await;
        let session = Session::new(Operation::Download, self.sink.as_ref());

        let result = download(&mut *device, slot, self.sink.as_ref()).await;
        session.finish(&result);
        result
    }

    /// Write a template into a slot, returning the number of frames sent
    pub async fn upload_template(&self, template: &Template, slot: Slot) -> Result<usize> {
        let mut device = self.device.lock().await;
        let session = Session::new(Operation::Upload, self.sink.as_ref());

        let result = upload(
            &mut *device,
            template,
            slot,
            &self.config.transfer,
            self.sink.as_ref(),
        )
        .await;
        session.finish(&result);
        result
    }

    /// Release the device
    pub fn into_inner(self) -> D {
        self.device.into_inner()
    }
}

async fn read_info<D>(device: &mut D) -> Result<SensorInfo>
where
    D: FingerSensorDevice + ?Sized,
{
    let parameters = device
        .read_parameters()
        .await
        .map_err(|e| e.at(Stage::Probe))?;
    let count = device
        .template_count()
        .await
        .map_err(|e| e.at(Stage::Probe))?;

    Ok(SensorInfo::new(parameters, count))
}
