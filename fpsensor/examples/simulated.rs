//! Scripted verification against the simulated module
//!
//! Run with `RUST_LOG=debug` to see every protocol event.

use std::sync::Arc;

use fpsensor::{ConfirmationCode, MemorySink, Scanner, SimulatedSensor, Template};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut sim = SimulatedSensor::new();
    sim.finger_after(3)
        .script_conversions([ConfirmationCode::ImageMess])
        .script_images([ConfirmationCode::Ok])
        // upload accepted, first match a mismatch, retry matches
        .push_ack(ConfirmationCode::Ok, &[])
        .push_ack(ConfirmationCode::EnrollMismatch, &[])
        .script_images([ConfirmationCode::Ok])
        .push_ack(ConfirmationCode::Ok, &[0x00, 0xC8]);

    let sink = Arc::new(MemorySink::new());
    let scanner = Scanner::new(sim).with_sink(sink.clone());

    let candidate = Template::new([0x5A; Template::SIZE]);
    let verification = scanner.verify(&candidate).await?;

    println!(
        "Score {} (retried: {})",
        verification.score, verification.retried
    );
    for event in sink.events() {
        println!("  {:?}", event);
    }

    Ok(())
}
