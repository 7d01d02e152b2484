//! Enroll a finger on a module behind a serial-to-TCP bridge, then verify it

use fpsensor::{Scanner, Sensor};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let host = std::env::var("BRIDGE_HOST").unwrap_or_else(|_| "192.168.1.50".to_string());
    let port = std::env::var("BRIDGE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(2000);

    let mut sensor = Sensor::tcp(host, port);
    sensor.connect().await?;

    let scanner = Scanner::new(sensor);
    println!("{}", scanner.probe().await?);

    println!("Place a finger on the sensor, lift it, then place it again...");
    let enrolled = scanner.enroll().await?;
    if enrolled.is_degraded() {
        println!("Warning: only {} template bytes arrived", enrolled.received);
    }
    println!("Enrolled: {}", fpsensor::compute_digest(&enrolled.template));

    println!("Place the same finger again to verify...");
    match scanner.verify(&enrolled.template).await {
        Ok(v) => println!("Match, score {} (retried: {})", v.score, v.retried),
        Err(fpsensor::Error::NoMatch { code }) => println!("No match ({})", code),
        Err(e) => return Err(e.into()),
    }

    let mut sensor = scanner.into_inner();
    sensor.disconnect().await?;

    Ok(())
}
