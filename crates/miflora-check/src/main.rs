//! MiFlora Check Plugin
//!
//! Reads a Xiaomi MiFlora plant sensor over BLE, classifies the values
//! against configured thresholds, and submits the aggregate result to an
//! Icinga API as a passive check result.

mod evaluate;
mod perfdata;
mod status;
mod thresholds;

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use miflora_icinga::{IcingaClient, ReportPayload};
use miflora_sensor::{MiFloraSensor, SensorReading};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use evaluate::Evaluation;
use thresholds::{Bounds, MetricSpec, ThresholdSet};

#[derive(Parser)]
#[command(name = "check_miflora")]
#[command(about = "Read a MiFlora plant sensor over BLE, evaluate the values, \
    and submit the result to an Icinga API")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Icinga API username
    username: String,

    /// Icinga API password
    password: String,

    /// Icinga process-check-result URL
    url: String,

    /// Path to the CA certificate used for TLS verification
    cert: PathBuf,

    /// Expected sensor MAC address (omit to accept any)
    #[arg(long)]
    address: Option<String>,

    /// Expected firmware version (omit to accept any)
    #[arg(long)]
    firmware: Option<String>,

    /// OK temperature range in °C
    #[arg(long, value_name = "LO:HI", default_value_t = thresholds::DEFAULT_TEMPERATURE_OK)]
    temperature_ok: Bounds,

    /// Warning temperature range in °C
    #[arg(long, value_name = "LO:HI", default_value_t = thresholds::DEFAULT_TEMPERATURE_WARN)]
    temperature_warn: Bounds,

    /// OK light range in lux
    #[arg(long, value_name = "LO:HI", default_value_t = thresholds::DEFAULT_LIGHT_OK)]
    light_ok: Bounds,

    /// Warning light range in lux
    #[arg(long, value_name = "LO:HI", default_value_t = thresholds::DEFAULT_LIGHT_WARN)]
    light_warn: Bounds,

    /// OK moisture range in percent
    #[arg(long, value_name = "LO:HI", default_value_t = thresholds::DEFAULT_MOISTURE_OK)]
    moisture_ok: Bounds,

    /// Warning moisture range in percent
    #[arg(long, value_name = "LO:HI", default_value_t = thresholds::DEFAULT_MOISTURE_WARN)]
    moisture_warn: Bounds,

    /// OK conductivity range in µS/cm
    #[arg(long, value_name = "LO:HI", default_value_t = thresholds::DEFAULT_CONDUCTIVITY_OK)]
    conductivity_ok: Bounds,

    /// Warning conductivity range in µS/cm
    #[arg(long, value_name = "LO:HI", default_value_t = thresholds::DEFAULT_CONDUCTIVITY_WARN)]
    conductivity_warn: Bounds,

    /// OK battery range in percent
    #[arg(long, value_name = "LO:HI", default_value_t = thresholds::DEFAULT_BATTERY_OK)]
    battery_ok: Bounds,

    /// Warning battery range in percent
    #[arg(long, value_name = "LO:HI", default_value_t = thresholds::DEFAULT_BATTERY_WARN)]
    battery_warn: Bounds,
}

impl Cli {
    /// Resolves the threshold configuration from the parsed arguments.
    fn thresholds(&self) -> ThresholdSet {
        ThresholdSet {
            address: MetricSpec::Text {
                expected: self.address.clone(),
            },
            firmware: MetricSpec::Text {
                expected: self.firmware.clone(),
            },
            temperature: MetricSpec::Numeric {
                ok: self.temperature_ok,
                warn: self.temperature_warn,
            },
            light: MetricSpec::Numeric {
                ok: self.light_ok,
                warn: self.light_warn,
            },
            moisture: MetricSpec::Numeric {
                ok: self.moisture_ok,
                warn: self.moisture_warn,
            },
            conductivity: MetricSpec::Numeric {
                ok: self.conductivity_ok,
                warn: self.conductivity_warn,
            },
            battery: MetricSpec::Numeric {
                ok: self.battery_ok,
                warn: self.battery_warn,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; default to warn so the plugin stays quiet.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let thresholds = cli.thresholds();

    // Build the client before the slow BLE scan so a bad certificate or URL
    // fails fast.
    let client = IcingaClient::new(&cli.url, &cli.username, &cli.password, &cli.cert)
        .context("Failed to initialize Icinga client")?;

    let reading = acquire_reading().await;
    let report = build_report(reading.as_ref(), &thresholds);
    if let Ok(json) = serde_json::to_string_pretty(&report) {
        debug!("Payload: {}", json);
    }

    client
        .submit(&report)
        .await
        .context("Failed to submit check result")?;
    Ok(())
}

/// Acquires one sensor reading. Acquisition failures never abort the run;
/// the report degrades to UNKNOWN instead.
async fn acquire_reading() -> Option<SensorReading> {
    let sensor = match MiFloraSensor::new().await {
        Ok(sensor) => sensor,
        Err(e) => {
            warn!("Bluetooth unavailable: {}", e);
            return None;
        }
    };

    debug!("Trying to get sensor values");
    acquire_with_retry(|| read_once(&sensor)).await
}

/// Runs the acquisition policy over one attempt function: a single
/// re-attempt when the first attempt yields nothing, then give up.
async fn acquire_with_retry<F, Fut>(mut attempt: F) -> Option<SensorReading>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<SensorReading>>,
{
    if let Some(reading) = attempt().await {
        return Some(reading);
    }
    debug!("Reading the sensor didn't work, trying again");
    attempt().await
}

async fn read_once(sensor: &MiFloraSensor) -> Option<SensorReading> {
    match sensor.read().await {
        Ok(reading) => reading,
        Err(e) => {
            warn!("Sensor read failed: {}", e);
            None
        }
    }
}

/// Evaluates a reading and assembles the submission payload.
fn build_report(reading: Option<&SensorReading>, thresholds: &ThresholdSet) -> ReportPayload {
    let Evaluation { overall, .. } = evaluate::evaluate(reading, thresholds);
    ReportPayload {
        exit_status: overall.code(),
        plugin_output: format!("Plant is {}", overall),
        performance_data: perfdata::performance_data(reading, thresholds),
    }
}
