//! MiFlora Sensor Library
//!
//! Provides a thin BLE abstraction for reading one snapshot of environment
//! metrics from a Xiaomi MiFlora (FlowerCare) plant sensor.

pub mod ble;
pub mod error;
pub mod reading;

pub use ble::MiFloraSensor;
pub use error::{Error, Result};
pub use reading::{Metric, MetricValue, SensorReading};
