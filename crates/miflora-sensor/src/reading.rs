//! Sensor reading data model.
//!
//! A [`SensorReading`] is one snapshot of everything the FlowerCare reports:
//! two identity strings (MAC address, firmware version) and five numeric
//! environment metrics. [`Metric`] is the shared vocabulary for naming them;
//! its `ALL` order is the order readings are evaluated and reported in.

use std::fmt;

/// A named sensor metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Address,
    Firmware,
    Temperature,
    Light,
    Moisture,
    Conductivity,
    Battery,
}

impl Metric {
    /// All metrics in evaluation and reporting order.
    pub const ALL: [Metric; 7] = [
        Metric::Address,
        Metric::Firmware,
        Metric::Temperature,
        Metric::Light,
        Metric::Moisture,
        Metric::Conductivity,
        Metric::Battery,
    ];

    /// Returns the metric label used in logs and performance data.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Address => "address",
            Metric::Firmware => "firmware",
            Metric::Temperature => "temperature",
            Metric::Light => "light",
            Metric::Moisture => "moisture",
            Metric::Conductivity => "conductivity",
            Metric::Battery => "battery",
        }
    }

    /// Returns the unit of measurement (empty for the identity strings).
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Address | Metric::Firmware => "",
            Metric::Temperature => "°C",
            Metric::Light => "lux",
            Metric::Moisture | Metric::Battery => "%",
            Metric::Conductivity => "µS/cm",
        }
    }

    /// Returns true for metrics carrying a numeric value.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Metric::Address | Metric::Firmware)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value of a single metric.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Numeric measurement (temperature, light, moisture, conductivity,
    /// battery).
    Number(f64),
    /// Identity string (MAC address, firmware version).
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{}", n),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// One snapshot of sensor values.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Bluetooth MAC address of the device
    pub address: String,
    /// Firmware version string (e.g. "3.1.8")
    pub firmware: String,
    /// Air temperature in °C
    pub temperature: f64,
    /// Sunlight intensity in lux
    pub light: u32,
    /// Soil moisture in percent
    pub moisture: u8,
    /// Soil fertility in µS/cm
    pub conductivity: u16,
    /// Battery level in percent
    pub battery: u8,
}

impl SensorReading {
    /// Returns the value for a single metric.
    pub fn value(&self, metric: Metric) -> MetricValue {
        match metric {
            Metric::Address => MetricValue::Text(self.address.clone()),
            Metric::Firmware => MetricValue::Text(self.firmware.clone()),
            Metric::Temperature => MetricValue::Number(self.temperature),
            Metric::Light => MetricValue::Number(self.light as f64),
            Metric::Moisture => MetricValue::Number(self.moisture as f64),
            Metric::Conductivity => MetricValue::Number(self.conductivity as f64),
            Metric::Battery => MetricValue::Number(self.battery as f64),
        }
    }

    /// Iterates over all metrics and their values in `Metric::ALL` order.
    pub fn metrics(&self) -> impl Iterator<Item = (Metric, MetricValue)> + '_ {
        Metric::ALL.iter().map(|&m| (m, self.value(m)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> SensorReading {
        SensorReading {
            address: "c4:7c:8d:62:74:3b".to_string(),
            firmware: "3.1.8".to_string(),
            temperature: 21.4,
            light: 1200,
            moisture: 30,
            conductivity: 500,
            battery: 90,
        }
    }

    #[test]
    fn test_metric_names() {
        assert_eq!(Metric::Temperature.name(), "temperature");
        assert_eq!(Metric::Conductivity.name(), "conductivity");
        assert_eq!(Metric::Temperature.to_string(), "temperature");
    }

    #[test]
    fn test_metric_units() {
        assert_eq!(Metric::Temperature.unit(), "°C");
        assert_eq!(Metric::Conductivity.unit(), "µS/cm");
        assert_eq!(Metric::Address.unit(), "");
    }

    #[test]
    fn test_numeric_split() {
        assert!(!Metric::Address.is_numeric());
        assert!(!Metric::Firmware.is_numeric());
        assert!(Metric::Light.is_numeric());
        assert!(Metric::Battery.is_numeric());
    }

    #[test]
    fn test_metrics_order() {
        let names: Vec<&str> = reading().metrics().map(|(m, _)| m.name()).collect();
        assert_eq!(
            names,
            [
                "address",
                "firmware",
                "temperature",
                "light",
                "moisture",
                "conductivity",
                "battery"
            ]
        );
    }

    #[test]
    fn test_value_lookup() {
        let r = reading();
        assert_eq!(
            r.value(Metric::Address),
            MetricValue::Text("c4:7c:8d:62:74:3b".to_string())
        );
        assert_eq!(r.value(Metric::Temperature), MetricValue::Number(21.4));
        assert_eq!(r.value(Metric::Light), MetricValue::Number(1200.0));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(MetricValue::Number(22.0).to_string(), "22");
        assert_eq!(MetricValue::Number(25.9).to_string(), "25.9");
        assert_eq!(MetricValue::Text("3.1.8".into()).to_string(), "3.1.8");
    }
}
