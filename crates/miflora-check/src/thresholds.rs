//! Threshold configuration.
//!
//! A [`ThresholdSet`] is built once at startup from CLI overrides and stays
//! immutable for the run. Each metric resolves to a [`MetricSpec`] up front,
//! so the evaluator never re-inspects value types: numeric metrics carry
//! their OK and WARN bounds, the identity strings carry an optional
//! expected value.

use std::fmt;
use std::str::FromStr;

use miflora_sensor::Metric;

/// Inclusive numeric bounds pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub lower: i64,
    pub upper: i64,
}

impl Bounds {
    pub const fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }

    /// Inclusive containment check. The value is floored first, so 25.9 is
    /// inside an upper bound of 25; callers keep the unfloored value for
    /// reporting.
    pub fn contains(&self, value: f64) -> bool {
        let floored = value.floor() as i64;
        self.lower <= floored && floored <= self.upper
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lower, self.upper)
    }
}

impl FromStr for Bounds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lower, upper) = s
            .split_once(':')
            .ok_or_else(|| format!("expected LO:HI, got '{}'", s))?;
        let lower: i64 = lower
            .trim()
            .parse()
            .map_err(|_| format!("invalid lower bound '{}'", lower))?;
        let upper: i64 = upper
            .trim()
            .parse()
            .map_err(|_| format!("invalid upper bound '{}'", upper))?;
        if lower > upper {
            return Err(format!("lower bound {} exceeds upper bound {}", lower, upper));
        }
        Ok(Bounds::new(lower, upper))
    }
}

/// Per-metric classification rule, resolved at configuration load.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricSpec {
    /// Numeric metric with an OK range nested inside a looser WARN range.
    Numeric { ok: Bounds, warn: Bounds },
    /// Identity string matched exactly; `None` means "don't care".
    Text { expected: Option<String> },
}

// Default bounds, matching the original plugin defaults.
pub const DEFAULT_TEMPERATURE_OK: Bounds = Bounds::new(18, 25);
pub const DEFAULT_TEMPERATURE_WARN: Bounds = Bounds::new(15, 30);
pub const DEFAULT_LIGHT_OK: Bounds = Bounds::new(1000, 50000);
pub const DEFAULT_LIGHT_WARN: Bounds = Bounds::new(500, 70000);
pub const DEFAULT_MOISTURE_OK: Bounds = Bounds::new(13, 50);
pub const DEFAULT_MOISTURE_WARN: Bounds = Bounds::new(8, 60);
pub const DEFAULT_CONDUCTIVITY_OK: Bounds = Bounds::new(350, 1000);
pub const DEFAULT_CONDUCTIVITY_WARN: Bounds = Bounds::new(100, 1300);
pub const DEFAULT_BATTERY_OK: Bounds = Bounds::new(10, 100);
pub const DEFAULT_BATTERY_WARN: Bounds = Bounds::new(3, 120);

/// Immutable mapping from metric to its classification rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSet {
    pub address: MetricSpec,
    pub firmware: MetricSpec,
    pub temperature: MetricSpec,
    pub light: MetricSpec,
    pub moisture: MetricSpec,
    pub conductivity: MetricSpec,
    pub battery: MetricSpec,
}

impl ThresholdSet {
    /// Returns the rule for a metric.
    pub fn spec(&self, metric: Metric) -> &MetricSpec {
        match metric {
            Metric::Address => &self.address,
            Metric::Firmware => &self.firmware,
            Metric::Temperature => &self.temperature,
            Metric::Light => &self.light,
            Metric::Moisture => &self.moisture,
            Metric::Conductivity => &self.conductivity,
            Metric::Battery => &self.battery,
        }
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            address: MetricSpec::Text { expected: None },
            firmware: MetricSpec::Text { expected: None },
            temperature: MetricSpec::Numeric {
                ok: DEFAULT_TEMPERATURE_OK,
                warn: DEFAULT_TEMPERATURE_WARN,
            },
            light: MetricSpec::Numeric {
                ok: DEFAULT_LIGHT_OK,
                warn: DEFAULT_LIGHT_WARN,
            },
            moisture: MetricSpec::Numeric {
                ok: DEFAULT_MOISTURE_OK,
                warn: DEFAULT_MOISTURE_WARN,
            },
            conductivity: MetricSpec::Numeric {
                ok: DEFAULT_CONDUCTIVITY_OK,
                warn: DEFAULT_CONDUCTIVITY_WARN,
            },
            battery: MetricSpec::Numeric {
                ok: DEFAULT_BATTERY_OK,
                warn: DEFAULT_BATTERY_WARN,
            },
        }
    }
}
