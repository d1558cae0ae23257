//! Nagios performance-data rendering.
//!
//! Server-side expected syntax: `'label'=value[UOM];[warn];[crit];[min];[max]`.
//! We emit `label=value;ok_lo:ok_hi;warn_lo:warn_hi;;` with min/max left
//! empty, one entry per numeric metric. The identity strings (address,
//! firmware) have no sensible numeric rendering and are skipped.

use miflora_sensor::SensorReading;

use crate::thresholds::{MetricSpec, ThresholdSet};

/// Renders performance data for a reading, `None` when no reading exists.
pub fn performance_data(
    reading: Option<&SensorReading>,
    thresholds: &ThresholdSet,
) -> Option<Vec<String>> {
    let reading = reading?;
    let entries = reading
        .metrics()
        .filter(|(metric, _)| metric.is_numeric())
        .filter_map(|(metric, value)| match thresholds.spec(metric) {
            MetricSpec::Numeric { ok, warn } => Some(format!(
                "{}={};{}:{};{}:{};;",
                metric, value, ok.lower, ok.upper, warn.lower, warn.upper
            )),
            MetricSpec::Text { .. } => None,
        })
        .collect();
    Some(entries)
}
