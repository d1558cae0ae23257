//! Threshold evaluation and status aggregation.

use miflora_sensor::{Metric, MetricValue, SensorReading};
use tracing::debug;

use crate::status::Status;
use crate::thresholds::{MetricSpec, ThresholdSet};

/// Result of evaluating one reading. A fresh value per run; nothing is
/// carried between invocations.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Worst per-metric status, or UNKNOWN when no reading was obtained.
    pub overall: Status,
    /// Per-metric statuses in `Metric::ALL` order; empty without a reading.
    pub per_metric: Vec<(Metric, Status)>,
}

/// Classifies a single metric value against its rule.
pub fn classify(value: &MetricValue, spec: &MetricSpec) -> Status {
    match (value, spec) {
        (MetricValue::Text(actual), MetricSpec::Text { expected }) => match expected {
            // Absent or empty expectation means "don't care".
            Some(expected) if !expected.is_empty() && expected != actual => Status::Critical,
            _ => Status::Ok,
        },
        (MetricValue::Number(value), MetricSpec::Numeric { ok, warn }) => {
            if !warn.contains(*value) {
                Status::Critical
            } else if !ok.contains(*value) {
                Status::Warning
            } else {
                Status::Ok
            }
        }
        // Value kind and configured rule disagree; cannot judge.
        _ => Status::Unknown,
    }
}

/// Evaluates a reading and aggregates the per-metric statuses to the worst
/// one. An absent reading is UNKNOWN as a whole.
pub fn evaluate(reading: Option<&SensorReading>, thresholds: &ThresholdSet) -> Evaluation {
    let Some(reading) = reading else {
        return Evaluation {
            overall: Status::Unknown,
            per_metric: Vec::new(),
        };
    };

    let mut per_metric = Vec::with_capacity(Metric::ALL.len());
    let mut overall = Status::Ok;
    for (metric, value) in reading.metrics() {
        let status = classify(&value, thresholds.spec(metric));
        debug!("{} {} {} is {}", metric, value, metric.unit(), status);
        overall = overall.max(status);
        per_metric.push((metric, status));
    }

    Evaluation {
        overall,
        per_metric,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::Bounds;

    fn numeric(ok: (i64, i64), warn: (i64, i64)) -> MetricSpec {
        MetricSpec::Numeric {
            ok: Bounds::new(ok.0, ok.1),
            warn: Bounds::new(warn.0, warn.1),
        }
    }

    fn classify_number(value: f64, spec: &MetricSpec) -> Status {
        classify(&MetricValue::Number(value), spec)
    }

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
    fn test_numeric_tiers() {
        let spec = numeric((18, 25), (15, 30));
        assert_eq!(classify_number(22.0, &spec), Status::Ok);
        assert_eq!(classify_number(16.0, &spec), Status::Warning);
        assert_eq!(classify_number(28.0, &spec), Status::Warning);
        assert_eq!(classify_number(14.0, &spec), Status::Critical);
        assert_eq!(classify_number(31.0, &spec), Status::Critical);
    }

    #[test]
    fn test_numeric_bounds_inclusive() {
        let spec = numeric((18, 25), (15, 30));
        assert_eq!(classify_number(18.0, &spec), Status::Ok);
        assert_eq!(classify_number(25.0, &spec), Status::Ok);
        assert_eq!(classify_number(15.0, &spec), Status::Warning);
        assert_eq!(classify_number(30.0, &spec), Status::Warning);
    }

    #[test]
    fn test_numeric_monotonic_from_ok_center() {
        // Walking away from the OK center never improves the status.
        let spec = numeric((18, 25), (15, 30));
        let mut worst = Status::Ok;
        for value in (22..=40).map(f64::from) {
            let status = classify_number(value, &spec);
            assert!(status >= worst, "status degraded back to {:?} at {}", status, value);
            worst = worst.max(status);
        }
    }

    #[test]
    fn test_floor_applied_before_comparison() {
        let spec = numeric((18, 25), (15, 30));
        assert_eq!(classify_number(24.9, &spec), Status::Ok); // floors to 24
        assert_eq!(classify_number(25.9, &spec), Status::Ok); // floors to 25
        assert_eq!(classify_number(30.9, &spec), Status::Warning); // floors to 30
        assert_eq!(classify_number(17.9, &spec), Status::Warning); // floors to 17
        assert_eq!(classify_number(14.9, &spec), Status::Critical); // floors to 14
    }

    #[test]
    fn test_text_exact_match() {
        let spec = MetricSpec::Text {
            expected: Some("c4:7c:8d:62:74:3b".to_string()),
        };
        assert_eq!(
            classify(&MetricValue::Text("c4:7c:8d:62:74:3b".into()), &spec),
            Status::Ok
        );
        assert_eq!(
            classify(&MetricValue::Text("00:00:00:00:00:00".into()), &spec),
            Status::Critical
        );
    }

    #[test]
    fn test_text_without_expectation_is_ok() {
        let spec = MetricSpec::Text { expected: None };
        assert_eq!(
            classify(&MetricValue::Text("anything".into()), &spec),
            Status::Ok
        );
        let spec = MetricSpec::Text {
            expected: Some(String::new()),
        };
        assert_eq!(
            classify(&MetricValue::Text("anything".into()), &spec),
            Status::Ok
        );
    }

    #[test]
    fn test_aggregation_takes_worst() {
        let thresholds = ThresholdSet::default();
        let mut r = reading();
        let eval = evaluate(Some(&r), &thresholds);
        assert_eq!(eval.overall, Status::Ok);
        assert_eq!(eval.per_metric.len(), Metric::ALL.len());

        // One warning metric drags the whole reading to WARNING.
        r.moisture = 55;
        assert_eq!(evaluate(Some(&r), &thresholds).overall, Status::Warning);

        // A critical metric wins over warnings.
        r.conductivity = 1500;
        assert_eq!(evaluate(Some(&r), &thresholds).overall, Status::Critical);
    }

    #[test]
    fn test_absent_reading_is_unknown() {
        let eval = evaluate(None, &ThresholdSet::default());
        assert_eq!(eval.overall, Status::Unknown);
        assert!(eval.per_metric.is_empty());
    }
}
