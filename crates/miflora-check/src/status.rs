//! Monitoring-plugin severity levels.

use std::fmt;

/// Check status, ordered by severity.
///
/// The ordering drives aggregation: the overall status of a reading is the
/// maximum of its per-metric statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Status {
    #[default]
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl Status {
    /// Returns the conventional plugin exit status (0-3).
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Warning => write!(f, "WARNING"),
            Status::Critical => write!(f, "CRITICAL"),
            Status::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
