use chrono::NaiveDateTime;

use crate::foundation::error::{WaylineError, WaylineResult};

/// Immutable journey bounds in local wall-clock time.
///
/// `start < end` is enforced at construction; an inverted or zero-length
/// interval is a configuration error, never a runtime state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Interval {
    /// Validate and build an interval from its endpoints.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> WaylineResult<Self> {
        if start >= end {
            return Err(WaylineError::config(format!(
                "interval start '{start}' must be before end '{end}'"
            )));
        }
        Ok(Self { start, end })
    }

    /// Journey start.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Journey end.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Full journey length (always positive).
    pub fn total(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Timestamp shapes accepted for interval endpoints.
const FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a local wall-clock timestamp such as `2024-01-01T10:00`.
pub fn parse_local_timestamp(s: &str) -> WaylineResult<NaiveDateTime> {
    let s = s.trim();
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    Err(WaylineError::config(format!(
        "unrecognized timestamp '{s}' (expected e.g. 2024-01-01T10:00)"
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/journey/interval.rs"]
mod tests;
