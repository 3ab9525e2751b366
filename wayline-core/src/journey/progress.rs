use chrono::{Duration, NaiveDateTime};

use crate::journey::interval::Interval;

/// Snapshot of journey progress at a single instant.
///
/// Recomputed from scratch on every tick; holds no references to the clock or
/// the interval it was derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressRecord {
    /// Fraction of the interval elapsed, in percent, clamped to `[0, 100]`.
    pub percent: f64,
    /// Elapsed time as `HH:MM`.
    pub elapsed: String,
    /// Remaining time as `HH:MM`.
    pub remaining: String,
    /// Interval start as local wall-clock `HH:MM`.
    pub start_label: String,
    /// Interval end as local wall-clock `HH:MM`.
    pub end_label: String,
}

/// Compute the progress snapshot for `now` over `interval`.
///
/// Pure and total: identical inputs always produce the identical record, and
/// `percent` never leaves `[0, 100]` even when `now` falls outside the
/// interval. For fixed bounds, `percent` is non-decreasing in `now`.
pub fn compute(now: NaiveDateTime, interval: &Interval) -> ProgressRecord {
    let start_label = interval.start().format("%H:%M").to_string();
    let end_label = interval.end().format("%H:%M").to_string();
    let total = interval.total();

    if now < interval.start() {
        return ProgressRecord {
            percent: 0.0,
            elapsed: format_hm(Duration::zero()),
            remaining: format_hm(total),
            start_label,
            end_label,
        };
    }

    if now > interval.end() {
        return ProgressRecord {
            percent: 100.0,
            elapsed: format_hm(total),
            remaining: format_hm(Duration::zero()),
            start_label,
            end_label,
        };
    }

    let elapsed = now - interval.start();
    let remaining = interval.end() - now;
    let percent = 100.0 * (elapsed.num_milliseconds() as f64) / (total.num_milliseconds() as f64);

    ProgressRecord {
        percent,
        elapsed: format_hm(elapsed),
        remaining: format_hm(remaining),
        start_label,
        end_label,
    }
}

/// Format a duration as zero-padded `HH:MM`.
///
/// Hours count total whole hours and may exceed 24; minutes truncate toward
/// zero, so elapsed and remaining need not sum exactly to the total.
pub fn format_hm(d: Duration) -> String {
    let minutes = d.num_minutes().max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
#[path = "../../tests/unit/journey/progress.rs"]
mod tests;
