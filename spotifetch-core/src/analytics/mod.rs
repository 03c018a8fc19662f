//! Analytics module for spotifetch
//!
//! Pure functions over an in-memory event list:
//! - Window slicing and uniqueness counting
//! - Music ratio (unique tracks/albums/artists, current vs previous period)
//! - Listening fingerprint (five 0-100 regularity and diversity metrics)
//! - Hour-of-day distribution (the radial clock)
//! - Week-over-week comparison
//! - Top-N rankings
//!
//! Nothing here performs I/O or fails on degenerate input: every ratio has an
//! explicit zero-denominator branch that yields 0.
//!
//! [`ListeningReport`] bundles all of the above for one [`TimeRange`], and
//! [`ReportCache`] memoizes reports per range until the next explicit fetch.

mod distribution;
pub mod engine;
pub mod report;

pub use distribution::{HourlyDistribution, HOURS};
pub use engine::{
    count_unique, slice, AnalyticsEngine, Fingerprint, MusicRatio, RankedEntity,
    WeeklyComparison, FINGERPRINT_DAYS,
};
pub use report::{ListeningReport, ReportCache, TimeRange};

/// Round a ratio to a whole percentage in `[0, 100]`.
///
/// Rounds half up; a non-positive denominator yields 0.
pub(crate) fn percent(numerator: f64, denominator: f64) -> u8 {
    if denominator <= 0.0 {
        return 0;
    }
    clamp_percent(100.0 * numerator / denominator)
}

/// Round half up and clamp into `[0, 100]`.
pub(crate) fn clamp_percent(value: f64) -> u8 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value + 0.5).floor().min(100.0) as u8
}

/// Whole-percent change from `previous` to `current`; 0 when `previous` is 0.
pub fn change_pct(current: u32, previous: u32) -> i64 {
    if previous == 0 {
        return 0;
    }
    let delta = (f64::from(current) - f64::from(previous)) / f64::from(previous) * 100.0;
    // half away from zero keeps -12.5 and +12.5 symmetric
    delta.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(1.0, 30.0), 3);
        assert_eq!(percent(1.0, 2.0), 50);
        assert_eq!(percent(1.0, 200.0), 1); // 0.5 rounds up
        assert_eq!(percent(31.0, 30.0), 100);
        assert_eq!(percent(5.0, 0.0), 0);
        assert_eq!(percent(-1.0, 3.0), 0);
    }

    #[test]
    fn test_change_pct() {
        assert_eq!(change_pct(123, 100), 23);
        assert_eq!(change_pct(80, 100), -20);
        assert_eq!(change_pct(100, 0), 0);
        assert_eq!(change_pct(0, 0), 0);
    }
}
