//! Hospital efficiency formulas
//!
//! Every formula returns `0.0` when its denominator is zero.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default period length in days
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// Default relative change, in percent, below which a trend is stable
pub const DEFAULT_TREND_THRESHOLD: f64 = 5.0;

/// Bed Occupancy Rate: occupied beds as a percentage of available beds
pub fn bor(occupied: u32, beds: u32) -> f64 {
    if beds == 0 {
        return 0.0;
    }
    f64::from(occupied) / f64::from(beds) * 100.0
}

/// Bed Turn Over over a period
pub fn bto(discharges: u32, beds: u32, days: u32) -> f64 {
    if beds == 0 {
        return 0.0;
    }
    f64::from(discharges) * f64::from(days) / f64::from(beds)
}

/// Average Length of Stay in days
pub fn alos(total_patient_days: u32, discharges: u32) -> f64 {
    if discharges == 0 {
        return 0.0;
    }
    f64::from(total_patient_days) / f64::from(discharges)
}

/// Turn Over Interval in days
///
/// Negative when more beds are occupied than available.
pub fn toi(beds: u32, occupied: u32, discharges: u32, days: u32) -> f64 {
    if discharges == 0 {
        return 0.0;
    }
    let empty = f64::from(beds) - f64::from(occupied);
    empty * f64::from(days) / f64::from(discharges)
}

/// Net Death Rate, percent of discharges
pub fn ndr(deaths: u32, discharges: u32) -> f64 {
    if discharges == 0 {
        return 0.0;
    }
    f64::from(deaths) / f64::from(discharges) * 100.0
}

/// Gross Death Rate, percent of all discharges alive or dead
pub fn gdr(deaths: u32, discharged_alive: u32, deaths_under_48h: u32) -> f64 {
    let total = u64::from(discharged_alive) + u64::from(deaths);
    if total == 0 {
        return 0.0;
    }
    (f64::from(deaths) + f64::from(deaths_under_48h)) / total as f64 * 100.0
}

/// Patients at end of day, saturating at zero
pub const fn patients_end(start: u32, admitted: u32, discharged: u32) -> u32 {
    start.saturating_add(admitted).saturating_sub(discharged)
}

/// Direction of change between two periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Increasing
    Naik,
    /// Decreasing
    Turun,
    /// Within the threshold
    Stabil,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Naik => "naik",
            Self::Turun => "turun",
            Self::Stabil => "stabil",
        })
    }
}

/// Classify the change from `previous` to `current`
///
/// A relative change below `threshold_pct` percent is stable. With a zero
/// baseline any difference counts as movement.
pub fn trend(current: f64, previous: f64, threshold_pct: f64) -> Trend {
    let difference = current - previous;
    if difference == 0.0 {
        return Trend::Stabil;
    }
    if previous != 0.0 {
        let change = difference.abs() / previous.abs() * 100.0;
        if change < threshold_pct {
            return Trend::Stabil;
        }
    }
    if difference > 0.0 {
        Trend::Naik
    } else {
        Trend::Turun
    }
}

/// Percentage change from `previous` to `current`, `0.0` for a zero baseline
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn bor_is_percentage_of_beds() {
        assert_eq!(bor(36, 48), 75.0);
        assert_eq!(bor(10, 0), 0.0);
    }

    #[test]
    fn bto_scales_with_days() {
        assert_eq!(bto(4, 40, 30), 3.0);
        assert_eq!(bto(4, 0, 30), 0.0);
    }

    #[test]
    fn alos_divides_patient_days_by_discharges() {
        assert_eq!(alos(150, 20), 7.5);
        assert_eq!(alos(150, 0), 0.0);
    }

    #[test]
    fn toi_uses_empty_beds() {
        assert_eq!(toi(50, 40, 10, 1), 1.0);
        assert_eq!(toi(50, 40, 0, 30), 0.0);
        assert!(toi(40, 50, 10, 1) < 0.0);
    }

    #[test]
    fn death_rates() {
        assert_eq!(ndr(2, 100), 2.0);
        assert_eq!(ndr(2, 0), 0.0);
        assert_eq!(gdr(3, 97, 1), 4.0);
        assert_eq!(gdr(0, 0, 0), 0.0);
    }

    #[test]
    fn patients_end_saturates() {
        assert_eq!(patients_end(30, 5, 3), 32);
        assert_eq!(patients_end(1, 0, 3), 0);
    }

    #[rstest]
    #[case(105.0, 100.0, Trend::Naik)]
    #[case(104.0, 100.0, Trend::Stabil)]
    #[case(95.0, 100.0, Trend::Turun)]
    #[case(96.0, 100.0, Trend::Stabil)]
    #[case(5.0, 0.0, Trend::Naik)]
    #[case(0.0, 0.0, Trend::Stabil)]
    fn trend_uses_relative_threshold(
        #[case] current: f64,
        #[case] previous: f64,
        #[case] expected: Trend,
    ) {
        assert_eq!(trend(current, previous, DEFAULT_TREND_THRESHOLD), expected);
    }

    #[test]
    fn percentage_change_handles_zero_baseline() {
        assert_eq!(percentage_change(110.0, 100.0), 10.0);
        assert_eq!(percentage_change(50.0, 0.0), 0.0);
    }
}
