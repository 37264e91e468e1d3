//! Bed-occupancy indicator codes, status tiers and evaluation results

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The four ward efficiency indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorCode {
    /// Bed Occupancy Rate, percent
    Bor,
    /// Average Length of Stay, days
    #[serde(alias = "ALOS")]
    Los,
    /// Bed Turn Over, discharges per bed per period
    Bto,
    /// Turn Over Interval, idle days per bed
    Toi,
}

impl IndicatorCode {
    /// All codes in dashboard display order
    pub const ALL: [Self; 4] = [Self::Bor, Self::Los, Self::Bto, Self::Toi];

    /// Short code as shown on cards
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bor => "BOR",
            Self::Los => "LOS",
            Self::Bto => "BTO",
            Self::Toi => "TOI",
        }
    }

    /// Unit suffix for display
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Bor => "%",
            Self::Los | Self::Toi => "hari",
            Self::Bto => "kali",
        }
    }

    /// Full English name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bor => "Bed Occupancy Rate",
            Self::Los => "Average Length of Stay",
            Self::Bto => "Bed Turn Over",
            Self::Toi => "Turn Over Interval",
        }
    }

    /// One-line Indonesian description
    pub const fn description(self) -> &'static str {
        match self {
            Self::Bor => "Persentase pemakaian tempat tidur",
            Self::Los => "Rata-rata lama rawat pasien",
            Self::Bto => "Frekuensi pemakaian tempat tidur",
            Self::Toi => "Rata-rata hari tempat tidur tidak ditempati",
        }
    }

    /// Format a value with the unit, e.g. `72.5%` or `7.2 hari`
    pub fn format_value(self, value: f64) -> String {
        match self {
            Self::Bor => format!("{value:.1}%"),
            _ => format!("{value:.1} {}", self.unit()),
        }
    }
}

impl fmt::Display for IndicatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorCode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BOR" => Ok(Self::Bor),
            "LOS" | "ALOS" => Ok(Self::Los),
            "BTO" => Ok(Self::Bto),
            "TOI" => Ok(Self::Toi),
            _ => Err(crate::Error::InvalidIndicator {
                code: s.to_string(),
            }),
        }
    }
}

/// Status tier, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Inside the optimal band
    Excellent,
    /// Close to optimal
    Good,
    /// Needs attention
    Warning,
    /// Well outside the acceptable range
    Poor,
    /// Outside every band
    Critical,
}

impl Tier {
    /// All tiers from best to worst
    pub const ALL: [Self; 5] = [
        Self::Excellent,
        Self::Good,
        Self::Warning,
        Self::Poor,
        Self::Critical,
    ];

    /// Indonesian label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Sangat Baik",
            Self::Good => "Baik",
            Self::Warning => "Perhatian",
            Self::Poor => "Buruk",
            Self::Critical => "Kritis",
        }
    }

    /// Coarse display level used for colouring
    pub const fn level(self) -> Level {
        match self {
            Self::Excellent => Level::Success,
            Self::Good => Level::Info,
            Self::Warning => Level::Warning,
            Self::Poor | Self::Critical => Level::Danger,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display level of a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Green
    Success,
    /// Blue
    Info,
    /// Yellow
    Warning,
    /// Red
    Danger,
}

/// Which side of the optimal band a value lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deviation {
    /// Inside the optimal band
    Within,
    /// Below the optimal band
    Below,
    /// Above the optimal band
    Above,
}

/// A single indicator value taken from a census payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    /// Indicator code
    pub code: IndicatorCode,
    /// Measured value
    pub value: f64,
    /// Census date the value belongs to
    pub measured_at: NaiveDate,
}

impl IndicatorReading {
    /// Create a reading
    pub const fn new(code: IndicatorCode, value: f64, measured_at: NaiveDate) -> Self {
        Self {
            code,
            value,
            measured_at,
        }
    }
}

/// Outcome of evaluating one indicator value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Evaluated code, `None` for the neutral fallback of an unknown code
    pub code: Option<IndicatorCode>,
    /// The evaluated value
    pub value: f64,
    /// Status tier
    pub status: Tier,
    /// Side of the optimal band
    pub deviation: Deviation,
    /// Human-readable status message
    pub message: String,
    /// Operational recommendation
    pub recommendation: String,
}

impl EvaluationResult {
    /// Display level of the status tier
    pub const fn level(&self) -> Level {
        self.status.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("BOR", IndicatorCode::Bor)]
    #[case("bor", IndicatorCode::Bor)]
    #[case(" los ", IndicatorCode::Los)]
    #[case("ALOS", IndicatorCode::Los)]
    #[case("Bto", IndicatorCode::Bto)]
    #[case("toi", IndicatorCode::Toi)]
    fn parses_codes_case_insensitively(#[case] input: &str, #[case] expected: IndicatorCode) {
        assert_eq!(input.parse::<IndicatorCode>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_codes() {
        let err = "NDR".parse::<IndicatorCode>().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidIndicator { code } if code == "NDR"));
    }

    #[test]
    fn code_serde_uses_uppercase_and_accepts_alos() {
        assert_eq!(serde_json::to_string(&IndicatorCode::Toi).unwrap(), "\"TOI\"");
        let los: IndicatorCode = serde_json::from_str("\"ALOS\"").unwrap();
        assert_eq!(los, IndicatorCode::Los);
    }

    #[test]
    fn tiers_are_ordered_best_to_worst() {
        let mut sorted = Tier::ALL;
        sorted.sort();
        assert_eq!(sorted, Tier::ALL);
        assert!(Tier::Excellent < Tier::Critical);
    }

    #[test]
    fn tier_levels() {
        assert_eq!(Tier::Excellent.level(), Level::Success);
        assert_eq!(Tier::Good.level(), Level::Info);
        assert_eq!(Tier::Warning.level(), Level::Warning);
        assert_eq!(Tier::Poor.level(), Level::Danger);
        assert_eq!(Tier::Critical.level(), Level::Danger);
    }

    #[test]
    fn formats_values_with_units() {
        assert_eq!(IndicatorCode::Bor.format_value(72.46), "72.5%");
        assert_eq!(IndicatorCode::Los.format_value(7.0), "7.0 hari");
        assert_eq!(IndicatorCode::Bto.format_value(45.26), "45.3 kali");
    }
}
