//! Threshold tables for indicator evaluation
//!
//! Each indicator has a closed optimal ("excellent") interval and, for every
//! lesser tier, an optional band below the optimum and an optional band above
//! it. Lower bands are half-open `[min, max)` and upper bands are `(min, max]`,
//! so a value sitting exactly on a shared edge belongs to the band closer to
//! the optimum. Anything outside every band is critical.

use crate::{
    Error, Result,
    indicator::{Deviation, IndicatorCode, Tier},
};
use serde::{Deserialize, Serialize};

/// A numeric interval; inclusivity depends on where it is used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Lower edge
    pub min: f64,
    /// Upper edge
    pub max: f64,
}

impl Band {
    /// Create a band
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn contains_closed(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn contains_lower(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }

    fn contains_upper(&self, value: f64) -> bool {
        value > self.min && value <= self.max
    }
}

/// The bands of one non-optimal tier
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TierBands {
    /// Band below the optimum, `[min, max)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<Band>,
    /// Band above the optimum, `(min, max]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<Band>,
}

impl TierBands {
    const fn both(lower: Band, upper: Band) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

/// Complete band layout for one indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBands {
    /// Optimal interval, closed on both ends
    pub excellent: Band,
    /// Good bands
    #[serde(default)]
    pub good: TierBands,
    /// Warning bands
    #[serde(default)]
    pub warning: TierBands,
    /// Poor bands
    #[serde(default)]
    pub poor: TierBands,
}

impl IndicatorBands {
    /// Classify a value, checking tiers from best to worst
    pub fn classify(&self, value: f64) -> (Tier, Deviation) {
        if self.excellent.contains_closed(value) {
            return (Tier::Excellent, Deviation::Within);
        }

        for (tier, bands) in [
            (Tier::Good, &self.good),
            (Tier::Warning, &self.warning),
            (Tier::Poor, &self.poor),
        ] {
            if bands.lower.is_some_and(|b| b.contains_lower(value)) {
                return (tier, Deviation::Below);
            }
            if bands.upper.is_some_and(|b| b.contains_upper(value)) {
                return (tier, Deviation::Above);
            }
        }

        let side = if value < self.excellent.min {
            Deviation::Below
        } else {
            Deviation::Above
        };
        (Tier::Critical, side)
    }

    /// Bands from the outermost lower band to the outermost upper band
    fn ordered(&self) -> Vec<Band> {
        let mut bands: Vec<Band> = [self.poor.lower, self.warning.lower, self.good.lower]
            .into_iter()
            .flatten()
            .collect();
        bands.push(self.excellent);
        bands.extend(
            [self.good.upper, self.warning.upper, self.poor.upper]
                .into_iter()
                .flatten(),
        );
        bands
    }

    fn validate(&self, code: IndicatorCode) -> Result<()> {
        let bands = self.ordered();

        for band in &bands {
            if !band.min.is_finite() || !band.max.is_finite() {
                return Err(Error::configuration(format!(
                    "{code}: band edges must be finite"
                )));
            }
            if band.min > band.max {
                return Err(Error::configuration(format!(
                    "{code}: band [{}, {}] has min above max",
                    band.min, band.max
                )));
            }
        }

        if self.excellent.min >= self.excellent.max {
            return Err(Error::configuration(format!(
                "{code}: optimal band must not be empty"
            )));
        }

        for pair in bands.windows(2) {
            if pair[0].max > pair[1].min {
                return Err(Error::configuration(format!(
                    "{code}: bands [{}, {}] and [{}, {}] overlap",
                    pair[0].min, pair[0].max, pair[1].min, pair[1].max
                )));
            }
        }

        Ok(())
    }

    /// Move the optimal interval and pull the surrounding bands along so the
    /// layout stays gap-free next to the optimum and non-overlapping further out
    fn with_optimal(mut self, min: f64, max: f64) -> Self {
        self.excellent = Band::new(min, max);

        let mut edge = None;
        for tier in [&mut self.good, &mut self.warning, &mut self.poor] {
            if let Some(band) = tier.lower.as_mut() {
                let current = band.max;
                band.max = edge.map_or(min, |e: f64| current.min(e));
                band.min = band.min.min(band.max);
                edge = Some(band.min);
            }
        }

        let mut edge = None;
        for tier in [&mut self.good, &mut self.warning, &mut self.poor] {
            if let Some(band) = tier.upper.as_mut() {
                let current = band.min;
                band.min = edge.map_or(max, |e: f64| current.max(e));
                band.max = band.max.max(band.min);
                edge = Some(band.max);
            }
        }

        self
    }
}

/// Threshold table for all four indicators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Bed Occupancy Rate bands, percent
    pub bor: IndicatorBands,
    /// Length of Stay bands, days
    pub los: IndicatorBands,
    /// Bed Turn Over bands, count per period
    pub bto: IndicatorBands,
    /// Turn Over Interval bands, days
    pub toi: IndicatorBands,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            bor: IndicatorBands {
                excellent: Band::new(70.0, 85.0),
                good: TierBands {
                    lower: Some(Band::new(60.0, 70.0)),
                    upper: None,
                },
                warning: TierBands::both(Band::new(50.0, 60.0), Band::new(85.0, 90.0)),
                poor: TierBands::both(Band::new(40.0, 50.0), Band::new(90.0, 95.0)),
            },
            los: IndicatorBands {
                excellent: Band::new(6.0, 9.0),
                good: TierBands::both(Band::new(5.0, 6.0), Band::new(9.0, 11.0)),
                warning: TierBands::both(Band::new(4.0, 5.0), Band::new(11.0, 14.0)),
                poor: TierBands::both(Band::new(3.0, 4.0), Band::new(14.0, 18.0)),
            },
            bto: IndicatorBands {
                excellent: Band::new(40.0, 50.0),
                good: TierBands::both(Band::new(30.0, 40.0), Band::new(50.0, 60.0)),
                warning: TierBands::both(Band::new(25.0, 30.0), Band::new(60.0, 70.0)),
                poor: TierBands::both(Band::new(15.0, 25.0), Band::new(70.0, 80.0)),
            },
            toi: IndicatorBands {
                excellent: Band::new(1.0, 3.0),
                good: TierBands::both(Band::new(0.5, 1.0), Band::new(3.0, 4.0)),
                warning: TierBands::both(Band::new(0.2, 0.5), Band::new(4.0, 6.0)),
                poor: TierBands::both(Band::new(0.1, 0.2), Band::new(6.0, 8.0)),
            },
        }
    }
}

impl Thresholds {
    /// Bands for one indicator
    pub const fn get(&self, code: IndicatorCode) -> &IndicatorBands {
        match code {
            IndicatorCode::Bor => &self.bor,
            IndicatorCode::Los => &self.los,
            IndicatorCode::Bto => &self.bto,
            IndicatorCode::Toi => &self.toi,
        }
    }

    /// Check every indicator's bands are finite, ordered and non-overlapping
    pub fn validate(&self) -> Result<()> {
        for code in IndicatorCode::ALL {
            self.get(code).validate(code)?;
        }
        Ok(())
    }

    /// A copy whose optimal bands follow the server-published ranges
    #[must_use]
    pub fn with_remote_optimal(&self, standards: &MedicalStandards) -> Self {
        let apply = |bands: IndicatorBands, remote: &MedicalThresholds| {
            if remote.is_usable() {
                bands.with_optimal(remote.optimal_min, remote.optimal_max)
            } else {
                tracing::warn!(
                    optimal_min = remote.optimal_min,
                    optimal_max = remote.optimal_max,
                    "ignoring unusable remote optimal range"
                );
                bands
            }
        };

        Self {
            bor: apply(self.bor, &standards.bor),
            los: apply(self.los, &standards.los),
            bto: apply(self.bto, &standards.bto),
            toi: apply(self.toi, &standards.toi),
        }
    }
}

/// Server-published thresholds for one indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MedicalThresholds {
    /// Lower edge of the optimal range
    pub optimal_min: f64,
    /// Upper edge of the optimal range
    pub optimal_max: f64,
    /// Value at or above which the indicator is critical
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_high: Option<f64>,
    /// Value at or below which the indicator is critical
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_low: Option<f64>,
    /// Lower warning edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_low: Option<f64>,
    /// Upper warning edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_high: Option<f64>,
}

impl MedicalThresholds {
    const fn optimal(min: f64, max: f64) -> Self {
        Self {
            optimal_min: min,
            optimal_max: max,
            critical_high: None,
            critical_low: None,
            warning_low: None,
            warning_high: None,
        }
    }

    fn is_usable(&self) -> bool {
        self.optimal_min.is_finite()
            && self.optimal_max.is_finite()
            && self.optimal_min >= 0.0
            && self.optimal_min < self.optimal_max
    }
}

/// Payload of `GET /standards/medical`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MedicalStandards {
    /// BOR thresholds
    #[serde(rename = "BOR")]
    pub bor: MedicalThresholds,
    /// LOS thresholds
    #[serde(rename = "LOS")]
    pub los: MedicalThresholds,
    /// BTO thresholds
    #[serde(rename = "BTO")]
    pub bto: MedicalThresholds,
    /// TOI thresholds
    #[serde(rename = "TOI")]
    pub toi: MedicalThresholds,
}

impl Default for MedicalStandards {
    fn default() -> Self {
        Self {
            bor: MedicalThresholds {
                critical_high: Some(90.0),
                warning_low: Some(50.0),
                ..MedicalThresholds::optimal(60.0, 85.0)
            },
            los: MedicalThresholds {
                critical_high: Some(12.0),
                warning_low: Some(3.0),
                ..MedicalThresholds::optimal(6.0, 9.0)
            },
            bto: MedicalThresholds {
                critical_low: Some(30.0),
                warning_high: Some(60.0),
                ..MedicalThresholds::optimal(40.0, 50.0)
            },
            toi: MedicalThresholds {
                critical_high: Some(5.0),
                warning_low: Some(0.5),
                ..MedicalThresholds::optimal(1.0, 3.0)
            },
        }
    }
}

impl MedicalStandards {
    /// Thresholds for one indicator
    pub const fn get(&self, code: IndicatorCode) -> &MedicalThresholds {
        match code {
            IndicatorCode::Bor => &self.bor,
            IndicatorCode::Los => &self.los,
            IndicatorCode::Bto => &self.bto,
            IndicatorCode::Toi => &self.toi,
        }
    }
}
