use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{BmiCategory, RiskLevel};

/// Tunable policy data consumed by the sizing pipeline.
///
/// Every section has defaults, so a policy file only needs the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizingPolicy {
    pub validation: ValidationLimits,
    pub bmi: BmiThresholds,
    pub risk: RiskPolicy,
    pub confidence: ConfidencePolicy,
    pub calibration: CalibrationWeights,
}

impl SizingPolicy {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PolicyError> {
        let policy: SizingPolicy = serde_json::from_reader(reader)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        for (name, range) in [
            ("validation.heightCm", &self.validation.height_cm),
            ("validation.weightKg", &self.validation.weight_kg),
            ("validation.garmentLengthCm", &self.validation.garment_length_cm),
            ("validation.garmentWidthCm", &self.validation.garment_width_cm),
        ] {
            if !(range.min.is_finite() && range.max.is_finite() && range.min < range.max) {
                return Err(PolicyError::Invalid(format!(
                    "{name} must be a finite range with min < max"
                )));
            }
        }

        let bmi = &self.bmi;
        if !(bmi.underweight_below > 0.0
            && bmi.underweight_below < bmi.overweight_from
            && bmi.overweight_from < bmi.obese_from)
        {
            return Err(PolicyError::Invalid(
                "bmi thresholds must be positive and strictly ascending".to_string(),
            ));
        }

        if self.risk.boundary_proximity_cm < 0.0 || self.risk.critical_height_margin_cm < 0.0 {
            return Err(PolicyError::Invalid(
                "risk distances must not be negative".to_string(),
            ));
        }

        let confidence = &self.confidence;
        if !(0.0..=1.0).contains(&confidence.low_agreement_below)
            || !(0.0..=1.0).contains(&confidence.high_agreement_from)
            || confidence.low_agreement_below > confidence.high_agreement_from
        {
            return Err(PolicyError::Invalid(
                "confidence agreement thresholds must lie in [0, 1] and be ordered".to_string(),
            ));
        }

        if self.calibration.length_weight < 0.0
            || self.calibration.width_weight < 0.0
            || self.calibration.length_weight + self.calibration.width_weight <= 0.0
        {
            return Err(PolicyError::Invalid(
                "calibration weights must be non-negative and not both zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Inclusive range of accepted values for a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRange {
    pub min: f64,
    pub max: f64,
}

impl MeasurementRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Plausibility limits applied before any computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationLimits {
    pub height_cm: MeasurementRange,
    pub weight_kg: MeasurementRange,
    pub garment_length_cm: MeasurementRange,
    pub garment_width_cm: MeasurementRange,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            height_cm: MeasurementRange::new(100.0, 275.0),
            weight_kg: MeasurementRange::new(15.0, 300.0),
            garment_length_cm: MeasurementRange::new(20.0, 150.0),
            garment_width_cm: MeasurementRange::new(20.0, 100.0),
        }
    }
}

/// BMI cut-offs; adult WHO bands by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BmiThresholds {
    pub underweight_below: f64,
    pub overweight_from: f64,
    pub obese_from: f64,
}

impl BmiThresholds {
    pub fn categorize(&self, bmi: f64) -> BmiCategory {
        if bmi < self.underweight_below {
            BmiCategory::Underweight
        } else if bmi < self.overweight_from {
            BmiCategory::Normal
        } else if bmi < self.obese_from {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

impl Default for BmiThresholds {
    fn default() -> Self {
        Self {
            underweight_below: 18.5,
            overweight_from: 25.0,
            obese_from: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiskPolicy {
    /// Heights this close to a chart boundary are flagged.
    pub boundary_proximity_cm: f64,
    /// Calibration agreement below this is a disagreement.
    pub disagreement_below: f64,
    /// Heights further than this outside the chart escalate to CRITICAL.
    pub critical_height_margin_cm: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            boundary_proximity_cm: 2.0,
            disagreement_below: 0.5,
            critical_height_margin_cm: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfidencePolicy {
    pub low_risk_base: u8,
    pub medium_risk_base: u8,
    pub high_risk_base: u8,
    pub critical_risk_base: u8,
    pub agreement_bonus: u8,
    pub disagreement_penalty: u8,
    pub high_agreement_from: f64,
    pub low_agreement_below: f64,
}

impl ConfidencePolicy {
    pub fn base_for(&self, risk: RiskLevel) -> u8 {
        match risk {
            RiskLevel::Low => self.low_risk_base,
            RiskLevel::Medium => self.medium_risk_base,
            RiskLevel::High => self.high_risk_base,
            RiskLevel::Critical => self.critical_risk_base,
        }
    }
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            low_risk_base: 90,
            medium_risk_base: 70,
            high_risk_base: 45,
            critical_risk_base: 20,
            agreement_bonus: 10,
            disagreement_penalty: 15,
            high_agreement_from: 0.8,
            low_agreement_below: 0.5,
        }
    }
}

/// Relative weight of length and width when matching a garment to a chart size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalibrationWeights {
    pub length_weight: f64,
    pub width_weight: f64,
}

impl Default for CalibrationWeights {
    fn default() -> Self {
        Self {
            length_weight: 1.0,
            width_weight: 1.5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read sizing policy: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid sizing policy JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid sizing policy: {0}")]
    Invalid(String),
}
