use super::charts::SizeChart;
use super::domain::{FavoriteJersey, FitFeeling};
use super::mapper::BaselineSize;
use super::policy::CalibrationWeights;

/// Result of placing the buyer's own garment on the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationOutcome {
    /// Chart row closest to the garment's measurements.
    pub garment_row: usize,
    /// `garment_row` corrected by the stated fit feeling.
    pub estimated_row: usize,
    pub fit_feeling: FitFeeling,
    /// The fit feeling asked for a size the chart does not have.
    pub feeling_clamped: bool,
    pub adjusted_primary: usize,
    pub adjusted_alternate: usize,
    /// 1.0 when both methods pick the same size, 0.5 one size apart, 0.0 otherwise.
    pub agreement_score: f64,
}

/// Calibration state for one request, so callers match on presence explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Calibration {
    NotRequested,
    /// A garment was supplied but the chart has no garment measurements to compare with.
    Unavailable,
    Applied(CalibrationOutcome),
}

impl Calibration {
    pub fn agreement_score(&self) -> Option<f64> {
        match self {
            Calibration::Applied(outcome) => Some(outcome.agreement_score),
            Calibration::NotRequested | Calibration::Unavailable => None,
        }
    }

    pub fn outcome(&self) -> Option<&CalibrationOutcome> {
        match self {
            Calibration::Applied(outcome) => Some(outcome),
            Calibration::NotRequested | Calibration::Unavailable => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceGarmentCalibrator {
    weights: CalibrationWeights,
}

impl ReferenceGarmentCalibrator {
    pub fn new(weights: CalibrationWeights) -> Self {
        Self { weights }
    }

    pub fn calibrate(
        &self,
        jersey: Option<&FavoriteJersey>,
        baseline: &BaselineSize,
        chart: &SizeChart,
    ) -> Calibration {
        let Some(jersey) = jersey else {
            return Calibration::NotRequested;
        };
        let Some(garment_row) = self.nearest_row(jersey, chart) else {
            return Calibration::Unavailable;
        };

        let offset = jersey.fit_feeling.size_offset();
        let estimated_row = chart.step_clamped(garment_row, offset);
        let feeling_clamped = chart.step(garment_row, offset).is_none();

        let distance = estimated_row.abs_diff(baseline.primary);
        let agreement_score = match distance {
            0 => 1.0,
            1 => 0.5,
            _ => 0.0,
        };

        let adjusted_primary = if distance == 0 {
            baseline.primary
        } else if estimated_row > baseline.primary {
            baseline.primary + 1
        } else {
            baseline.primary - 1
        };
        let adjusted_alternate = if adjusted_primary != baseline.primary {
            baseline.primary
        } else {
            baseline.alternate
        };

        Calibration::Applied(CalibrationOutcome {
            garment_row,
            estimated_row,
            fit_feeling: jersey.fit_feeling,
            feeling_clamped,
            adjusted_primary,
            adjusted_alternate,
            agreement_score,
        })
    }

    /// Weighted Euclidean distance over (length, width); ties go to the larger size.
    fn nearest_row(&self, jersey: &FavoriteJersey, chart: &SizeChart) -> Option<usize> {
        if !chart.has_garment_measurements() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for (row, entry) in chart.entries().iter().enumerate() {
            let Some(garment) = entry.garment else {
                continue;
            };
            let d_length = jersey.length_cm - garment.length_cm;
            let d_width = jersey.width_cm - garment.width_cm;
            let distance = (self.weights.length_weight * d_length * d_length
                + self.weights.width_weight * d_width * d_width)
                .sqrt();

            match best {
                Some((_, best_distance)) if distance > best_distance => {}
                _ => best = Some((row, distance)),
            }
        }

        best.map(|(row, _)| row)
    }
}
