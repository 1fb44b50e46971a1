use super::charts::{HeightPlacement, SizeChart};
use super::domain::{BmiAnalysis, BmiCategory, FitPreference};

/// What the BMI signal did to the height-based size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiAdjustmentOutcome {
    /// Normal build; nothing to adjust.
    NotNeeded,
    /// Non-normal build, but the chart row carries no shift for it.
    NoShift,
    /// Shifted by `steps` sizes (always -1 or 1).
    Applied { steps: i8 },
    /// The shift would leave the chart; the height size stands.
    Blocked { steps: i8 },
}

/// Height/BMI baseline, expressed as row indices into the chart it was mapped against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineSize {
    pub primary: usize,
    pub alternate: usize,
    pub height_row: usize,
    pub placement: HeightPlacement,
    pub adjustment: BmiAdjustmentOutcome,
    /// The fit preference promoted the BMI-shifted size to primary.
    pub preference_promoted: bool,
}

/// Height picks the row; BMI may add a one-step alternate. Out-of-range heights clamp to
/// the nearest row and are flagged later by the risk classifier.
pub fn map_baseline(
    height_cm: f64,
    bmi: &BmiAnalysis,
    chart: &SizeChart,
    preference: FitPreference,
) -> BaselineSize {
    let placement = chart.locate(height_cm);
    let height_row = placement.row();
    let steps = chart.entry(height_row).bmi_adjustment.shift_for(bmi.category);

    let (alternate, adjustment) = if steps == 0 {
        let outcome = if bmi.category == BmiCategory::Normal {
            BmiAdjustmentOutcome::NotNeeded
        } else {
            BmiAdjustmentOutcome::NoShift
        };
        (height_row, outcome)
    } else {
        match chart.step(height_row, steps as isize) {
            Some(shifted) => (shifted, BmiAdjustmentOutcome::Applied { steps }),
            None => (height_row, BmiAdjustmentOutcome::Blocked { steps }),
        }
    };

    let preference_promoted = match (preference, adjustment) {
        (FitPreference::Relaxed, BmiAdjustmentOutcome::Applied { steps }) => steps > 0,
        (FitPreference::Slim, BmiAdjustmentOutcome::Applied { steps }) => steps < 0,
        _ => false,
    };

    let (primary, alternate) = if preference_promoted {
        (alternate, height_row)
    } else {
        (height_row, alternate)
    };

    BaselineSize {
        primary,
        alternate,
        height_row,
        placement,
        adjustment,
        preference_promoted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::tests::common::{bmi, three_size_chart};

    #[test]
    fn normal_build_inside_row_keeps_height_size() {
        let chart = three_size_chart();
        let baseline = map_baseline(145.0, &bmi(BmiCategory::Normal), &chart, FitPreference::Regular);
        assert_eq!(baseline.primary, 1);
        assert_eq!(baseline.alternate, 1);
        assert_eq!(baseline.adjustment, BmiAdjustmentOutcome::NotNeeded);
    }

    #[test]
    fn overweight_adds_larger_alternate() {
        let chart = three_size_chart();
        let baseline = map_baseline(145.0, &bmi(BmiCategory::Overweight), &chart, FitPreference::Regular);
        assert_eq!(baseline.primary, 1);
        assert_eq!(baseline.alternate, 2);
        assert_eq!(baseline.adjustment, BmiAdjustmentOutcome::Applied { steps: 1 });
    }

    #[test]
    fn shift_past_largest_size_is_blocked() {
        let chart = three_size_chart();
        let baseline = map_baseline(160.0, &bmi(BmiCategory::Obese), &chart, FitPreference::Regular);
        assert_eq!(baseline.primary, 2);
        assert_eq!(baseline.alternate, 2);
        assert_eq!(baseline.adjustment, BmiAdjustmentOutcome::Blocked { steps: 1 });
    }

    #[test]
    fn relaxed_preference_promotes_larger_size() {
        let chart = three_size_chart();
        let baseline = map_baseline(145.0, &bmi(BmiCategory::Overweight), &chart, FitPreference::Relaxed);
        assert!(baseline.preference_promoted);
        assert_eq!(baseline.primary, 2);
        assert_eq!(baseline.alternate, 1);

        let slim = map_baseline(145.0, &bmi(BmiCategory::Overweight), &chart, FitPreference::Slim);
        assert!(!slim.preference_promoted);
        assert_eq!(slim.primary, 1);
    }

    #[test]
    fn heights_outside_chart_clamp_to_edge_rows() {
        let chart = three_size_chart();
        let tall = map_baseline(250.0, &bmi(BmiCategory::Normal), &chart, FitPreference::Regular);
        assert_eq!(tall.primary, 2);
        assert!(!tall.placement.is_within());

        let short = map_baseline(90.0, &bmi(BmiCategory::Normal), &chart, FitPreference::Regular);
        assert_eq!(short.primary, 0);
        assert_eq!(short.placement.distance_outside_cm(), 38.0);
    }

    #[test]
    fn boundary_height_maps_to_larger_row() {
        let chart = three_size_chart();
        let baseline = map_baseline(140.0, &bmi(BmiCategory::Normal), &chart, FitPreference::Regular);
        assert_eq!(baseline.primary, 1);
    }
}
