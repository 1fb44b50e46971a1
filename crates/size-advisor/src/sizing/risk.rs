use super::calibration::Calibration;
use super::charts::{HeightPlacement, SizeChart};
use super::domain::{BmiAnalysis, EdgeCase, EdgeCaseKind, RiskLevel, Severity};
use super::mapper::{BaselineSize, BmiAdjustmentOutcome};
use super::policy::RiskPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub edge_cases: Vec<EdgeCase>,
}

impl RiskAssessment {
    pub fn has(&self, kind: EdgeCaseKind) -> bool {
        self.edge_cases.iter().any(|edge| edge.kind == kind)
    }
}

/// Collects edge cases per category and folds them into a risk level.
///
/// The level is the highest severity found, escalated to CRITICAL when the height is
/// far outside the chart or when two or more HIGH findings stack up.
#[derive(Debug, Clone, Default)]
pub struct RiskClassifier {
    policy: RiskPolicy,
}

impl RiskClassifier {
    pub fn new(policy: RiskPolicy) -> Self {
        Self { policy }
    }

    pub fn classify(
        &self,
        height_cm: f64,
        bmi: &BmiAnalysis,
        chart: &SizeChart,
        baseline: &BaselineSize,
        calibration: &Calibration,
    ) -> RiskAssessment {
        let mut edge_cases = Vec::new();
        let far_outside =
            baseline.placement.distance_outside_cm() > self.policy.critical_height_margin_cm;

        match baseline.placement {
            HeightPlacement::Within { .. } => {}
            HeightPlacement::BelowChart { by_cm, .. } => {
                edge_cases.push(EdgeCase {
                    kind: EdgeCaseKind::HeightOutOfRange,
                    severity: Severity::High,
                    message: format!(
                        "Height {height_cm:.0} cm is {by_cm:.0} cm below the smallest size ({}, from {:.0} cm).",
                        chart.label(0),
                        chart.height_floor()
                    ),
                });
            }
            HeightPlacement::AboveChart { by_cm, .. } => {
                edge_cases.push(EdgeCase {
                    kind: EdgeCaseKind::HeightOutOfRange,
                    severity: Severity::High,
                    message: format!(
                        "Height {height_cm:.0} cm is {:.0} cm beyond the largest size ({}, up to {:.0} cm).",
                        by_cm.max(0.0),
                        chart.label(chart.len() - 1),
                        chart.height_ceiling()
                    ),
                });
            }
        }

        if bmi.category.is_extreme() {
            edge_cases.push(EdgeCase {
                kind: EdgeCaseKind::BmiExtreme,
                severity: Severity::Medium,
                message: format!(
                    "BMI {:.1} ({}) is outside the range size charts are designed for.",
                    bmi.bmi,
                    bmi.category.label()
                ),
            });
        }

        if let BmiAdjustmentOutcome::Blocked { steps } = baseline.adjustment {
            let direction = if steps > 0 { "larger" } else { "smaller" };
            edge_cases.push(EdgeCase {
                kind: EdgeCaseKind::BmiSizeConflict,
                severity: Severity::Medium,
                message: format!(
                    "Build suggests a size {direction} than {}, but the chart has none.",
                    chart.label(baseline.height_row)
                ),
            });
        }

        match calibration {
            Calibration::Applied(outcome) if outcome.estimated_row != baseline.primary => {
                let severity = if outcome.agreement_score < self.policy.disagreement_below {
                    Severity::High
                } else {
                    Severity::Medium
                };
                edge_cases.push(EdgeCase {
                    kind: EdgeCaseKind::CalibrationDisagreement,
                    severity,
                    message: format!(
                        "Your reference garment points to {} while height and weight point to {}; the recommendation moved to {}.",
                        chart.label(outcome.estimated_row),
                        chart.label(baseline.primary),
                        chart.label(outcome.adjusted_primary)
                    ),
                });
            }
            Calibration::Unavailable => edge_cases.push(EdgeCase {
                kind: EdgeCaseKind::CalibrationUnavailable,
                severity: Severity::Low,
                message: "This chart has no garment measurements, so your reference garment could not be compared.".to_string(),
            }),
            Calibration::Applied(_) | Calibration::NotRequested => {}
        }

        if baseline.placement.is_within() {
            if let Some(boundary) = chart
                .boundaries()
                .filter(|boundary| (height_cm - boundary).abs() <= self.policy.boundary_proximity_cm)
                .min_by(|a, b| (height_cm - a).abs().total_cmp(&(height_cm - b).abs()))
            {
                edge_cases.push(EdgeCase {
                    kind: EdgeCaseKind::BoundaryProximity,
                    severity: Severity::Low,
                    message: format!(
                        "Height {height_cm:.0} cm is within {:.0} cm of the {boundary:.0} cm size boundary.",
                        self.policy.boundary_proximity_cm
                    ),
                });
            }
        }

        let high_findings = edge_cases
            .iter()
            .filter(|edge| edge.severity == Severity::High)
            .count();
        let level = if far_outside || high_findings >= 2 {
            RiskLevel::Critical
        } else {
            edge_cases
                .iter()
                .map(|edge| RiskLevel::from(edge.severity))
                .max()
                .unwrap_or(RiskLevel::Low)
        };

        RiskAssessment { level, edge_cases }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::calibration::ReferenceGarmentCalibrator;
    use crate::sizing::domain::{BmiCategory, FitFeeling, FitPreference};
    use crate::sizing::mapper::map_baseline;
    use crate::sizing::tests::common::{bmi, jersey, three_size_chart};

    fn assess(height_cm: f64, category: BmiCategory, calibration: Option<(f64, f64, FitFeeling)>) -> RiskAssessment {
        let chart = three_size_chart();
        let bmi = bmi(category);
        let baseline = map_baseline(height_cm, &bmi, &chart, FitPreference::Regular);
        let jersey = calibration.map(|(length, width, feeling)| jersey(length, width, feeling));
        let calibration =
            ReferenceGarmentCalibrator::default().calibrate(jersey.as_ref(), &baseline, &chart);
        RiskClassifier::default().classify(height_cm, &bmi, &chart, &baseline, &calibration)
    }

    #[test]
    fn clean_input_is_low_risk() {
        let assessment = assess(146.0, BmiCategory::Normal, None);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(assessment.edge_cases.is_empty());
    }

    #[test]
    fn height_near_boundary_is_flagged_low() {
        let assessment = assess(141.5, BmiCategory::Normal, None);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(assessment.has(EdgeCaseKind::BoundaryProximity));
    }

    #[test]
    fn extreme_bmi_is_medium() {
        let assessment = assess(146.0, BmiCategory::Underweight, None);
        assert_eq!(assessment.level, RiskLevel::Medium);
        assert!(assessment.has(EdgeCaseKind::BmiExtreme));
    }

    #[test]
    fn blocked_shift_reports_size_conflict() {
        let assessment = assess(158.0, BmiCategory::Obese, None);
        assert!(assessment.has(EdgeCaseKind::BmiSizeConflict));
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn height_slightly_outside_is_high_and_far_outside_is_critical() {
        let near = assess(166.0, BmiCategory::Normal, None);
        assert!(near.has(EdgeCaseKind::HeightOutOfRange));
        assert!(!near.has(EdgeCaseKind::BoundaryProximity));
        assert_eq!(near.level, RiskLevel::High);

        let far = assess(190.0, BmiCategory::Normal, None);
        assert_eq!(far.level, RiskLevel::Critical);
    }

    #[test]
    fn calibration_disagreement_is_high() {
        let assessment = assess(130.0, BmiCategory::Normal, Some((63.0, 48.0, FitFeeling::Perfect)));
        assert!(assessment.has(EdgeCaseKind::CalibrationDisagreement));
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn adjacent_size_disagreement_is_medium() {
        let assessment = assess(146.0, BmiCategory::Normal, Some((58.5, 44.5, FitFeeling::Tight)));
        let edge = assessment
            .edge_cases
            .iter()
            .find(|edge| edge.kind == EdgeCaseKind::CalibrationDisagreement)
            .expect("one-size disagreement reported");
        assert_eq!(edge.severity, Severity::Medium);
        assert!(edge.message.contains("points to L"));
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn stacked_high_findings_escalate_to_critical() {
        let assessment = assess(120.0, BmiCategory::Normal, Some((63.0, 48.0, FitFeeling::Perfect)));
        assert!(assessment.has(EdgeCaseKind::HeightOutOfRange));
        assert!(assessment.has(EdgeCaseKind::CalibrationDisagreement));
        assert_eq!(assessment.level, RiskLevel::Critical);
    }

    #[test]
    fn agreeing_calibration_adds_no_edge_case() {
        let assessment = assess(146.0, BmiCategory::Normal, Some((58.0, 44.0, FitFeeling::Perfect)));
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(assessment.edge_cases.is_empty());
    }
}
