use super::calibration::Calibration;
use super::charts::{HeightPlacement, SizeChart};
use super::domain::{
    BmiAnalysis, FitPreference, RecommendedAction, RiskLevel, Severity, SizeLabel,
    SizeRecommendation, SizingInput,
};
use super::mapper::{BaselineSize, BmiAdjustmentOutcome};
use super::risk::RiskAssessment;

/// Medium-risk recommendations at or above this confidence can be ordered with caveats.
pub const MEDIUM_RISK_ORDER_CONFIDENCE: u8 = 60;

/// Action policy: a total function of risk level and confidence.
pub fn action_for(risk: RiskLevel, confidence: u8) -> RecommendedAction {
    match risk {
        RiskLevel::Low => RecommendedAction::OrderNow,
        RiskLevel::Medium if confidence >= MEDIUM_RISK_ORDER_CONFIDENCE => {
            RecommendedAction::OrderWithInfo
        }
        RiskLevel::Medium => RecommendedAction::ContactRecommended,
        RiskLevel::High => RecommendedAction::ContactRecommended,
        RiskLevel::Critical => RecommendedAction::MustContact,
    }
}

/// Everything the composer reads; borrowed from the pipeline for one request.
pub struct CompositionInputs<'a> {
    pub input: &'a SizingInput,
    pub chart: &'a SizeChart,
    pub bmi: &'a BmiAnalysis,
    pub baseline: &'a BaselineSize,
    pub calibration: &'a Calibration,
    pub risk: RiskAssessment,
    pub confidence: u8,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationComposer;

impl RecommendationComposer {
    pub fn compose(&self, inputs: CompositionInputs<'_>) -> SizeRecommendation {
        let CompositionInputs {
            input,
            chart,
            bmi,
            baseline,
            calibration,
            risk,
            confidence,
        } = inputs;

        let (primary, alternate) = match calibration {
            Calibration::Applied(outcome) => (outcome.adjusted_primary, outcome.adjusted_alternate),
            Calibration::NotRequested | Calibration::Unavailable => {
                (baseline.primary, baseline.alternate)
            }
        };

        let action = action_for(risk.level, confidence);
        let primary_label = chart.label(primary).clone();
        let alternate_label = chart.label(alternate).clone();

        let title = format!("We recommend size {primary_label}");
        let subtitle = subtitle(action, input, &alternate_label, primary != alternate);
        let rationale = rationale(input, chart, bmi, baseline, calibration);

        let mut warnings: Vec<String> = risk
            .edge_cases
            .iter()
            .filter(|edge| edge.severity >= Severity::Medium)
            .map(|edge| edge.message.clone())
            .collect();
        if primary != alternate {
            warnings.push(format!(
                "You are between sizes; {alternate_label} is a reasonable alternative."
            ));
        }

        SizeRecommendation {
            title,
            subtitle,
            primary: primary_label,
            alternate: alternate_label,
            confidence,
            risk_level: risk.level,
            rationale,
            warnings,
            edge_cases: risk.edge_cases,
            bmi_analysis: Some(bmi.clone()),
            recommended_action: action,
            should_show_contact: action.requires_contact(),
        }
    }
}

fn subtitle(
    action: RecommendedAction,
    input: &SizingInput,
    alternate: &SizeLabel,
    between_sizes: bool,
) -> String {
    let product = format!("{} {}", input.sport, input.product_type);
    match action {
        RecommendedAction::OrderNow => format!("A confident match for your {product}."),
        RecommendedAction::OrderWithInfo if between_sizes => {
            format!("A good match for your {product}; check the notes before ordering or consider {alternate}.")
        }
        RecommendedAction::OrderWithInfo => {
            format!("A good match for your {product}; check the notes before ordering.")
        }
        RecommendedAction::ContactRecommended => {
            format!("Our best estimate for your {product}; we suggest confirming with our team.")
        }
        RecommendedAction::MustContact => {
            format!("Your measurements fall outside our {product} chart; please contact us before ordering.")
        }
    }
}

fn rationale(
    input: &SizingInput,
    chart: &SizeChart,
    bmi: &BmiAnalysis,
    baseline: &BaselineSize,
    calibration: &Calibration,
) -> Vec<String> {
    let mut lines = Vec::new();
    let height_row = chart.entry(baseline.height_row);

    lines.push(match baseline.placement {
        HeightPlacement::Within { .. } => format!(
            "Height {:.0} cm falls in the {} range ({:.0}-{:.0} cm).",
            input.height_cm, height_row.size, height_row.height_min_cm, height_row.height_max_cm
        ),
        HeightPlacement::BelowChart { .. } => format!(
            "Height {:.0} cm is below the chart; starting from the smallest size, {}.",
            input.height_cm, height_row.size
        ),
        HeightPlacement::AboveChart { .. } => format!(
            "Height {:.0} cm is above the chart; starting from the largest size, {}.",
            input.height_cm, height_row.size
        ),
    });

    lines.push(match baseline.adjustment {
        BmiAdjustmentOutcome::NotNeeded => format!(
            "BMI {:.1} ({}) needs no size adjustment.",
            bmi.bmi,
            bmi.category.label()
        ),
        BmiAdjustmentOutcome::NoShift => format!(
            "BMI {:.1} ({}) does not change the size on this chart.",
            bmi.bmi,
            bmi.category.label()
        ),
        BmiAdjustmentOutcome::Applied { steps } => format!(
            "BMI {:.1} ({}) suggests one size {}: {}.",
            bmi.bmi,
            bmi.category.label(),
            if steps > 0 { "larger" } else { "smaller" },
            chart.label(chart.step_clamped(baseline.height_row, steps as isize))
        ),
        BmiAdjustmentOutcome::Blocked { steps } => format!(
            "BMI {:.1} ({}) suggests one size {}, but the chart has no such size.",
            bmi.bmi,
            bmi.category.label(),
            if steps > 0 { "larger" } else { "smaller" }
        ),
    });

    if baseline.preference_promoted {
        lines.push(format!(
            "{} fit preference: leading with {} over {}.",
            capitalize(input.fit_preference.label()),
            chart.label(baseline.primary),
            chart.label(baseline.alternate)
        ));
    } else if input.fit_preference != FitPreference::Regular {
        lines.push(format!(
            "{} fit preference noted; sizes follow the chart.",
            capitalize(input.fit_preference.label())
        ));
    }

    match calibration {
        Calibration::NotRequested => {}
        Calibration::Unavailable => lines.push(
            "Reference garment supplied, but this chart has no garment measurements to compare against."
                .to_string(),
        ),
        Calibration::Applied(outcome) => {
            let garment = chart.label(outcome.garment_row);
            let estimated = chart.label(outcome.estimated_row);
            let feeling = outcome.fit_feeling.label();
            if outcome.agreement_score >= 1.0 {
                lines.push(format!(
                    "Your reference garment measures like {garment} and fits {feeling}, which agrees with {estimated}."
                ));
            } else {
                lines.push(format!(
                    "Your reference garment measures like {garment} and fits {feeling}, pointing to {estimated}; recommendation moved one size to {}.",
                    chart.label(outcome.adjusted_primary)
                ));
            }
            if outcome.feeling_clamped {
                lines.push(format!(
                    "A {feeling} fit on {garment} would call for a size this chart does not offer."
                ));
            }
        }
    }

    lines
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_table_is_exhaustive() {
        for risk in RiskLevel::ALL {
            for confidence in 0..=100u8 {
                let expected = match risk {
                    RiskLevel::Low => RecommendedAction::OrderNow,
                    RiskLevel::Medium if confidence >= 60 => RecommendedAction::OrderWithInfo,
                    RiskLevel::Medium | RiskLevel::High => RecommendedAction::ContactRecommended,
                    RiskLevel::Critical => RecommendedAction::MustContact,
                };
                let action = action_for(risk, confidence);
                assert_eq!(action, expected, "risk {risk:?} confidence {confidence}");
                assert_eq!(
                    action.requires_contact(),
                    matches!(
                        expected,
                        RecommendedAction::ContactRecommended | RecommendedAction::MustContact
                    )
                );
            }
        }
    }

    #[test]
    fn medium_risk_threshold_is_inclusive() {
        assert_eq!(action_for(RiskLevel::Medium, 60), RecommendedAction::OrderWithInfo);
        assert_eq!(action_for(RiskLevel::Medium, 59), RecommendedAction::ContactRecommended);
    }

    #[test]
    fn capitalizes_labels() {
        assert_eq!(capitalize("relaxed"), "Relaxed");
        assert_eq!(capitalize(""), "");
    }
}
