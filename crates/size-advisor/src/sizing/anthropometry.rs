use super::domain::{BmiAnalysis, BmiCategory};
use super::policy::BmiThresholds;

/// Derives BMI and its category from height and weight.
#[derive(Debug, Clone, Default)]
pub struct AnthropometricAnalyzer {
    thresholds: BmiThresholds,
}

impl AnthropometricAnalyzer {
    pub fn new(thresholds: BmiThresholds) -> Self {
        Self { thresholds }
    }

    pub fn analyze(&self, height_cm: f64, weight_kg: f64) -> BmiAnalysis {
        let height_m = height_cm / 100.0;
        let bmi = weight_kg / (height_m * height_m);
        let rounded = (bmi * 10.0).round() / 10.0;
        let category = self.thresholds.categorize(rounded);

        BmiAnalysis {
            bmi: rounded,
            category,
            message: describe(rounded, category),
        }
    }
}

fn describe(bmi: f64, category: BmiCategory) -> String {
    match category {
        BmiCategory::Normal => format!("BMI {bmi:.1} is in the normal range for this height."),
        BmiCategory::Underweight => {
            format!("BMI {bmi:.1} indicates a slimmer build than the chart assumes.")
        }
        BmiCategory::Overweight => {
            format!("BMI {bmi:.1} indicates a sturdier build than the chart assumes.")
        }
        BmiCategory::Obese => {
            format!("BMI {bmi:.1} is well above the range the chart is built around.")
        }
    }
}
