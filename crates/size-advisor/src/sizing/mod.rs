//! Size recommendation engine.
//!
//! A request passes the `SizingGuard`, then runs through chart lookup, BMI analysis,
//! height/BMI mapping, optional reference-garment calibration, risk classification and
//! confidence scoring before the composer builds the single `SizeRecommendation`.
//! Only validation failures and missing charts abort a request; every other
//! irregularity is reported as an `EdgeCase` on a successful answer.

pub mod anthropometry;
pub mod calibration;
pub mod charts;
pub mod composer;
pub mod confidence;
pub mod domain;
pub mod guard;
pub mod mapper;
mod normalizer;
pub mod policy;
pub mod risk;
pub mod router;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::{debug, warn};

pub use anthropometry::AnthropometricAnalyzer;
pub use calibration::{Calibration, CalibrationOutcome, ReferenceGarmentCalibrator};
pub use charts::{
    ChartCatalog, ChartLoadError, ChartNotFound, ChartSource, ChartStore, HeightPlacement,
    SizeChart, SizeChartRepository,
};
pub use composer::{action_for, RecommendationComposer};
pub use confidence::ConfidenceScorer;
pub use domain::{
    BmiAnalysis, BmiCategory, ChartKey, EdgeCase, EdgeCaseKind, FavoriteJersey, FitFeeling,
    FitPreference, Gender, ProductType, RecommendedAction, RiskLevel, Severity, SizeLabel,
    SizeRecommendation, SizingInput, SportId,
};
pub use guard::{FavoriteJerseyRequest, SizingGuard, SizingRequest, ValidationError};
pub use policy::{PolicyError, SizingPolicy};
pub use risk::{RiskAssessment, RiskClassifier};
pub use router::sizing_router;

use composer::CompositionInputs;

/// Hard failures; everything softer is folded into the recommendation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SizingError {
    #[error("invalid sizing request: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    ChartNotFound(#[from] ChartNotFound),
}

/// Stateless engine over a chart repository. Safe to share across threads; each call
/// reads one chart snapshot and allocates only its own output.
pub struct SizeAdvisor<R> {
    repository: Arc<R>,
    guard: SizingGuard,
    analyzer: AnthropometricAnalyzer,
    calibrator: ReferenceGarmentCalibrator,
    classifier: RiskClassifier,
    scorer: ConfidenceScorer,
    composer: RecommendationComposer,
}

impl<R> SizeAdvisor<R>
where
    R: SizeChartRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: SizingPolicy) -> Self {
        let SizingPolicy {
            validation,
            bmi,
            risk,
            confidence,
            calibration,
        } = policy;

        Self {
            repository,
            guard: SizingGuard::new(validation),
            analyzer: AnthropometricAnalyzer::new(bmi),
            calibrator: ReferenceGarmentCalibrator::new(calibration),
            classifier: RiskClassifier::new(risk),
            scorer: ConfidenceScorer::new(confidence),
            composer: RecommendationComposer,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Validate a wire request and recommend a size for it.
    pub fn recommend(&self, request: SizingRequest) -> Result<SizeRecommendation, SizingError> {
        let input = self.guard.input_from_request(request)?;
        self.recommend_input(&input)
    }

    /// Recommend a size for an already validated input.
    pub fn recommend_input(&self, input: &SizingInput) -> Result<SizeRecommendation, SizingError> {
        let key = input.chart_key();
        let chart = self.repository.lookup(&key).map_err(|err| {
            warn!(chart = %key, "no size chart for request");
            err
        })?;

        let bmi = self.analyzer.analyze(input.height_cm, input.weight_kg);
        let baseline = mapper::map_baseline(input.height_cm, &bmi, &chart, input.fit_preference);
        let calibration =
            self.calibrator
                .calibrate(input.favorite_jersey.as_ref(), &baseline, &chart);
        let risk = self
            .classifier
            .classify(input.height_cm, &bmi, &chart, &baseline, &calibration);
        let confidence = self.scorer.score(risk.level, calibration.agreement_score());

        let recommendation = self.composer.compose(CompositionInputs {
            input,
            chart: &chart,
            bmi: &bmi,
            baseline: &baseline,
            calibration: &calibration,
            risk,
            confidence,
        });

        debug!(
            chart = %key,
            primary = %recommendation.primary,
            risk = recommendation.risk_level.label(),
            action = recommendation.recommended_action.label(),
            confidence = recommendation.confidence,
            "size recommendation composed"
        );

        Ok(recommendation)
    }
}
