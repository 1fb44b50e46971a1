use super::domain::RiskLevel;
use super::policy::ConfidencePolicy;

#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    policy: ConfidencePolicy,
}

impl ConfidenceScorer {
    pub fn new(policy: ConfidencePolicy) -> Self {
        Self { policy }
    }

    /// `agreement` is `Some` only when a reference garment was actually compared.
    pub fn score(&self, risk: RiskLevel, agreement: Option<f64>) -> u8 {
        let mut score = i16::from(self.policy.base_for(risk));

        if let Some(agreement) = agreement {
            if agreement >= self.policy.high_agreement_from {
                score += i16::from(self.policy.agreement_bonus);
            } else if agreement < self.policy.low_agreement_below {
                score -= i16::from(self.policy.disagreement_penalty);
            }
        }

        score.clamp(0, 100) as u8
    }
}
