use std::fmt;

use serde::{Deserialize, Serialize};

use super::normalizer::normalize_slug;

/// Sport identifier as used by the size charts (e.g. `soccer`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SportId(String);

impl SportId {
    pub fn new(value: &str) -> Self {
        Self(normalize_slug(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product type slug (e.g. `jersey`, `shorts`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductType(String);

impl ProductType {
    pub fn new(value: &str) -> Self {
        Self(normalize_slug(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Size-chart audience. Youth lines are the common case; adult lines share the same charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Boys,
    Girls,
    Men,
    Women,
    Unisex,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_slug(value).as_str() {
            "boys" | "boy" => Some(Self::Boys),
            "girls" | "girl" => Some(Self::Girls),
            "men" | "man" | "mens" => Some(Self::Men),
            "women" | "woman" | "womens" => Some(Self::Women),
            "unisex" => Some(Self::Unisex),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Gender::Boys => "boys",
            Gender::Girls => "girls",
            Gender::Men => "men",
            Gender::Women => "women",
            Gender::Unisex => "unisex",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Composite lookup key for a size chart, built once from normalized parts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartKey {
    pub sport: SportId,
    pub gender: Gender,
    pub product_type: ProductType,
}

impl ChartKey {
    pub fn new(sport: SportId, gender: Gender, product_type: ProductType) -> Self {
        Self {
            sport,
            gender,
            product_type,
        }
    }
}

impl fmt::Display for ChartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.sport, self.gender, self.product_type)
    }
}

/// How the buyer likes garments to sit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitPreference {
    Slim,
    #[default]
    Regular,
    Relaxed,
}

impl FitPreference {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_slug(value).as_str() {
            "slim" | "tight" | "fitted" => Some(Self::Slim),
            "regular" | "normal" | "standard" => Some(Self::Regular),
            "relaxed" | "loose" | "roomy" => Some(Self::Relaxed),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FitPreference::Slim => "slim",
            FitPreference::Regular => "regular",
            FitPreference::Relaxed => "relaxed",
        }
    }
}

/// Buyer's rating of a garment they already own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitFeeling {
    Tight,
    Perfect,
    Loose,
}

impl FitFeeling {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_slug(value).as_str() {
            "tight" | "small" | "too-small" => Some(Self::Tight),
            "perfect" | "good" | "just-right" => Some(Self::Perfect),
            "loose" | "big" | "too-big" => Some(Self::Loose),
            _ => None,
        }
    }

    /// Size steps from the garment's own size to the size that would fit.
    pub const fn size_offset(self) -> isize {
        match self {
            FitFeeling::Tight => 1,
            FitFeeling::Perfect => 0,
            FitFeeling::Loose => -1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FitFeeling::Tight => "tight",
            FitFeeling::Perfect => "perfect",
            FitFeeling::Loose => "loose",
        }
    }
}

/// Measurements of a garment the buyer already owns, laid flat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteJersey {
    pub length_cm: f64,
    pub width_cm: f64,
    pub fit_feeling: FitFeeling,
}

/// Validated request value. Only `SizingGuard` produces these from wire requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizingInput {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub fit_preference: FitPreference,
    pub sport: SportId,
    pub product_type: ProductType,
    pub gender: Gender,
    pub favorite_jersey: Option<FavoriteJersey>,
}

impl SizingInput {
    pub fn chart_key(&self) -> ChartKey {
        ChartKey::new(self.sport.clone(), self.gender, self.product_type.clone())
    }
}

/// Size label as printed on the garment (e.g. `YM`, `140`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeLabel(pub String);

impl SizeLabel {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Weight-for-height category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub const fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        }
    }

    pub const fn is_extreme(self) -> bool {
        matches!(self, BmiCategory::Underweight | BmiCategory::Obese)
    }
}

/// Size steps a chart row applies per BMI category. Normal build never shifts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BmiAdjustment {
    pub underweight: i8,
    pub overweight: i8,
    pub obese: i8,
}

impl BmiAdjustment {
    pub fn shift_for(&self, category: BmiCategory) -> i8 {
        let raw = match category {
            BmiCategory::Underweight => self.underweight,
            BmiCategory::Normal => 0,
            BmiCategory::Overweight => self.overweight,
            BmiCategory::Obese => self.obese,
        };
        raw.clamp(-1, 1)
    }
}

/// Flat garment measurements for a chart size, used to place a reference garment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentMeasurements {
    pub length_cm: f64,
    pub width_cm: f64,
}

/// One size row within a chart: the half-open height band `[min, max)` it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeChartEntry {
    pub size: SizeLabel,
    pub height_min_cm: f64,
    pub height_max_cm: f64,
    pub bmi_adjustment: BmiAdjustment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garment: Option<GarmentMeasurements>,
}

impl SizeChartEntry {
    pub fn contains(&self, height_cm: f64) -> bool {
        height_cm >= self.height_min_cm && height_cm < self.height_max_cm
    }
}

/// Derived biometric figures for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BmiAnalysis {
    pub bmi: f64,
    pub category: BmiCategory,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeCaseKind {
    HeightOutOfRange,
    BmiExtreme,
    BmiSizeConflict,
    CalibrationDisagreement,
    CalibrationUnavailable,
    BoundaryProximity,
}

/// Soft finding folded into a successful recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeCase {
    #[serde(rename = "type")]
    pub kind: EdgeCaseKind,
    pub severity: Severity,
    pub message: String,
}

/// How much the engine distrusts its own chart-based estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl From<Severity> for RiskLevel {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Low => RiskLevel::Low,
            Severity::Medium => RiskLevel::Medium,
            Severity::High => RiskLevel::High,
        }
    }
}

/// Next step offered to the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    OrderNow,
    OrderWithInfo,
    ContactRecommended,
    MustContact,
}

impl RecommendedAction {
    pub const fn requires_contact(self) -> bool {
        matches!(
            self,
            RecommendedAction::ContactRecommended | RecommendedAction::MustContact
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            RecommendedAction::OrderNow => "ORDER_NOW",
            RecommendedAction::OrderWithInfo => "ORDER_WITH_INFO",
            RecommendedAction::ContactRecommended => "CONTACT_RECOMMENDED",
            RecommendedAction::MustContact => "MUST_CONTACT",
        }
    }
}

/// The engine's sole output value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeRecommendation {
    pub title: String,
    pub subtitle: String,
    pub primary: SizeLabel,
    pub alternate: SizeLabel,
    pub confidence: u8,
    pub risk_level: RiskLevel,
    pub rationale: Vec<String>,
    pub warnings: Vec<String>,
    pub edge_cases: Vec<EdgeCase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi_analysis: Option<BmiAnalysis>,
    pub recommended_action: RecommendedAction,
    pub should_show_contact: bool,
}
