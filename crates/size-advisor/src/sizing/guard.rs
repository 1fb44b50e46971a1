use serde::{Deserialize, Serialize};

use super::domain::{
    FavoriteJersey, FitFeeling, FitPreference, Gender, ProductType, SizingInput, SportId,
};
use super::policy::{MeasurementRange, ValidationLimits};

/// Wire shape of a sizing request. Every field is optional here so that a missing value
/// is reported by name instead of as a generic deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizingRequest {
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub fit_preference: Option<String>,
    #[serde(default)]
    pub sport_id: Option<String>,
    #[serde(default)]
    pub product_type_slug: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub favorite_jersey: Option<FavoriteJerseyRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteJerseyRequest {
    #[serde(default)]
    pub length_cm: Option<f64>,
    #[serde(default)]
    pub width_cm: Option<f64>,
    #[serde(default)]
    pub fit_feeling: Option<String>,
}

/// Rejected request; `field()` names the offending wire field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be between {min} and {max} (found {found})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        found: f64,
    },
    #[error("{field} has unsupported value '{value}'")]
    Unsupported { field: &'static str, value: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotFinite { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Unsupported { field, .. } => field,
        }
    }
}

/// Gate producing `SizingInput` values; nothing downstream re-checks ranges.
#[derive(Debug, Clone, Default)]
pub struct SizingGuard {
    limits: ValidationLimits,
}

impl SizingGuard {
    pub fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    pub fn input_from_request(&self, request: SizingRequest) -> Result<SizingInput, ValidationError> {
        let height_cm = measurement("heightCm", request.height_cm, &self.limits.height_cm)?;
        let weight_kg = measurement("weightKg", request.weight_kg, &self.limits.weight_kg)?;

        let sport = SportId::new(&required_text("sportId", request.sport_id)?);
        if sport.as_str().is_empty() {
            return Err(ValidationError::Missing { field: "sportId" });
        }
        let product_type =
            ProductType::new(&required_text("productTypeSlug", request.product_type_slug)?);
        if product_type.as_str().is_empty() {
            return Err(ValidationError::Missing {
                field: "productTypeSlug",
            });
        }

        let gender_raw = required_text("gender", request.gender)?;
        let gender = Gender::parse(&gender_raw).ok_or(ValidationError::Unsupported {
            field: "gender",
            value: gender_raw,
        })?;

        let fit_preference = match request
            .fit_preference
            .filter(|value| !value.trim().is_empty())
        {
            Some(raw) => FitPreference::parse(&raw).ok_or(ValidationError::Unsupported {
                field: "fitPreference",
                value: raw,
            })?,
            None => FitPreference::default(),
        };

        let favorite_jersey = request
            .favorite_jersey
            .map(|jersey| self.favorite_jersey(jersey))
            .transpose()?;

        Ok(SizingInput {
            height_cm,
            weight_kg,
            fit_preference,
            sport,
            product_type,
            gender,
            favorite_jersey,
        })
    }

    fn favorite_jersey(&self, jersey: FavoriteJerseyRequest) -> Result<FavoriteJersey, ValidationError> {
        let length_cm = measurement(
            "favoriteJersey.lengthCm",
            jersey.length_cm,
            &self.limits.garment_length_cm,
        )?;
        let width_cm = measurement(
            "favoriteJersey.widthCm",
            jersey.width_cm,
            &self.limits.garment_width_cm,
        )?;
        let feeling_raw = required_text("favoriteJersey.fitFeeling", jersey.fit_feeling)?;
        let fit_feeling = FitFeeling::parse(&feeling_raw).ok_or(ValidationError::Unsupported {
            field: "favoriteJersey.fitFeeling",
            value: feeling_raw,
        })?;

        Ok(FavoriteJersey {
            length_cm,
            width_cm,
            fit_feeling,
        })
    }
}

fn measurement(
    field: &'static str,
    value: Option<f64>,
    range: &MeasurementRange,
) -> Result<f64, ValidationError> {
    let value = value.ok_or(ValidationError::Missing { field })?;
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if !range.contains(value) {
        return Err(ValidationError::OutOfRange {
            field,
            min: range.min,
            max: range.max,
            found: value,
        });
    }
    Ok(value)
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(ValidationError::Missing { field })
}
