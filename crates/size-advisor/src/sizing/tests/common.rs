use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::sizing::charts::{ChartCatalog, ChartSource, SizeChart};
use crate::sizing::domain::{
    BmiAdjustment, BmiAnalysis, BmiCategory, ChartKey, FavoriteJersey, FitFeeling,
    GarmentMeasurements, Gender, ProductType, SizeChartEntry, SizeLabel, SportId,
};
use crate::sizing::guard::{FavoriteJerseyRequest, SizingRequest};
use crate::sizing::policy::SizingPolicy;
use crate::sizing::SizeAdvisor;

pub(crate) fn bmi(category: BmiCategory) -> BmiAnalysis {
    let bmi = match category {
        BmiCategory::Underweight => 16.0,
        BmiCategory::Normal => 21.0,
        BmiCategory::Overweight => 27.0,
        BmiCategory::Obese => 33.0,
    };
    BmiAnalysis {
        bmi,
        category,
        message: format!("synthetic {} build", category.label()),
    }
}

pub(crate) fn jersey(length_cm: f64, width_cm: f64, fit_feeling: FitFeeling) -> FavoriteJersey {
    FavoriteJersey {
        length_cm,
        width_cm,
        fit_feeling,
    }
}

fn entry(size: &str, min: f64, max: f64, garment: Option<(f64, f64)>) -> SizeChartEntry {
    SizeChartEntry {
        size: SizeLabel(size.to_string()),
        height_min_cm: min,
        height_max_cm: max,
        bmi_adjustment: BmiAdjustment {
            underweight: -1,
            overweight: 1,
            obese: 1,
        },
        garment: garment.map(|(length_cm, width_cm)| GarmentMeasurements {
            length_cm,
            width_cm,
        }),
    }
}

pub(crate) fn test_key() -> ChartKey {
    ChartKey::new(SportId::new("soccer"), Gender::Boys, ProductType::new("jersey"))
}

/// S [128, 140), M [140, 152), L [152, 164) with garment measurements.
pub(crate) fn three_size_chart() -> SizeChart {
    SizeChart::new(
        test_key(),
        vec![
            entry("S", 128.0, 140.0, Some((54.0, 41.0))),
            entry("M", 140.0, 152.0, Some((58.0, 44.0))),
            entry("L", 152.0, 164.0, Some((62.0, 47.0))),
        ],
    )
    .expect("synthetic chart is valid")
}

/// Same bands as `three_size_chart`, keyed as shorts and without garment measurements.
pub(crate) fn shorts_chart() -> SizeChart {
    SizeChart::new(
        ChartKey::new(SportId::new("soccer"), Gender::Boys, ProductType::new("shorts")),
        vec![
            entry("S", 128.0, 140.0, None),
            entry("M", 140.0, 152.0, None),
            entry("L", 152.0, 164.0, None),
        ],
    )
    .expect("synthetic chart is valid")
}

pub(crate) fn synthetic_catalog() -> ChartCatalog {
    ChartCatalog::from_charts(vec![three_size_chart(), shorts_chart()], ChartSource::Inline)
        .expect("synthetic catalog is valid")
}

pub(crate) fn advisor() -> SizeAdvisor<ChartCatalog> {
    SizeAdvisor::new(Arc::new(synthetic_catalog()), SizingPolicy::default())
}

pub(crate) fn builtin_advisor() -> SizeAdvisor<ChartCatalog> {
    SizeAdvisor::new(
        Arc::new(ChartCatalog::builtin().expect("builtin charts load")),
        SizingPolicy::default(),
    )
}

pub(crate) fn request(height_cm: f64, weight_kg: f64) -> SizingRequest {
    SizingRequest {
        height_cm: Some(height_cm),
        weight_kg: Some(weight_kg),
        fit_preference: Some("regular".to_string()),
        sport_id: Some("soccer".to_string()),
        product_type_slug: Some("jersey".to_string()),
        gender: Some("boys".to_string()),
        favorite_jersey: None,
    }
}

pub(crate) fn with_jersey(
    mut request: SizingRequest,
    length_cm: f64,
    width_cm: f64,
    fit_feeling: &str,
) -> SizingRequest {
    request.favorite_jersey = Some(FavoriteJerseyRequest {
        length_cm: Some(length_cm),
        width_cm: Some(width_cm),
        fit_feeling: Some(fit_feeling.to_string()),
    });
    request
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
