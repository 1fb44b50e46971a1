use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::charts::{SizeChart, SizeChartRepository};
use super::domain::{ChartKey, Gender, ProductType, SizeLabel, SportId};
use super::guard::SizingRequest;
use super::{SizeAdvisor, SizingError};

/// Router exposing the recommendation endpoint and read-only chart views.
pub fn sizing_router<R>(advisor: Arc<SizeAdvisor<R>>) -> Router
where
    R: SizeChartRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/sizing/recommendations",
            post(recommend_handler::<R>),
        )
        .route("/api/v1/sizing/charts", get(chart_index_handler::<R>))
        .route(
            "/api/v1/sizing/charts/:sport/:gender/:product_type",
            get(chart_detail_handler::<R>),
        )
        .with_state(advisor)
}

/// Compact description of a chart for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSummaryView {
    pub key: ChartKey,
    pub sizes: Vec<SizeLabel>,
    pub height_min_cm: f64,
    pub height_max_cm: f64,
    pub has_garment_measurements: bool,
}

impl From<&SizeChart> for ChartSummaryView {
    fn from(chart: &SizeChart) -> Self {
        Self {
            key: chart.key().clone(),
            sizes: chart.entries().iter().map(|entry| entry.size.clone()).collect(),
            height_min_cm: chart.height_floor(),
            height_max_cm: chart.height_ceiling(),
            has_garment_measurements: chart.has_garment_measurements(),
        }
    }
}

pub(crate) async fn recommend_handler<R>(
    State(advisor): State<Arc<SizeAdvisor<R>>>,
    axum::Json(request): axum::Json<SizingRequest>,
) -> Response
where
    R: SizeChartRepository + 'static,
{
    match advisor.recommend(request) {
        Ok(recommendation) => (StatusCode::OK, axum::Json(recommendation)).into_response(),
        Err(error) => sizing_error_response(&error),
    }
}

pub(crate) async fn chart_index_handler<R>(State(advisor): State<Arc<SizeAdvisor<R>>>) -> Response
where
    R: SizeChartRepository + 'static,
{
    let repository = advisor.repository();
    let charts: Vec<ChartSummaryView> = repository
        .keys()
        .iter()
        .filter_map(|key| repository.lookup(key).ok())
        .map(|chart| ChartSummaryView::from(chart.as_ref()))
        .collect();

    (StatusCode::OK, axum::Json(json!({ "charts": charts }))).into_response()
}

pub(crate) async fn chart_detail_handler<R>(
    State(advisor): State<Arc<SizeAdvisor<R>>>,
    Path((sport, gender, product_type)): Path<(String, String, String)>,
) -> Response
where
    R: SizeChartRepository + 'static,
{
    let Some(gender) = Gender::parse(&gender) else {
        let payload = json!({
            "error": format!("gender has unsupported value '{gender}'"),
            "field": "gender",
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    };

    let key = ChartKey::new(SportId::new(&sport), gender, ProductType::new(&product_type));
    match advisor.repository().lookup(&key) {
        Ok(chart) => (StatusCode::OK, axum::Json(chart.as_ref())).into_response(),
        Err(not_found) => sizing_error_response(&SizingError::ChartNotFound(not_found)),
    }
}

/// JSON body and status for a hard sizing failure.
pub fn sizing_error_response(error: &SizingError) -> Response {
    match error {
        SizingError::Validation(validation) => {
            let payload = json!({
                "error": validation.to_string(),
                "field": validation.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        SizingError::ChartNotFound(not_found) => {
            let payload = json!({
                "error": not_found.to_string(),
                "chart": not_found.key,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
