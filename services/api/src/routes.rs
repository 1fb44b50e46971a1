use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use size_advisor::error::AppError;
use size_advisor::sizing::{
    sizing_router, ChartLoadError, ChartSource, SizeAdvisor, SizeChartRepository,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChartReloadResponse {
    pub(crate) charts: usize,
    pub(crate) source: ChartSource,
    pub(crate) loaded_at: DateTime<Utc>,
}

pub(crate) fn with_sizing_routes<R>(advisor: Arc<SizeAdvisor<R>>) -> axum::Router
where
    R: SizeChartRepository + 'static,
{
    sizing_router(advisor)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/sizing/charts/reload",
            axum::routing::post(reload_charts_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "charts": state.charts.snapshot().len() })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Re-read the configured chart file. A failed reload leaves the serving catalog untouched.
pub(crate) async fn reload_charts_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<ChartReloadResponse>, AppError> {
    let path = state.chart_path.as_deref().ok_or(ChartLoadError::NoSource)?;

    let catalog = state.charts.reload_from_path(path).map_err(|err| {
        warn!(path = %path.display(), error = %err, "size chart reload rejected");
        err
    })?;
    info!(charts = catalog.len(), "size charts reloaded");

    Ok(Json(ChartReloadResponse {
        charts: catalog.len(),
        source: catalog.source().clone(),
        loaded_at: catalog.loaded_at(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use size_advisor::sizing::{ChartCatalog, ChartStore, SizingPolicy};
    use std::path::PathBuf;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    const TWO_ROW_CHART: &str = "\
sport,gender,product_type,size,height_min_cm,height_max_cm,underweight_shift,overweight_shift,obese_shift,length_cm,width_cm
soccer,boys,jersey,S,120,140,0,1,1,,
soccer,boys,jersey,M,140,160,0,1,1,,
";

    fn app(chart_path: Option<PathBuf>, ready: bool) -> (axum::Router, Arc<ChartStore>) {
        let charts = Arc::new(ChartStore::new(ChartCatalog::builtin().expect("builtin charts")));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            charts: charts.clone(),
            chart_path,
        };
        let advisor = Arc::new(SizeAdvisor::new(charts.clone(), SizingPolicy::default()));
        (with_sizing_routes(advisor).layer(Extension(state)), charts)
    }

    fn temp_chart(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "size-advisor-api-{}-{name}.csv",
            std::process::id()
        ));
        std::fs::write(&path, contents).expect("write chart file");
        path
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn post(uri: &str) -> Request<Body> {
        Request::post(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_and_readiness_report_status() {
        let (router, _) = app(None, false);
        let response = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let (router, _) = app(None, true);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn reload_without_chart_file_is_a_conflict() {
        let (router, _) = app(None, true);
        let response = router
            .oneshot(post("/api/v1/sizing/charts/reload"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn reload_swaps_the_serving_catalog() {
        let path = temp_chart("reload", TWO_ROW_CHART);
        let (router, charts) = app(Some(path.clone()), true);
        assert!(charts.snapshot().len() > 1);

        let response = router
            .oneshot(post("/api/v1/sizing/charts/reload"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let payload = json_body(response).await;
        assert_eq!(payload["charts"], 1);
        assert_eq!(payload["source"]["kind"], "file");
        assert_eq!(charts.snapshot().len(), 1);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn broken_chart_file_keeps_previous_catalog() {
        let path = temp_chart("broken", "sport,gender\nsoccer,boys\n");
        let (router, charts) = app(Some(path.clone()), true);
        let before = charts.snapshot().len();

        let response = router
            .oneshot(post("/api/v1/sizing/charts/reload"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(charts.snapshot().len(), before);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn recommendations_are_served_next_to_operational_routes() {
        let (router, _) = app(None, true);
        let payload = json!({
            "heightCm": 165.0,
            "weightKg": 60.0,
            "sportId": "soccer",
            "productTypeSlug": "jersey",
            "gender": "boys"
        });
        let response = router
            .oneshot(
                Request::post("/api/v1/sizing/recommendations")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["primary"], "YXL");
    }
}
