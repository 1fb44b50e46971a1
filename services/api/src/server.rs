use crate::cli::ServeArgs;
use crate::infra::{load_catalog, load_policy, AppState};
use crate::routes::with_sizing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use size_advisor::config::AppConfig;
use size_advisor::error::AppError;
use size_advisor::sizing::{ChartStore, SizeAdvisor};
use size_advisor::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let policy = load_policy(config.sizing.policy_path.as_deref())?;
    let charts = Arc::new(ChartStore::new(load_catalog(
        config.sizing.chart_path.as_deref(),
    )?));
    let advisor = Arc::new(SizeAdvisor::new(charts.clone(), policy));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        charts,
        chart_path: config.sizing.chart_path.clone(),
    };

    let app = with_sizing_routes(advisor)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "size advisor ready");

    axum::serve(listener, app).await?;
    Ok(())
}
