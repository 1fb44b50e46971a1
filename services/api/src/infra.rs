use metrics_exporter_prometheus::PrometheusHandle;
use size_advisor::error::AppError;
use size_advisor::sizing::{ChartCatalog, ChartStore, SizingPolicy};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) charts: Arc<ChartStore>,
    /// File the reload endpoint re-reads; `None` when serving the built-in charts.
    pub(crate) chart_path: Option<PathBuf>,
}

pub(crate) fn load_catalog(path: Option<&Path>) -> Result<ChartCatalog, AppError> {
    let catalog = ChartCatalog::from_optional_path(path)?;
    if path.is_none() {
        info!(charts = catalog.len(), "using built-in size charts");
    }
    Ok(catalog)
}

pub(crate) fn load_policy(path: Option<&Path>) -> Result<SizingPolicy, AppError> {
    match path {
        Some(path) => {
            let policy = SizingPolicy::from_path(path)?;
            info!(path = %path.display(), "sizing policy loaded");
            Ok(policy)
        }
        None => Ok(SizingPolicy::default()),
    }
}
