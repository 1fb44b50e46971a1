//! Reference size charts: validated at load time, served read-only afterwards.

mod builtin;
mod parser;

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::{ChartKey, SizeChartEntry, SizeLabel};

pub use builtin::BUILTIN_CHART_CSV;

/// Tolerance when checking that adjacent height bands meet.
const BOUNDARY_EPSILON_CM: f64 = 1e-6;

/// Ordered, contiguous size rows for a single chart key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeChart {
    key: ChartKey,
    entries: Vec<SizeChartEntry>,
}

impl SizeChart {
    /// Sort rows by `height_min_cm` and reject charts whose bands overlap, leave gaps,
    /// or repeat a size label.
    pub fn new(key: ChartKey, mut entries: Vec<SizeChartEntry>) -> Result<Self, ChartLoadError> {
        if entries.is_empty() {
            return Err(ChartLoadError::InvalidChart {
                key,
                reason: "chart has no size rows".to_string(),
            });
        }

        entries.sort_by(|a, b| a.height_min_cm.total_cmp(&b.height_min_cm));

        for entry in &entries {
            if !(entry.height_min_cm.is_finite()
                && entry.height_max_cm.is_finite()
                && entry.height_min_cm < entry.height_max_cm)
            {
                return Err(ChartLoadError::InvalidChart {
                    key,
                    reason: format!(
                        "size {} has an empty or invalid height band",
                        entry.size
                    ),
                });
            }
        }

        for pair in entries.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if (lower.height_max_cm - upper.height_min_cm).abs() > BOUNDARY_EPSILON_CM {
                let reason = if lower.height_max_cm > upper.height_min_cm {
                    format!("sizes {} and {} overlap", lower.size, upper.size)
                } else {
                    format!("gap between sizes {} and {}", lower.size, upper.size)
                };
                return Err(ChartLoadError::InvalidChart { key, reason });
            }
        }

        if let Some(repeated) = entries
            .iter()
            .enumerate()
            .find(|(idx, entry)| entries[..*idx].iter().any(|seen| seen.size == entry.size))
            .map(|(_, entry)| entry.size.clone())
        {
            return Err(ChartLoadError::InvalidChart {
                key,
                reason: format!("size {repeated} appears more than once"),
            });
        }

        Ok(Self { key, entries })
    }

    pub fn key(&self) -> &ChartKey {
        &self.key
    }

    pub fn entries(&self) -> &[SizeChartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> &SizeChartEntry {
        &self.entries[index]
    }

    pub fn label(&self, index: usize) -> &SizeLabel {
        &self.entries[index].size
    }

    pub fn height_floor(&self) -> f64 {
        self.entries[0].height_min_cm
    }

    pub fn height_ceiling(&self) -> f64 {
        self.entries[self.entries.len() - 1].height_max_cm
    }

    /// Every band edge, lowest first: the floor plus each row's upper bound.
    pub fn boundaries(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::once(self.height_floor()).chain(self.entries.iter().map(|e| e.height_max_cm))
    }

    /// Move `delta` sizes from `index`, or `None` when that leaves the chart.
    pub fn step(&self, index: usize, delta: isize) -> Option<usize> {
        let target = index as isize + delta;
        if target < 0 || target as usize >= self.entries.len() {
            None
        } else {
            Some(target as usize)
        }
    }

    /// Like `step`, but stops at the smallest or largest size.
    pub fn step_clamped(&self, index: usize, delta: isize) -> usize {
        let last = self.entries.len() as isize - 1;
        (index as isize + delta).clamp(0, last) as usize
    }

    pub fn has_garment_measurements(&self) -> bool {
        self.entries.iter().all(|entry| entry.garment.is_some())
    }

    /// Place a height against the chart. Bands are half-open, so a height sitting on a
    /// boundary belongs to the larger size.
    pub fn locate(&self, height_cm: f64) -> HeightPlacement {
        if height_cm < self.height_floor() {
            return HeightPlacement::BelowChart {
                row: 0,
                by_cm: self.height_floor() - height_cm,
            };
        }
        if height_cm >= self.height_ceiling() {
            return HeightPlacement::AboveChart {
                row: self.entries.len() - 1,
                by_cm: height_cm - self.height_ceiling(),
            };
        }

        let row = self
            .entries
            .iter()
            .position(|entry| entry.contains(height_cm))
            .unwrap_or(self.entries.len() - 1);
        HeightPlacement::Within { row }
    }
}

/// Where a height falls relative to a chart's rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeightPlacement {
    Within { row: usize },
    BelowChart { row: usize, by_cm: f64 },
    AboveChart { row: usize, by_cm: f64 },
}

impl HeightPlacement {
    pub fn row(&self) -> usize {
        match *self {
            HeightPlacement::Within { row }
            | HeightPlacement::BelowChart { row, .. }
            | HeightPlacement::AboveChart { row, .. } => row,
        }
    }

    pub fn is_within(&self) -> bool {
        matches!(self, HeightPlacement::Within { .. })
    }

    pub fn distance_outside_cm(&self) -> f64 {
        match *self {
            HeightPlacement::Within { .. } => 0.0,
            HeightPlacement::BelowChart { by_cm, .. } | HeightPlacement::AboveChart { by_cm, .. } => {
                by_cm
            }
        }
    }
}

/// Read access to reference charts.
pub trait SizeChartRepository: Send + Sync {
    fn lookup(&self, key: &ChartKey) -> Result<Arc<SizeChart>, ChartNotFound>;
    fn keys(&self) -> Vec<ChartKey>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no size chart for {key}")]
pub struct ChartNotFound {
    pub key: ChartKey,
}

/// Failure while loading or validating chart data.
#[derive(Debug, thiserror::Error)]
pub enum ChartLoadError {
    #[error("failed to read size chart data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid size chart CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("size chart row on line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
    #[error("size chart {key}: {reason}")]
    InvalidChart { key: ChartKey, reason: String },
    #[error("size chart {key} is defined more than once")]
    DuplicateChart { key: ChartKey },
    #[error("size chart data contains no charts")]
    Empty,
    #[error("no size chart file configured for reload")]
    NoSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum ChartSource {
    Builtin,
    File(PathBuf),
    Inline,
}

impl fmt::Display for ChartSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartSource::Builtin => f.write_str("built-in charts"),
            ChartSource::File(path) => write!(f, "{}", path.display()),
            ChartSource::Inline => f.write_str("inline data"),
        }
    }
}

/// Immutable set of charts loaded together.
#[derive(Debug, Clone)]
pub struct ChartCatalog {
    charts: BTreeMap<ChartKey, Arc<SizeChart>>,
    source: ChartSource,
    loaded_at: DateTime<Utc>,
}

impl ChartCatalog {
    pub fn from_charts(charts: Vec<SizeChart>, source: ChartSource) -> Result<Self, ChartLoadError> {
        if charts.is_empty() {
            return Err(ChartLoadError::Empty);
        }

        let mut by_key = BTreeMap::new();
        for chart in charts {
            let key = chart.key().clone();
            if by_key.insert(key.clone(), Arc::new(chart)).is_some() {
                return Err(ChartLoadError::DuplicateChart { key });
            }
        }

        Ok(Self {
            charts: by_key,
            source,
            loaded_at: Utc::now(),
        })
    }

    pub fn from_reader<R: Read>(reader: R, source: ChartSource) -> Result<Self, ChartLoadError> {
        let charts = parser::parse_charts(reader)?;
        Self::from_charts(charts, source)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ChartLoadError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let catalog = Self::from_reader(file, ChartSource::File(path.to_path_buf()))?;
        info!(source = %catalog.source, charts = catalog.len(), "size charts loaded");
        Ok(catalog)
    }

    pub fn builtin() -> Result<Self, ChartLoadError> {
        Self::from_reader(BUILTIN_CHART_CSV.as_bytes(), ChartSource::Builtin)
    }

    /// Load from `path` when given, otherwise fall back to the built-in charts.
    pub fn from_optional_path(path: Option<&Path>) -> Result<Self, ChartLoadError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    pub fn get(&self, key: &ChartKey) -> Option<&Arc<SizeChart>> {
        self.charts.get(key)
    }

    pub fn charts(&self) -> impl Iterator<Item = &Arc<SizeChart>> {
        self.charts.values()
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn source(&self) -> &ChartSource {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl SizeChartRepository for ChartCatalog {
    fn lookup(&self, key: &ChartKey) -> Result<Arc<SizeChart>, ChartNotFound> {
        self.charts
            .get(key)
            .cloned()
            .ok_or_else(|| ChartNotFound { key: key.clone() })
    }

    fn keys(&self) -> Vec<ChartKey> {
        self.charts.keys().cloned().collect()
    }
}

/// Shared handle to the current catalog. Reloads build a complete catalog first and then
/// swap the `Arc`, so readers see either the old set or the new one.
#[derive(Debug)]
pub struct ChartStore {
    current: RwLock<Arc<ChartCatalog>>,
}

impl ChartStore {
    pub fn new(catalog: ChartCatalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<ChartCatalog> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install `catalog` and return the one it replaced.
    pub fn replace(&self, catalog: ChartCatalog) -> Arc<ChartCatalog> {
        let next = Arc::new(catalog);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Re-read `path`; on failure the current catalog stays in place.
    pub fn reload_from_path(&self, path: &Path) -> Result<Arc<ChartCatalog>, ChartLoadError> {
        let catalog = Arc::new(ChartCatalog::from_path(path)?);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&catalog);
        Ok(catalog)
    }
}

impl SizeChartRepository for ChartStore {
    fn lookup(&self, key: &ChartKey) -> Result<Arc<SizeChart>, ChartNotFound> {
        self.snapshot().lookup(key)
    }

    fn keys(&self) -> Vec<ChartKey> {
        self.snapshot().keys()
    }
}
