use crate::infra::{load_catalog, load_policy};
use clap::Args;
use size_advisor::config::AppConfig;
use size_advisor::error::AppError;
use size_advisor::sizing::{
    ChartCatalog, FavoriteJerseyRequest, Severity, SizeAdvisor, SizeChartRepository,
    SizeRecommendation, SizingRequest,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Body height in centimetres
    #[arg(long)]
    pub(crate) height_cm: f64,
    /// Body weight in kilograms
    #[arg(long)]
    pub(crate) weight_kg: f64,
    /// Sport identifier, e.g. soccer
    #[arg(long)]
    pub(crate) sport: String,
    /// boys, girls, men, women or unisex
    #[arg(long)]
    pub(crate) gender: String,
    /// Product type slug, e.g. jersey
    #[arg(long)]
    pub(crate) product_type: String,
    /// slim, regular or relaxed (defaults to regular)
    #[arg(long)]
    pub(crate) fit_preference: Option<String>,
    /// Flat length of a garment you already own
    #[arg(long)]
    pub(crate) jersey_length_cm: Option<f64>,
    /// Flat chest width of a garment you already own
    #[arg(long)]
    pub(crate) jersey_width_cm: Option<f64>,
    /// How that garment fits: tight, perfect or loose
    #[arg(long)]
    pub(crate) jersey_fit: Option<String>,
    /// Size chart CSV to use instead of SIZE_CHART_PATH or the built-in charts
    #[arg(long)]
    pub(crate) charts: Option<PathBuf>,
    /// Print the recommendation as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ChartListArgs {
    /// Size chart CSV to list instead of SIZE_CHART_PATH or the built-in charts
    #[arg(long)]
    pub(crate) charts: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ChartCheckArgs {
    /// Size chart CSV file to validate
    pub(crate) path: PathBuf,
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let chart_path = args.charts.clone().or(config.sizing.chart_path);
    let catalog = load_catalog(chart_path.as_deref())?;
    let policy = load_policy(config.sizing.policy_path.as_deref())?;
    let advisor = SizeAdvisor::new(Arc::new(catalog), policy);

    let json = args.json;
    let recommendation = advisor.recommend(sizing_request(args))?;

    if json {
        match serde_json::to_string_pretty(&recommendation) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Recommendation payload unavailable: {err}"),
        }
    } else {
        render_recommendation(&recommendation);
    }

    Ok(())
}

pub(crate) fn sizing_request(args: RecommendArgs) -> SizingRequest {
    let RecommendArgs {
        height_cm,
        weight_kg,
        sport,
        gender,
        product_type,
        fit_preference,
        jersey_length_cm,
        jersey_width_cm,
        jersey_fit,
        ..
    } = args;

    let favorite_jersey =
        if jersey_length_cm.is_some() || jersey_width_cm.is_some() || jersey_fit.is_some() {
            Some(FavoriteJerseyRequest {
                length_cm: jersey_length_cm,
                width_cm: jersey_width_cm,
                fit_feeling: jersey_fit,
            })
        } else {
            None
        };

    SizingRequest {
        height_cm: Some(height_cm),
        weight_kg: Some(weight_kg),
        fit_preference,
        sport_id: Some(sport),
        product_type_slug: Some(product_type),
        gender: Some(gender),
        favorite_jersey,
    }
}

fn render_recommendation(recommendation: &SizeRecommendation) {
    println!("{}", recommendation.title);
    println!("{}", recommendation.subtitle);
    println!(
        "Primary: {}  Alternate: {}  Confidence: {}%  Risk: {}",
        recommendation.primary,
        recommendation.alternate,
        recommendation.confidence,
        recommendation.risk_level.label()
    );
    println!(
        "Next step: {}{}",
        recommendation.recommended_action.label(),
        if recommendation.should_show_contact {
            " (contact support)"
        } else {
            ""
        }
    );

    if let Some(bmi) = &recommendation.bmi_analysis {
        println!("BMI: {:.1} ({})", bmi.bmi, bmi.category.label());
    }

    println!("\nWhy this size");
    for line in &recommendation.rationale {
        println!("  - {line}");
    }

    if !recommendation.warnings.is_empty() {
        println!("\nWarnings");
        for warning in &recommendation.warnings {
            println!("  ! {warning}");
        }
    }

    if !recommendation.edge_cases.is_empty() {
        println!("\nEdge cases");
        for edge in &recommendation.edge_cases {
            println!(
                "  {:?} [{}]: {}",
                edge.kind,
                severity_label(edge.severity),
                edge.message
            );
        }
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "low",
        Severity::Medium => "medium",
        Severity::High => "high",
    }
}

pub(crate) fn run_chart_list(args: ChartListArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let chart_path = args.charts.or(config.sizing.chart_path);
    let catalog = load_catalog(chart_path.as_deref())?;
    render_catalog(&catalog);
    Ok(())
}

pub(crate) fn run_chart_check(args: ChartCheckArgs) -> Result<(), AppError> {
    let catalog = ChartCatalog::from_path(&args.path)?;
    println!("{}: {} chart(s) valid", args.path.display(), catalog.len());
    Ok(())
}

fn render_catalog(catalog: &ChartCatalog) {
    println!(
        "Size charts from {} (loaded {})",
        catalog.source(),
        catalog.loaded_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    for key in catalog.keys() {
        let Some(chart) = catalog.get(&key) else {
            continue;
        };
        let sizes: Vec<&str> = chart
            .entries()
            .iter()
            .map(|entry| entry.size.as_str())
            .collect();
        println!(
            "  {key}: {} ({:.0}-{:.0} cm){}",
            sizes.join(", "),
            chart.height_floor(),
            chart.height_ceiling(),
            if chart.has_garment_measurements() {
                ", garment measurements"
            } else {
                ""
            }
        );
    }
}
