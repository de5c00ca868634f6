//! canvas-layout - Entry Point
//!
//! Runs one layout pass over documents on disk and prints the result.

use canvas_layout::config::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
};
use canvas_layout::document::{load_data, load_instances, load_template};
use canvas_layout::layout::MeasurementRecord;
use canvas_layout::model::PaginationSettings;
use canvas_layout::{CanvasEngine, CanvasLayout, EngineOptions, TextMetricsOracle};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Lay out a statblock document and print its pages as JSON
#[derive(Parser, Debug)]
#[command(name = "canvas-layout")]
#[command(version)]
#[command(about = "Lay out a statblock document and print its pages as JSON")]
pub struct Args {
    /// Template JSON file
    #[arg(short, long)]
    pub template: PathBuf,

    /// Component instances JSON file (template defaults if omitted)
    #[arg(short, long)]
    pub instances: Option<PathBuf>,

    /// Data sources JSON file ({"statblock": ..., "custom": ...})
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Display scale of the visible layer
    #[arg(long)]
    pub scale: Option<f64>,

    /// Override the template's column count
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub columns: Option<u32>,

    /// Edit lock idle window in milliseconds
    #[arg(long)]
    pub idle_ms: Option<u64>,

    /// Include per-item measurement records in the output
    #[arg(long)]
    pub measurements: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Log placement decisions at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    pagination: PaginationSettings,
    layout: &'a CanvasLayout,
    issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    measurements: Option<Vec<MeasurementRecord>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = load_config_with_precedence(args.config.clone())?;
        let merged = merge_config(config_file);
        let with_env = apply_env_overrides(merged)?;
        apply_cli_overrides(with_env, args.scale, args.columns, args.idle_ms)
    };

    canvas_layout::logging::init(&config.log_file_path, args.verbose)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let template = load_template(&args.template)?;
    let data = match &args.data {
        Some(path) => load_data(path)?,
        None => Default::default(),
    };
    let mut engine = match &args.instances {
        Some(path) => CanvasEngine::with_instances(template, load_instances(path)?, data),
        None => CanvasEngine::new(template, data),
    }
    .with_options(EngineOptions::from(&config));
    if let Some(columns) = config.column_count {
        engine.set_column_count(columns);
    }

    let oracle = TextMetricsOracle::new(config.font_metrics);
    engine.run_pass(&oracle);

    let report = Report {
        pagination: engine.page_variables().pagination,
        layout: engine.layout(),
        issues: engine.layout().issues.iter().map(ToString::to_string).collect(),
        measurements: args.measurements.then(|| engine.measurements().records()),
    };
    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{output}");

    Ok(())
}
