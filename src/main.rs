mod app;
mod chart;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::Context;
use app::SolarDashApp;
use clap::Parser;
use eframe::egui;

use crate::chart::ReportCharts;
use crate::config::{Args, ViewConfig};
use crate::data::loader::load_report;
use crate::data::source::ReportSource;
use crate::state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.dump {
        return dump(&args);
    }

    let mut state = AppState::new(ViewConfig::from(args.layout));
    state.open(args.path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Solar Dash – Energy Report",
        options,
        Box::new(|_cc| Ok(Box::new(SolarDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the viewer: {e}"))
}

/// Headless mode: both chart specifications as JSON on stdout.
fn dump(args: &Args) -> anyhow::Result<()> {
    let source = ReportSource::File(args.path.clone());
    let series = load_report(&source).with_context(|| format!("loading {source}"))?;
    let charts = ReportCharts::build(&series);
    if charts.efficiency.is_empty() {
        log::warn!("{source} has no year-1 rows; charts are empty");
    }
    let json = serde_json::to_string_pretty(&charts).context("serializing charts")?;
    println!("{json}");
    Ok(())
}
