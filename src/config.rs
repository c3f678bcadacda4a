use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Report the installer hands out; read from the working directory by default.
pub const DEFAULT_REPORT: &str = "dimensionamento.xlsx";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(
    name = "solar-dash",
    version,
    about = "Energy efficiency and savings charts from a solar sizing report"
)]
pub struct Args {
    /// Sizing report (.xlsx, .xls, .ods or .csv)
    #[arg(default_value = DEFAULT_REPORT)]
    pub path: PathBuf,

    /// Page layout
    #[arg(long, value_enum, default_value_t = Layout::Wide)]
    pub layout: Layout,

    /// Print both chart specifications as JSON and exit
    #[arg(long)]
    pub dump: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// Charts stretch to the window width.
    Wide,
    /// Charts in a fixed-width column, taller plots.
    Centered,
}

// ---------------------------------------------------------------------------
// View presets
// ---------------------------------------------------------------------------

/// Presentation parameters. The chart data is the same for every layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub layout: Layout,
    /// Content column width; `None` uses the full window.
    pub max_width: Option<f32>,
    pub efficiency_height: f32,
    pub cost_height: f32,
    /// Bar width in month units.
    pub bar_width: f64,
    pub bar_label_size: f32,
    pub savings_label_size: f32,
    /// Gap between bar top and its label, in kWh.
    pub bar_label_offset: f64,
    /// Horizontal rule between the two charts.
    pub separator: bool,
}

impl ViewConfig {
    pub fn wide() -> Self {
        Self {
            layout: Layout::Wide,
            max_width: None,
            efficiency_height: 400.0,
            cost_height: 420.0,
            bar_width: 0.5,
            bar_label_size: 11.0,
            savings_label_size: 12.0,
            bar_label_offset: 5.0,
            separator: false,
        }
    }

    pub fn centered() -> Self {
        Self {
            layout: Layout::Centered,
            max_width: Some(900.0),
            efficiency_height: 520.0,
            cost_height: 500.0,
            bar_width: 0.6,
            bar_label_size: 12.0,
            savings_label_size: 13.0,
            bar_label_offset: 5.0,
            separator: true,
        }
    }

    /// Width available to the charts inside a panel of `available` points.
    pub fn content_width(&self, available: f32) -> f32 {
        self.max_width.map_or(available, |w| w.min(available))
    }
}

impl From<Layout> for ViewConfig {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Wide => ViewConfig::wide(),
            Layout::Centered => ViewConfig::centered(),
        }
    }
}
