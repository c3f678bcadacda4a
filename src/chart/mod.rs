/// Chart specifications derived from the monthly series.
///
/// Both builders are pure functions of a borrowed `&[MonthlyRecord]`; they
/// keep the input order and never touch the loader's data. What comes out
/// is plain data (points, labels, positions) for whatever paints it.

pub mod cost;
pub mod efficiency;
pub mod format;

pub use cost::{build_cost_spec, CostSpec};
pub use efficiency::{build_efficiency_spec, EfficiencySpec};

use serde::Serialize;

use crate::data::model::MonthlySeries;

/// Both views for one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportCharts {
    pub efficiency: EfficiencySpec,
    pub cost: CostSpec,
}

impl ReportCharts {
    pub fn build(series: &MonthlySeries) -> Self {
        ReportCharts {
            efficiency: build_efficiency_spec(&series.records),
            cost: build_cost_spec(&series.records),
        }
    }
}
