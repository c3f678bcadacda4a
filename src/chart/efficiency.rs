use serde::Serialize;

use crate::data::model::MonthlyRecord;

use super::format::truncated_label;

pub const TITLE: &str = "Efficiency: consumption vs generation";
pub const BAR_SERIES: &str = "Billed consumption";
pub const LINE_SERIES: &str = "Generated energy";

// ---------------------------------------------------------------------------
// Efficiency chart specification
// ---------------------------------------------------------------------------

/// One month of the efficiency chart: a bar and a line point at the same
/// x position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyEntry {
    pub month: String,
    /// Bar height: billed consumption (kWh).
    pub bar_height: f64,
    /// Line value: generated energy (kWh).
    pub line_value: f64,
    /// Text shown above the bar.
    pub bar_label: String,
}

/// Consumption bars with a generation line on top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencySpec {
    pub title: &'static str,
    pub bar_series: &'static str,
    pub line_series: &'static str,
    pub entries: Vec<EfficiencyEntry>,
}

impl EfficiencySpec {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(x, height)` for every bar; x is the month's position.
    pub fn bars(&self) -> Vec<[f64; 2]> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| [i as f64, e.bar_height])
            .collect()
    }

    /// `(x, value)` for every point of the generation line.
    pub fn line(&self) -> Vec<[f64; 2]> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| [i as f64, e.line_value])
            .collect()
    }

    pub fn months(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.month.clone()).collect()
    }
}

/// Build the efficiency chart. Order is the input order; nothing is sorted
/// or interpolated.
pub fn build_efficiency_spec(records: &[MonthlyRecord]) -> EfficiencySpec {
    let entries = records
        .iter()
        .map(|r| EfficiencyEntry {
            month: r.month.clone(),
            bar_height: r.consumed_kwh,
            line_value: r.generated_kwh,
            bar_label: truncated_label(r.consumed_kwh),
        })
        .collect();

    EfficiencySpec {
        title: TITLE,
        bar_series: BAR_SERIES,
        line_series: LINE_SERIES,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::tests::{record, sample_records};

    #[test]
    fn one_bar_and_one_point_per_month() {
        let spec = build_efficiency_spec(&sample_records());
        assert_eq!(spec.bars().len(), 3);
        assert_eq!(spec.line().len(), 3);
        assert_eq!(spec.months(), ["Jan", "Feb", "Mar"]);
    }

    #[test]
    fn bar_label_truncates_consumption() {
        let spec = build_efficiency_spec(&[record("Jan", 1234.9, 1000.0, 0.0, 0.0, 0.0)]);
        assert_eq!(spec.entries[0].bar_label, "1234");
        assert_eq!(spec.entries[0].bar_height, 1234.9);
    }

    #[test]
    fn input_order_is_kept() {
        let records = vec![
            record("Mar", 3.0, 0.0, 0.0, 0.0, 0.0),
            record("Jan", 1.0, 0.0, 0.0, 0.0, 0.0),
        ];
        let spec = build_efficiency_spec(&records);
        assert_eq!(spec.months(), ["Mar", "Jan"]);
        assert_eq!(spec.bars(), [[0.0, 3.0], [1.0, 1.0]]);
    }

    #[test]
    fn empty_input_gives_empty_chart() {
        let spec = build_efficiency_spec(&[]);
        assert!(spec.is_empty());
        assert!(spec.bars().is_empty());
        assert!(spec.line().is_empty());
    }
}
