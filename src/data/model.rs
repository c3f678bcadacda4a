use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Cell – a single raw value read from the sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed spreadsheet cell, independent of the reader backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet error value such as `#DIV/0!`.
    Error(String),
}

impl Cell {
    /// Interpret a free-form text token the way a CSV export would carry it.
    pub fn from_text(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return Cell::Empty;
        }
        match s.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(s.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Integer value of the cell, if it holds a whole number. Text never
    /// counts, even when it spells one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Number(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => write!(f, ""),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{}", *v as i64),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Error(e) => write!(f, "{e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawSheet – every row of the first worksheet, before any interpretation
// ---------------------------------------------------------------------------

/// Grid of cells as read from the source. Row 0 is the first sheet row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// MonthlyRecord – one validated month of year 1
// ---------------------------------------------------------------------------

/// One calendar month of the first operating year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRecord {
    /// Month label exactly as the spreadsheet shows it.
    pub month: String,
    /// Billed consumption (kWh).
    pub consumed_kwh: f64,
    /// Energy generated by the installation (kWh).
    pub generated_kwh: f64,
    /// What the customer used to pay without the installation.
    pub cost_without_system: f64,
    /// What the customer will pay with the installation.
    pub cost_with_system: f64,
    /// Savings as stated by the spreadsheet. Never recomputed.
    pub savings: f64,
    /// 1-based sheet row, for diagnostics.
    #[serde(skip)]
    pub source_row: usize,
}

impl MonthlyRecord {
    /// Difference between the stated savings and the one implied by the two
    /// cost columns. Non-zero means the sheet rounded them independently.
    pub fn savings_drift(&self) -> f64 {
        self.savings - (self.cost_without_system - self.cost_with_system)
    }
}

// ---------------------------------------------------------------------------
// MonthlySeries – the loader's output
// ---------------------------------------------------------------------------

/// Year-1 records in sheet order. May be empty: that is "no data", not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlySeries {
    pub records: Vec<MonthlyRecord>,
}

impl MonthlySeries {
    pub fn new(records: Vec<MonthlyRecord>) -> Self {
        Self { records }
    }

    /// Number of months.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no year-1 row was found.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_tokens_become_numbers_when_they_parse() {
        assert_eq!(Cell::from_text(" 12.5 "), Cell::Number(12.5));
        assert_eq!(Cell::from_text("Jan"), Cell::Text("Jan".into()));
        assert_eq!(Cell::from_text("   "), Cell::Empty);
    }

    #[test]
    fn integer_view_rejects_fractions() {
        assert_eq!(Cell::Number(1.0).as_integer(), Some(1));
        assert_eq!(Cell::Number(1.5).as_integer(), None);
        assert_eq!(Cell::Text("2".into()).as_integer(), None);
        assert_eq!(Cell::Empty.as_integer(), None);
    }

    #[test]
    fn whole_numbers_display_without_decimals() {
        assert_eq!(Cell::Number(0.0).to_string(), "0");
        assert_eq!(Cell::Number(2.25).to_string(), "2.25");
    }

    #[test]
    fn drift_compares_stated_and_implied_savings() {
        let rec = MonthlyRecord {
            month: "Jan".into(),
            consumed_kwh: 100.0,
            generated_kwh: 120.0,
            cost_without_system: 150.0,
            cost_with_system: 80.0,
            savings: 71.0,
            source_row: 25,
        };
        assert_eq!(rec.savings_drift(), 1.0);
    }
}
