use serde::Serialize;

use crate::data::model::MonthlyRecord;

use super::format::format_currency;

pub const TITLE: &str = "Cost comparison and savings";
pub const CURRENT_SERIES: &str = "Current spending";
pub const PREVIOUS_SERIES: &str = "Previous spending";

// ---------------------------------------------------------------------------
// Which series is on top at a given point
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Upper {
    /// Previous cost above current: the month saves money.
    Previous,
    /// Current cost above previous: the month costs more than before.
    Current,
    Tied,
}

impl Upper {
    fn of_difference(previous_minus_current: f64) -> Self {
        if previous_minus_current > 0.0 {
            Upper::Previous
        } else if previous_minus_current < 0.0 {
            Upper::Current
        } else {
            Upper::Tied
        }
    }
}

// ---------------------------------------------------------------------------
// Cost comparison chart specification
// ---------------------------------------------------------------------------

/// One month of the cost chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEntry {
    pub month: String,
    /// Cost with the installation ("will pay").
    pub current: f64,
    /// Cost without the installation ("used to pay").
    pub previous: f64,
    /// Vertical position of the savings label.
    pub midpoint_y: f64,
    /// Savings exactly as the spreadsheet states them.
    pub savings: f64,
    pub label: String,
    pub upper: Upper,
}

impl CostEntry {
    pub fn upper_value(&self) -> f64 {
        self.current.max(self.previous)
    }

    pub fn lower_value(&self) -> f64 {
        self.current.min(self.previous)
    }

    /// Stated savings minus the gap drawn between the two lines.
    ///
    /// The label shows the spreadsheet's savings while the shaded area is
    /// the cost gap. If the sheet rounds these independently the two can
    /// disagree on screen; product owners should know the label is not
    /// derived from the area.
    pub fn savings_drift(&self) -> f64 {
        self.savings - (self.previous - self.current)
    }
}

/// Shaded area between the two cost lines where one series stays on top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillRegion {
    pub upper: Upper,
    /// Closed outline: upper edge left to right, then lower edge back.
    pub polygon: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSpec {
    pub title: &'static str,
    pub current_series: &'static str,
    pub previous_series: &'static str,
    pub entries: Vec<CostEntry>,
}

impl CostSpec {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_line(&self) -> Vec<[f64; 2]> {
        self.points(|e| e.current)
    }

    pub fn previous_line(&self) -> Vec<[f64; 2]> {
        self.points(|e| e.previous)
    }

    /// Where each savings label sits, with its text.
    pub fn labels(&self) -> Vec<([f64; 2], &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| ([i as f64, e.midpoint_y], e.label.as_str()))
            .collect()
    }

    pub fn months(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.month.clone()).collect()
    }

    /// Split the band between the two lines into polygons with a single
    /// series on top, cutting segments where the lines cross.
    pub fn fill_regions(&self) -> Vec<FillRegion> {
        let mut regions: Vec<Region> = Vec::new();

        for (i, pair) in self.entries.windows(2).enumerate() {
            for piece in segment_pieces(i as f64, &pair[0], &pair[1]) {
                if piece.upper == Upper::Tied {
                    continue;
                }
                match regions.last_mut() {
                    Some(r) if r.upper == piece.upper && r.end_x() == piece.x0 => r.extend(&piece),
                    _ => regions.push(Region::start(&piece)),
                }
            }
        }

        regions.into_iter().map(Region::finish).collect()
    }

    fn points(&self, value: impl Fn(&CostEntry) -> f64) -> Vec<[f64; 2]> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| [i as f64, value(e)])
            .collect()
    }
}

/// Build the cost chart. The relation between the two series is decided per
/// month; no global ordering is assumed.
pub fn build_cost_spec(records: &[MonthlyRecord]) -> CostSpec {
    let entries = records
        .iter()
        .map(|r| {
            let current = r.cost_with_system;
            let previous = r.cost_without_system;
            CostEntry {
                month: r.month.clone(),
                current,
                previous,
                midpoint_y: (current + previous) / 2.0,
                savings: r.savings,
                label: format_currency(r.savings),
                upper: Upper::of_difference(previous - current),
            }
        })
        .collect();

    CostSpec {
        title: TITLE,
        current_series: CURRENT_SERIES,
        previous_series: PREVIOUS_SERIES,
        entries,
    }
}

// ---------------------------------------------------------------------------
// Fill geometry helpers
// ---------------------------------------------------------------------------

/// Straight piece of the band between two x positions.
#[derive(Debug, Clone, Copy)]
struct Piece {
    x0: f64,
    x1: f64,
    /// (upper, lower) at x0 and x1.
    start: (f64, f64),
    end: (f64, f64),
    upper: Upper,
}

/// One or two pieces for the segment between months `x` and `x + 1`.
fn segment_pieces(x: f64, a: &CostEntry, b: &CostEntry) -> Vec<Piece> {
    let d0 = a.previous - a.current;
    let d1 = b.previous - b.current;
    let edges = |e: &CostEntry| (e.upper_value(), e.lower_value());

    if d0 * d1 < 0.0 {
        let t = d0 / (d0 - d1);
        let xm = x + t;
        let ym = a.current + t * (b.current - a.current);
        return vec![
            Piece {
                x0: x,
                x1: xm,
                start: edges(a),
                end: (ym, ym),
                upper: Upper::of_difference(d0),
            },
            Piece {
                x0: xm,
                x1: x + 1.0,
                start: (ym, ym),
                end: edges(b),
                upper: Upper::of_difference(d1),
            },
        ];
    }

    vec![Piece {
        x0: x,
        x1: x + 1.0,
        start: edges(a),
        end: edges(b),
        upper: Upper::of_difference(d0 + d1),
    }]
}

struct Region {
    upper: Upper,
    top: Vec<[f64; 2]>,
    bottom: Vec<[f64; 2]>,
}

impl Region {
    fn start(piece: &Piece) -> Self {
        Region {
            upper: piece.upper,
            top: vec![[piece.x0, piece.start.0], [piece.x1, piece.end.0]],
            bottom: vec![[piece.x0, piece.start.1], [piece.x1, piece.end.1]],
        }
    }

    fn end_x(&self) -> f64 {
        self.top.last().map_or(f64::NAN, |p| p[0])
    }

    fn extend(&mut self, piece: &Piece) {
        self.top.push([piece.x1, piece.end.0]);
        self.bottom.push([piece.x1, piece.end.1]);
    }

    fn finish(self) -> FillRegion {
        let mut polygon = self.top;
        polygon.extend(self.bottom.into_iter().rev());
        FillRegion {
            upper: self.upper,
            polygon,
        }
    }
}
