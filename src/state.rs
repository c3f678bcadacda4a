use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::chart::ReportCharts;
use crate::config::ViewConfig;
use crate::data::cache::{Fingerprint, ReportCache};
use crate::data::model::MonthlySeries;
use crate::data::source::ReportSource;

/// How often the source file is checked for changes.
pub const CHANGE_POLL_INTERVAL: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Report status
// ---------------------------------------------------------------------------

/// What the central panel should show.
#[derive(Debug, Clone)]
pub enum ReportStatus {
    /// No load attempted yet.
    Idle,
    /// The file is missing or unreadable.
    Unavailable(String),
    /// The file was read but is not a sizing report.
    Invalid(String),
    /// Loaded, but no year-1 rows.
    NoData,
    Ready(Arc<MonthlySeries>),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Report being shown.
    pub source: Option<ReportSource>,

    pub view: ViewConfig,

    pub status: ReportStatus,

    /// Parsed reports by content fingerprint.
    cache: ReportCache,

    /// Content of the source when it last failed to load.
    failed_fingerprint: Option<Fingerprint>,

    /// Last time the source was checked for changes.
    last_poll: Option<Instant>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ViewConfig::wide())
    }
}

impl AppState {
    pub fn new(view: ViewConfig) -> Self {
        Self {
            source: None,
            view,
            status: ReportStatus::Idle,
            cache: ReportCache::new(),
            failed_fingerprint: None,
            last_poll: None,
        }
    }

    /// Switch to a new report file and load it.
    pub fn open(&mut self, path: PathBuf) {
        self.source = Some(ReportSource::File(path));
        self.reload();
    }

    /// Load the current source, through the cache.
    pub fn reload(&mut self) {
        let Some(source) = &self.source else {
            self.status = ReportStatus::Idle;
            return;
        };

        self.failed_fingerprint = None;
        self.status = match self.cache.load(source) {
            Ok(series) if series.is_empty() => {
                log::info!("{source} has no year-1 rows");
                ReportStatus::NoData
            }
            Ok(series) => ReportStatus::Ready(series),
            Err(e) => {
                log::error!("Failed to load report: {e:#}");
                self.failed_fingerprint = Fingerprint::of(source).ok();
                if e.is_unavailable() {
                    ReportStatus::Unavailable(e.to_string())
                } else {
                    ReportStatus::Invalid(e.to_string())
                }
            }
        };
        self.last_poll = Some(Instant::now());
    }

    /// Drop the cached copy and read the source again.
    pub fn force_reload(&mut self) {
        if let Some(source) = &self.source {
            self.cache.invalidate(source);
        }
        self.reload();
    }

    /// Reload when the source changed on disk. Called every frame; only
    /// checks once per `CHANGE_POLL_INTERVAL`.
    pub fn poll_changes(&mut self, now: Instant) {
        let due = self
            .last_poll
            .map_or(true, |t| now.duration_since(t) >= CHANGE_POLL_INTERVAL);
        if !due {
            return;
        }
        self.last_poll = Some(now);

        let Some(source) = &self.source else {
            return;
        };
        // Failed loads are not cached, so compare against the content that
        // failed instead of asking the cache.
        let changed = match &self.status {
            ReportStatus::Unavailable(_) | ReportStatus::Invalid(_) => {
                Fingerprint::of(source).ok() != self.failed_fingerprint
            }
            _ => self.cache.is_stale(source),
        };
        if changed {
            log::debug!("{source} changed, reloading");
            self.reload();
        }
    }

    /// Fresh chart specifications for the current report.
    pub fn charts(&self) -> Option<ReportCharts> {
        match &self.status {
            ReportStatus::Ready(series) => Some(ReportCharts::build(series)),
            _ => None,
        }
    }

    pub fn month_count(&self) -> usize {
        match &self.status {
            ReportStatus::Ready(series) => series.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::loader::HEADER_SKIP_ROWS;

    fn write_report(path: &std::path::Path, year: u32) {
        let mut file = std::fs::File::create(path).unwrap();
        for _ in 0..HEADER_SKIP_ROWS {
            writeln!(file, "preamble").unwrap();
        }
        writeln!(
            file,
            "Year,Month,Consumption (kWh),Generated Energy (kWh),Will Pay,Used To Pay,Savings"
        )
        .unwrap();
        writeln!(file, "{year},Jan,100,120,80,150,70").unwrap();
    }

    #[test]
    fn missing_file_is_reported_as_unavailable() {
        let mut state = AppState::default();
        state.open(PathBuf::from("/no/such/dimensionamento.xlsx"));
        assert!(matches!(state.status, ReportStatus::Unavailable(_)));
        assert!(state.charts().is_none());
    }

    #[test]
    fn report_without_year_one_shows_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_report(&path, 2);

        let mut state = AppState::default();
        state.open(path);
        assert!(matches!(state.status, ReportStatus::NoData));
        assert_eq!(state.month_count(), 0);
    }

    #[test]
    fn loaded_report_builds_charts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_report(&path, 1);

        let mut state = AppState::default();
        state.open(path);
        let charts = state.charts().unwrap();
        assert_eq!(charts.efficiency.entries.len(), 1);
        assert_eq!(charts.cost.entries[0].label, "$70");
    }

    #[test]
    fn file_created_later_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let mut state = AppState::default();
        state.open(path.clone());
        assert!(matches!(state.status, ReportStatus::Unavailable(_)));

        write_report(&path, 1);
        state.poll_changes(Instant::now() + CHANGE_POLL_INTERVAL);
        assert_eq!(state.month_count(), 1);
    }

    #[test]
    fn polling_is_throttled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let mut state = AppState::default();
        state.open(path.clone());
        write_report(&path, 1);

        // Too soon after the failed open.
        state.poll_changes(Instant::now());
        assert!(matches!(state.status, ReportStatus::Unavailable(_)));
    }
}
