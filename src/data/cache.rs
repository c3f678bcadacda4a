use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use super::error::LoadError;
use super::loader::load_report;
use super::model::MonthlySeries;
use super::source::{ReportSource, TabularReader};

// ---------------------------------------------------------------------------
// Fingerprint – identity of a source's content
// ---------------------------------------------------------------------------

/// Cache key. Files are identified by path, modification time and size;
/// in-memory buffers by name and a digest of their bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    File {
        path: PathBuf,
        modified: Option<SystemTime>,
        len: u64,
    },
    Bytes {
        name: String,
        digest: u64,
    },
}

impl Fingerprint {
    /// Fingerprint a source. Fails only when a file's metadata is unreadable.
    pub fn of(source: &ReportSource) -> Result<Self, LoadError> {
        match source {
            ReportSource::File(path) => {
                let meta = std::fs::metadata(path)
                    .map_err(|e| LoadError::unavailable(source.source_name(), e))?;
                Ok(Fingerprint::File {
                    path: path.clone(),
                    modified: meta.modified().ok(),
                    len: meta.len(),
                })
            }
            ReportSource::Bytes { name, bytes } => {
                let mut hasher = DefaultHasher::new();
                bytes.hash(&mut hasher);
                Ok(Fingerprint::Bytes {
                    name: name.clone(),
                    digest: hasher.finish(),
                })
            }
        }
    }

    /// What the content belongs to, independent of its version.
    fn identity(&self) -> SourceIdentity {
        match self {
            Fingerprint::File { path, .. } => SourceIdentity::File(path.clone()),
            Fingerprint::Bytes { name, .. } => SourceIdentity::Named(name.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SourceIdentity {
    File(PathBuf),
    Named(String),
}

// ---------------------------------------------------------------------------
// ReportCache – memoized loads
// ---------------------------------------------------------------------------

/// Parsed reports keyed by content fingerprint.
///
/// Only the latest version of each source is retained: loading a changed
/// file evicts the entry for its previous fingerprint. Failed loads are not
/// cached.
#[derive(Debug, Default)]
pub struct ReportCache {
    entries: HashMap<Fingerprint, Arc<MonthlySeries>>,
    current: HashMap<SourceIdentity, Fingerprint>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the parsed series for `source`, loading it on a miss.
    pub fn load(&mut self, source: &ReportSource) -> Result<Arc<MonthlySeries>, LoadError> {
        let fingerprint = Fingerprint::of(source)?;
        if let Some(series) = self.entries.get(&fingerprint) {
            log::debug!("Cache hit for {source}");
            return Ok(Arc::clone(series));
        }

        let series = Arc::new(load_report(source)?);
        self.insert(fingerprint, Arc::clone(&series));
        Ok(series)
    }

    /// Whether the cached version of `source` no longer matches its content.
    /// Sources that were never loaded count as stale.
    pub fn is_stale(&self, source: &ReportSource) -> bool {
        match Fingerprint::of(source) {
            Ok(fp) => !self.entries.contains_key(&fp),
            Err(_) => true,
        }
    }

    /// Forget everything cached for `source`, whatever its version.
    pub fn invalidate(&mut self, source: &ReportSource) {
        let identity = match source {
            ReportSource::File(path) => SourceIdentity::File(path.clone()),
            ReportSource::Bytes { name, .. } => SourceIdentity::Named(name.clone()),
        };
        if let Some(old) = self.current.remove(&identity) {
            log::debug!("Invalidated cached report for {source}");
            self.entries.remove(&old);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, fingerprint: Fingerprint, series: Arc<MonthlySeries>) {
        if let Some(old) = self
            .current
            .insert(fingerprint.identity(), fingerprint.clone())
        {
            if old != fingerprint {
                log::info!("Source content changed, replacing cached report");
                self.entries.remove(&old);
            }
        }
        self.entries.insert(fingerprint, series);
    }
}
