use crate::error::Result;
use crate::loader::{self, CancellationColumns, IssuanceColumns, LoadReport};
use crate::types::{CancellationRecord, IssuanceRecord};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Identity of a source file at load time. Two stamps compare equal only if
/// the path, size, and mtime all match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStamp {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceStamp {
    fn take(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// The two source file paths a report run reads from.
#[derive(Debug, Clone)]
pub struct SourcePair {
    pub issuances: PathBuf,
    pub cancellations: PathBuf,
}

/// Both datasets plus their load diagnostics, as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedData {
    pub issuances: Vec<IssuanceRecord>,
    pub cancellations: Vec<CancellationRecord>,
    pub issuance_report: LoadReport,
    pub cancellation_report: LoadReport,
}

struct CacheEntry {
    issuance_stamp: Option<SourceStamp>,
    cancellation_stamp: Option<SourceStamp>,
    data: LoadedData,
}

/// Load-once cache for the two source files.
///
/// Reports are regenerated many times per run while the inputs rarely
/// change, so the loaded records are reused until a source file's stamp
/// stops matching or `invalidate` is called.
#[derive(Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.entry.is_some()
    }

    /// Drop the cached datasets; the next `load_or_reuse` re-reads both
    /// files.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    fn is_fresh(&self, sources: &SourcePair) -> bool {
        match &self.entry {
            None => false,
            Some(e) => {
                e.issuance_stamp == SourceStamp::take(&sources.issuances)
                    && e.cancellation_stamp == SourceStamp::take(&sources.cancellations)
            }
        }
    }

    /// Return the cached datasets, re-reading the source files only when
    /// their on-disk identity changed since the last load.
    pub fn load_or_reuse(
        &mut self,
        sources: &SourcePair,
        issuance_cols: &IssuanceColumns,
        cancellation_cols: &CancellationColumns,
    ) -> Result<LoadedData> {
        if self.is_fresh(sources) {
            if let Some(entry) = &self.entry {
                return Ok(entry.data.clone());
            }
        }
        let (issuances, issuance_report) =
            loader::load_issuances(&sources.issuances, issuance_cols)?;
        let (cancellations, cancellation_report) =
            loader::load_cancellations(&sources.cancellations, cancellation_cols)?;
        let data = LoadedData {
            issuances,
            cancellations,
            issuance_report,
            cancellation_report,
        };
        self.entry = Some(CacheEntry {
            issuance_stamp: SourceStamp::take(&sources.issuances),
            cancellation_stamp: SourceStamp::take(&sources.cancellations),
            data: data.clone(),
        });
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const ISSUANCES: &str = "DATA_EMISSAO,CTRC_EMITIDO\n2024-01-05,3\n";
    const CANCELLATIONS: &str = "DATA_CANCELADO\n2024-01-08\n";

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn sources(dir: &TempDir) -> SourcePair {
        SourcePair {
            issuances: write_file(dir, "emissoes.csv", ISSUANCES),
            cancellations: write_file(dir, "cancelamentos.csv", CANCELLATIONS),
        }
    }

    #[test]
    fn second_load_reuses_the_cached_data() {
        let dir = TempDir::new().unwrap();
        let sources = sources(&dir);
        let mut cache = DatasetCache::new();
        let first = cache
            .load_or_reuse(
                &sources,
                &IssuanceColumns::default(),
                &CancellationColumns::default(),
            )
            .unwrap();
        // Unchanged stamps: the second call serves the cached entry.
        let second = cache
            .load_or_reuse(
                &sources,
                &IssuanceColumns::default(),
                &CancellationColumns::default(),
            )
            .unwrap();
        assert_eq!(first, second);
        assert!(cache.is_loaded());
    }

    #[test]
    fn changed_source_content_is_picked_up() {
        let dir = TempDir::new().unwrap();
        let sources = sources(&dir);
        let mut cache = DatasetCache::new();
        let first = cache
            .load_or_reuse(
                &sources,
                &IssuanceColumns::default(),
                &CancellationColumns::default(),
            )
            .unwrap();
        assert_eq!(first.issuances.len(), 1);

        // Appending a row changes the file length, which changes the stamp.
        write_file(
            &dir,
            "emissoes.csv",
            "DATA_EMISSAO,CTRC_EMITIDO\n2024-01-05,3\n2024-01-06,2\n",
        );
        let second = cache
            .load_or_reuse(
                &sources,
                &IssuanceColumns::default(),
                &CancellationColumns::default(),
            )
            .unwrap();
        assert_eq!(second.issuances.len(), 2);
    }

    #[test]
    fn invalidate_forces_a_reload() {
        let dir = TempDir::new().unwrap();
        let sources = sources(&dir);
        let mut cache = DatasetCache::new();
        cache
            .load_or_reuse(
                &sources,
                &IssuanceColumns::default(),
                &CancellationColumns::default(),
            )
            .unwrap();
        cache.invalidate();
        assert!(!cache.is_loaded());
        let data = cache
            .load_or_reuse(
                &sources,
                &IssuanceColumns::default(),
                &CancellationColumns::default(),
            )
            .unwrap();
        assert_eq!(data.cancellations.len(), 1);
    }

    #[test]
    fn missing_source_surfaces_the_loader_error() {
        let dir = TempDir::new().unwrap();
        let sources = SourcePair {
            issuances: dir.path().join("missing.csv"),
            cancellations: dir.path().join("also_missing.csv"),
        };
        let mut cache = DatasetCache::new();
        let err = cache
            .load_or_reuse(
                &sources,
                &IssuanceColumns::default(),
                &CancellationColumns::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReportError::SourceNotFound { .. }
        ));
        assert!(!cache.is_loaded());
    }
}
