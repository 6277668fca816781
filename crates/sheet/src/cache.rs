//! Shared, mtime-checked cache of loaded sheets.

use crate::error::{Result, SheetError};
use crate::resolve::{resolve_sheet_name, sheet_keywords, SheetMatch};
use crate::table::SheetTable;
use crate::workbook::WorkbookHandle;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

/// Modification times closer than this are considered unchanged.
pub const DEFAULT_MTIME_TOLERANCE: Duration = Duration::from_secs(1);

/// Counters describing cache behaviour since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

/// Everything cached for one workbook file.
#[derive(Debug)]
struct WorkbookEntry {
    handle: WorkbookHandle,
    /// Keyed by actual sheet name and by every logical alias that resolved to it
    tables: HashMap<String, Arc<SheetTable>>,
}

#[derive(Debug, Default)]
struct CacheState {
    workbooks: HashMap<PathBuf, WorkbookEntry>,
    stats: CacheStats,
}

impl CacheState {
    /// Drop the entry for `path` if the file changed since it was opened.
    fn evict_if_stale(&mut self, path: &Path, modified: SystemTime, tolerance: Duration) {
        let stale = self
            .workbooks
            .get(path)
            .is_some_and(|entry| !same_mtime(entry.handle.modified(), modified, tolerance));

        if stale {
            self.workbooks.remove(path);
            self.stats.invalidations += 1;
            info!("Workbook changed on disk, dropped cached sheets: {}", path.display());
        }
    }

    fn entry(&mut self, path: &Path) -> Result<&mut WorkbookEntry> {
        match self.workbooks.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(slot) => {
                let handle = WorkbookHandle::open(path)?;
                info!(
                    "Opened workbook {} ({} sheets)",
                    path.display(),
                    handle.sheet_names().len()
                );
                Ok(slot.insert(WorkbookEntry {
                    handle,
                    tables: HashMap::new(),
                }))
            }
        }
    }
}

/// Canonical key for a path whose file may already be gone.
fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| canonical_parent(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn canonical_parent(path: &Path) -> std::io::Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(std::fs::canonicalize(parent)?.join(name))
}

fn same_mtime(a: SystemTime, b: SystemTime, tolerance: Duration) -> bool {
    let diff = a.duration_since(b).unwrap_or_else(|e| e.duration());
    diff <= tolerance
}

fn sheet_not_found(logical_name: &str, available: &[String]) -> SheetError {
    SheetError::SheetNotFound {
        requested: logical_name.to_string(),
        keywords: sheet_keywords(logical_name),
        available: available.to_vec(),
    }
}

/// Cache of loaded sheet tables keyed by (canonical path, sheet name).
///
/// Every access re-reads the file's modification time; when it moved by
/// more than the tolerance, everything cached for that path (tables,
/// aliases and the open workbook) is dropped before the request proceeds.
/// One mutex covers the whole check / clear / load / store sequence, so a
/// cache can be shared between threads behind an `Arc`.
///
/// # Examples
///
/// ```no_run
/// use regstat_sheet::WorkbookCache;
///
/// let cache = WorkbookCache::new();
/// let table = cache.get_table("raw_2025q2.xlsx", "고용률").unwrap();
/// let index = table.period_index(2);
/// println!("{:?}", index.quarter_keys());
/// ```
#[derive(Debug)]
pub struct WorkbookCache {
    tolerance: Duration,
    state: Mutex<CacheState>,
}

impl Default for WorkbookCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookCache {
    /// Create an empty cache with the default mtime tolerance
    #[must_use]
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_MTIME_TOLERANCE)
    }

    /// Create an empty cache with a custom mtime tolerance
    #[must_use]
    pub fn with_tolerance(tolerance: Duration) -> Self {
        WorkbookCache {
            tolerance,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Get the mtime tolerance
    #[must_use]
    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    /// Load (or reuse) the table a logical sheet name resolves to.
    ///
    /// # Errors
    ///
    /// Returns `SheetNotFound` when no sheet matches, and IO / workbook
    /// errors for missing or undecodable files.
    pub fn get_table<P: AsRef<Path>>(&self, path: P, logical_name: &str) -> Result<Arc<SheetTable>> {
        let (path, modified) = self.stat(path.as_ref())?;
        let mut state = self.state.lock();
        state.evict_if_stale(&path, modified, self.tolerance);

        let cached = state
            .workbooks
            .get(&path)
            .and_then(|entry| entry.tables.get(logical_name))
            .map(Arc::clone);
        if let Some(table) = cached {
            state.stats.hits += 1;
            debug!("Sheet cache hit: '{}' in {}", logical_name, path.display());
            return Ok(table);
        }
        state.stats.misses += 1;

        let entry = state.entry(&path)?;
        let matched = resolve_sheet_name(logical_name, entry.handle.sheet_names())
            .ok_or_else(|| sheet_not_found(logical_name, entry.handle.sheet_names()))?;
        debug!(
            "Resolved sheet '{}' to '{}' ({:?})",
            logical_name, matched.name, matched.strategy
        );

        let table = match entry.tables.get(&matched.name) {
            Some(table) => Arc::clone(table),
            None => {
                let table = Arc::new(entry.handle.load_table(&matched.name)?);
                info!(
                    "Loaded sheet '{}' ({} rows x {} cols)",
                    matched.name,
                    table.row_count(),
                    table.col_count()
                );
                entry.tables.insert(matched.name.clone(), Arc::clone(&table));
                table
            }
        };
        entry
            .tables
            .insert(logical_name.to_string(), Arc::clone(&table));

        Ok(table)
    }

    /// Actual sheet names of a workbook, in workbook order
    ///
    /// # Errors
    ///
    /// Returns IO / workbook errors for missing or undecodable files.
    pub fn sheet_names<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        let (path, modified) = self.stat(path.as_ref())?;
        let mut state = self.state.lock();
        state.evict_if_stale(&path, modified, self.tolerance);

        Ok(state.entry(&path)?.handle.sheet_names().to_vec())
    }

    /// Resolve a logical name without loading the sheet
    ///
    /// # Errors
    ///
    /// Returns `SheetNotFound` when no sheet matches.
    pub fn resolve_sheet<P: AsRef<Path>>(&self, path: P, logical_name: &str) -> Result<SheetMatch> {
        let available = self.sheet_names(path)?;
        resolve_sheet_name(logical_name, &available)
            .ok_or_else(|| sheet_not_found(logical_name, &available))
    }

    /// Drop everything cached for one workbook
    pub fn invalidate<P: AsRef<Path>>(&self, path: P) {
        let path = cache_key(path.as_ref());
        let mut state = self.state.lock();
        if state.workbooks.remove(&path).is_some() {
            state.stats.invalidations += 1;
        }
    }

    /// Canonical path and modification time of a workbook file.
    ///
    /// A file that can no longer be read loses its cache entry.
    fn stat(&self, path: &Path) -> Result<(PathBuf, SystemTime)> {
        let checked = std::fs::canonicalize(path).and_then(|canonical| {
            let modified = std::fs::metadata(&canonical)?.modified()?;
            Ok((canonical, modified))
        });
        checked.map_err(|err| {
            let key = cache_key(path);
            let mut state = self.state.lock();
            if state.workbooks.remove(&key).is_some() {
                state.stats.invalidations += 1;
                info!("Workbook no longer readable, dropped cached sheets: {}", key.display());
            }
            SheetError::from(err)
        })
    }

    /// Drop everything
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let dropped = state.workbooks.len() as u64;
        state.workbooks.clear();
        state.stats.invalidations += dropped;
    }

    /// Number of workbooks currently held open
    #[must_use]
    pub fn workbook_count(&self) -> usize {
        self.state.lock().workbooks.len()
    }

    /// Get the hit / miss / invalidation counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats
    }
}
