//! Workbook access for regstat
//!
//! Loads sheets out of statistical release workbooks, resolves the sheet a
//! caller means even when the release renamed it, and reads the period
//! layout of a header row.
//!
//! # Examples
//!
//! ## Reading a period header
//!
//! ```
//! use regstat_sheet::{PeriodIndex, SheetTable};
//!
//! let table = SheetTable::from_rows(
//!     "고용률",
//!     vec![vec!["시도", "2024.2/4", "2025.1/4", "2025.2/4p"]],
//! );
//!
//! let index = PeriodIndex::parse_header(&table, 0);
//! assert_eq!(index.column_for_key("2025 2/4"), Some(3));
//! ```
//!
//! ## Resolving a renamed sheet
//!
//! ```
//! use regstat_sheet::{resolve_sheet_name, MatchStrategy};
//!
//! let available = vec!["표지".to_string(), "3. 고용률(시도별)".to_string()];
//! let matched = resolve_sheet_name("고용률", &available).unwrap();
//! assert_eq!(matched.name, "3. 고용률(시도별)");
//! assert_eq!(matched.strategy, MatchStrategy::Normalized);
//! ```
//!
//! ## Cached loading
//!
//! ```no_run
//! use regstat_sheet::WorkbookCache;
//! use std::sync::Arc;
//!
//! let cache = Arc::new(WorkbookCache::new());
//! let first = cache.get_table("raw.xlsx", "고용률").unwrap();
//! let again = cache.get_table("raw.xlsx", "고용률").unwrap();
//! assert!(Arc::ptr_eq(&first, &again));
//! ```

mod cache;
mod cell;
mod error;
mod period;
mod resolve;
mod table;
mod workbook;

/// Re-export the sheet cache.
pub use cache::{CacheStats, WorkbookCache, DEFAULT_MTIME_TOLERANCE};
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export period schema types.
pub use period::{
    parse_quarter_label, parse_year_label, ColumnPlan, ColumnSource, Comparison, PeriodIndex,
    PeriodKey, YearQuarter,
};
/// Re-export sheet name resolution.
pub use resolve::{normalize_sheet_name, resolve_sheet_name, sheet_keywords, MatchStrategy, SheetMatch};
/// Re-export table type.
pub use table::SheetTable;
/// Re-export workbook handle.
pub use workbook::WorkbookHandle;
