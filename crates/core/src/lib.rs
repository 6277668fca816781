//! # regstat-core
//!
//! Regional indicator extraction for regstat.
//!
//! This crate provides:
//! - Region name normalization
//! - Row location by region and classification code
//! - Growth rate, difference and contribution metrics
//! - Region-grouped tables and rankings
//! - Indicator configuration and the extraction service
//!
//! # Example
//!
//! ```
//! use regstat_core::{assemble, growth_rate, GroupDefinition, MetricKind, MetricRecord, Region};
//!
//! assert_eq!(growth_rate(Some(110.0), Some(100.0)), Some(10.0));
//! assert_eq!(Region::normalize("서울특별시"), Some(Region::Seoul));
//!
//! let records = vec![MetricRecord::compute(
//!     Region::Seoul,
//!     MetricKind::GrowthRate,
//!     Some(110.0),
//!     Some(100.0),
//!     None,
//! )];
//! let table = assemble(&records, &GroupDefinition::default());
//! assert_eq!(table.rows[1].group_name.as_deref(), Some("수도권"));
//! ```

/// Region-grouped tables and rankings.
pub mod assemble;
/// Engine and indicator configuration.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// The extraction service.
pub mod extract;
/// Row location within a sheet.
pub mod locator;
/// Derived metrics.
pub mod metric;
/// Canonical regions.
pub mod region;

pub use assemble::{
    assemble, top_n_by_value, Direction, GroupDefinition, RegionGroupTable, RegionRow,
};
pub use config::{CacheConfig, EngineConfig, IndicatorSpec, RankingConfig};
pub use error::{ExtractError, Result};
pub use extract::{period_key, Extraction, ExtractionRequest, Extractor, RegionalReport};
pub use locator::{canonical_code, canonical_code_text, find_row, ClassificationFilter, RowLocator};
pub use metric::{
    cell_number, contribution, difference, growth_rate, round1, MetricKind, MetricRecord,
};
pub use region::Region;

/// Re-export workbook access types.
pub use regstat_sheet::{
    CellValue, ColumnPlan, ColumnSource, Comparison, PeriodIndex, PeriodKey, SheetError,
    SheetTable, WorkbookCache, YearQuarter,
};

/// Normalize a region label; see [`Region::normalize`].
#[must_use]
pub fn resolve_region(raw: &str) -> Option<Region> {
    Region::normalize(raw)
}
