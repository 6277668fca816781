//! End-to-end extraction of one indicator for one period.

use crate::assemble::{assemble, top_n_by_value, Direction, GroupDefinition, RegionGroupTable};
use crate::config::IndicatorSpec;
use crate::error::{ExtractError, Result};
use crate::metric::{cell_number, MetricKind, MetricRecord};
use crate::region::Region;
use regstat_sheet::{ColumnPlan, PeriodKey, SheetTable, WorkbookCache, YearQuarter};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Annual period for `quarter = None`, quarterly otherwise.
///
/// # Errors
///
/// Returns `InvalidPeriod` for a quarter outside 1-4.
pub fn period_key(year: i32, quarter: Option<u8>) -> Result<PeriodKey> {
    match quarter {
        None => Ok(PeriodKey::Year(year)),
        Some(q) => YearQuarter::new(year, q)
            .map(PeriodKey::Quarter)
            .ok_or_else(|| ExtractError::InvalidPeriod(format!("{year} {q}/4"))),
    }
}

/// What to extract and from where.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub workbook: PathBuf,
    pub indicator: IndicatorSpec,
    pub period: PeriodKey,
    /// Accept column plans guessed by offset
    pub allow_approximate: bool,
}

impl ExtractionRequest {
    pub fn new(workbook: impl Into<PathBuf>, indicator: IndicatorSpec, period: PeriodKey) -> Self {
        ExtractionRequest {
            workbook: workbook.into(),
            indicator,
            period,
            allow_approximate: true,
        }
    }

    /// Reject approximate column plans.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.allow_approximate = false;
        self
    }
}

/// Figures of one indicator for every region found in the sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub indicator: String,
    /// Actual sheet name the figures were read from
    pub sheet: String,
    pub period: PeriodKey,
    pub comparison_period: PeriodKey,
    pub columns: ColumnPlan,
    /// One record per region found, canonical order
    pub records: Vec<MetricRecord>,
    /// Regions with no qualifying row
    pub missing_regions: Vec<Region>,
}

impl Extraction {
    #[must_use]
    pub fn approximate(&self) -> bool {
        self.columns.approximate
    }

    #[must_use]
    pub fn record(&self, region: Region) -> Option<&MetricRecord> {
        self.records.iter().find(|r| r.region == region)
    }

    /// Lay the records out by group and rank the regions.
    ///
    /// The nation is never ranked.
    #[must_use]
    pub fn report(&self, groups: &GroupDefinition, top_n: usize) -> RegionalReport {
        let regional: Vec<MetricRecord> = self
            .records
            .iter()
            .filter(|r| !r.region.is_nation())
            .cloned()
            .collect();

        RegionalReport {
            indicator: self.indicator.clone(),
            sheet: self.sheet.clone(),
            period: self.period.to_string(),
            comparison_period: self.comparison_period.to_string(),
            approximate: self.approximate(),
            nation: self.record(Region::Nation).cloned(),
            table: assemble(&self.records, groups),
            top_increase: top_n_by_value(&regional, top_n, Direction::Increase),
            top_decrease: top_n_by_value(&regional, top_n, Direction::Decrease),
        }
    }
}

/// Grouped table plus rankings, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalReport {
    pub indicator: String,
    pub sheet: String,
    pub period: String,
    pub comparison_period: String,
    pub approximate: bool,
    pub nation: Option<MetricRecord>,
    pub table: RegionGroupTable,
    pub top_increase: Vec<MetricRecord>,
    pub top_decrease: Vec<MetricRecord>,
}

/// Runs extractions against a shared workbook cache.
#[derive(Debug, Clone)]
pub struct Extractor {
    cache: Arc<WorkbookCache>,
}

impl Extractor {
    #[must_use]
    pub fn new(cache: Arc<WorkbookCache>) -> Self {
        Extractor { cache }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<WorkbookCache> {
        &self.cache
    }

    /// Extract one indicator for one period.
    ///
    /// # Errors
    ///
    /// Fails when the indicator is inconsistent (see
    /// [`IndicatorSpec::validate`]), the workbook cannot be read, no sheet
    /// name matches, or no columns can be planned for the period. An
    /// approximate plan is an error only for strict requests.
    pub fn extract(&self, request: &ExtractionRequest) -> Result<Extraction> {
        let indicator = &request.indicator;
        indicator.validate()?;
        let filter = indicator.filter()?;
        let table = self.load_sheet(request)?;

        let index = table.period_index(indicator.header_row);
        let comparison_period = indicator.comparison.comparison_period(request.period);
        let columns = index
            .plan(request.period, indicator.comparison)
            .ok_or_else(|| ExtractError::PeriodNotFound {
                sheet: table.name().to_string(),
                header_row: index.header_row(),
                period: request.period.to_string(),
            })?;

        if columns.approximate {
            if !request.allow_approximate {
                return Err(ExtractError::ApproximateColumns {
                    sheet: table.name().to_string(),
                    period: request.period.to_string(),
                    current: columns.current,
                    comparison: columns.comparison,
                });
            }
            warn!(
                "Period {} not in header of '{}', using columns {} and {} by offset",
                request.period,
                table.name(),
                columns.current,
                columns.comparison
            );
        }

        let rows = indicator.locator().locate_all(&table, &filter);
        let mut records = Vec::with_capacity(rows.len());
        let mut missing_regions = Vec::new();
        for region in Region::ALL {
            match rows.get(&region) {
                Some(&row) => {
                    records.push(read_record(&table, indicator, &columns, region, row));
                }
                None => missing_regions.push(region),
            }
        }

        info!(
            "Extracted '{}' for {} from '{}' ({} regions, {} missing)",
            indicator.name,
            request.period,
            table.name(),
            records.len(),
            missing_regions.len()
        );

        Ok(Extraction {
            indicator: indicator.name.clone(),
            sheet: table.name().to_string(),
            period: request.period,
            comparison_period,
            columns,
            records,
            missing_regions,
        })
    }

    /// Extract several requests, stopping at the first failure.
    pub fn extract_all(&self, requests: &[ExtractionRequest]) -> Result<Vec<Extraction>> {
        requests.iter().map(|r| self.extract(r)).collect()
    }

    fn load_sheet(&self, request: &ExtractionRequest) -> Result<Arc<SheetTable>> {
        let mut first_error = None;
        for name in request.indicator.sheet_candidates() {
            match self.cache.get_table(&request.workbook, name) {
                Ok(table) => {
                    debug!("Indicator sheet '{}' is '{}'", name, table.name());
                    return Ok(table);
                }
                Err(err) => {
                    let err = ExtractError::from(err);
                    if !err.is_sheet_not_found() {
                        return Err(err);
                    }
                    debug!("No sheet matches '{}', trying next alias", name);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        warn!(
            "No sheet in {} matches indicator '{}' or its aliases",
            request.workbook.display(),
            request.indicator.name
        );
        // sheet_candidates always yields the primary name
        Err(first_error.unwrap_or_else(|| ExtractError::config("indicator has no sheet name")))
    }
}

fn read_record(
    table: &SheetTable,
    indicator: &IndicatorSpec,
    columns: &ColumnPlan,
    region: Region,
    row: usize,
) -> MetricRecord {
    let value = cell_number(table.cell(row, columns.current));
    let comparison = cell_number(table.cell(row, columns.comparison));
    let weight = match (indicator.metric, indicator.weight_column) {
        (MetricKind::Contribution, Some(col)) => cell_number(table.cell(row, col)),
        _ => None,
    };
    MetricRecord::compute(region, indicator.metric, value, comparison, weight)
}
