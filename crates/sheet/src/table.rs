use crate::cell::{CellValue, NULL_CELL};
use crate::error::{Result, SheetError};
use crate::period::PeriodIndex;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A loaded sheet: a 2-D grid of cells with no header interpretation.
///
/// Rows may be ragged; reads past the end of a row yield [`CellValue::Null`].
/// Column indices are absolute (column `A` is 0) even when the workbook's
/// used range starts further right or down.
#[derive(Debug)]
pub struct SheetTable {
    name: String,
    rows: Vec<Vec<CellValue>>,
    period_indexes: Mutex<HashMap<usize, Arc<PeriodIndex>>>,
}

impl SheetTable {
    /// Create a table from row-major data
    #[must_use]
    pub fn from_rows<T: Into<CellValue>>(name: &str, rows: Vec<Vec<T>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        SheetTable {
            name: name.to_string(),
            rows,
            period_indexes: Mutex::new(HashMap::new()),
        }
    }

    /// Get the sheet name (the actual name in the workbook)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (width of the widest row)
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Check if the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get all rows
    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Get a row by index
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Get a row by index, failing when it does not exist
    pub fn require_row(&self, index: usize) -> Result<&[CellValue]> {
        self.row(index).ok_or(SheetError::RowIndexOutOfBounds {
            index,
            count: self.row_count(),
        })
    }

    /// Get a cell; out-of-range positions read as null
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&NULL_CELL)
    }

    /// Period index for `header_row`, parsed once and kept with the table.
    #[must_use]
    pub fn period_index(&self, header_row: usize) -> Arc<PeriodIndex> {
        let mut indexes = self.period_indexes.lock();
        Arc::clone(
            indexes
                .entry(header_row)
                .or_insert_with(|| Arc::new(PeriodIndex::parse_header(self, header_row))),
        )
    }
}
