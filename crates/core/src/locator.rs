//! Row location by region and classification code.

use crate::error::{ExtractError, Result};
use crate::region::Region;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use regstat_sheet::{CellValue, SheetTable};
use serde::{Deserialize, Serialize};

lazy_static! {
    // "0.0", "12.", "-3.000", "-0"
    static ref ZERO_FRACTION: Regex = Regex::new(r"^(-?\d+)(?:\.0*)?$").unwrap();
}

/// Canonical string form of a classification cell.
///
/// Numeric zero, `"0"`, `"0.0"`, `"-0"` and `" 0 "` all become `"0"`. Text keeps
/// leading zeros (`"01"` stays `"01"`). Empty cells have no code.
#[must_use]
pub fn canonical_code(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Null => None,
        CellValue::Bool(b) => Some(b.to_string()),
        CellValue::Int(i) => Some(i.to_string()),
        CellValue::Float(f) => Some(float_code(*f)),
        CellValue::String(s) => canonical_code_text(s),
    }
}

/// Canonical form of a textual classification code
#[must_use]
pub fn canonical_code_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match ZERO_FRACTION.captures(trimmed) {
        Some(caps) => {
            let digits = &caps[1];
            let unsigned = digits.trim_start_matches('-');
            // negative zero has no sign
            if unsigned.bytes().all(|b| b == b'0') {
                Some(unsigned.to_string())
            } else {
                Some(digits.to_string())
            }
        }
        None => Some(trimmed.to_string()),
    }
}

fn float_code(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// Which rows of a region qualify.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClassificationFilter {
    /// Take the first row of the region, whatever its classification.
    #[default]
    FirstMatch,
    /// Require the classification cell to equal this canonical code.
    Code(String),
}

impl ClassificationFilter {
    /// Build a code filter from text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFilter` when the code is empty.
    pub fn code(raw: &str) -> Result<Self> {
        canonical_code_text(raw)
            .map(ClassificationFilter::Code)
            .ok_or_else(|| ExtractError::InvalidFilter(format!("empty classification code '{raw}'")))
    }

    /// Build a code filter from a cell value (e.g. numeric `0`).
    ///
    /// # Errors
    ///
    /// Returns `InvalidFilter` when the cell is empty.
    pub fn from_cell(cell: &CellValue) -> Result<Self> {
        canonical_code(cell)
            .map(ClassificationFilter::Code)
            .ok_or_else(|| ExtractError::InvalidFilter("empty classification cell".to_string()))
    }

    /// Check a classification cell against the filter
    #[must_use]
    pub fn matches(&self, cell: &CellValue) -> bool {
        match self {
            ClassificationFilter::FirstMatch => true,
            ClassificationFilter::Code(code) => canonical_code(cell).as_deref() == Some(code),
        }
    }
}

/// Column layout used to walk a table's data rows.
///
/// When several rows match the same region and classification, the first
/// one wins and later duplicates are ignored. Published figures depend on
/// this, so it is kept even where a later row looks like a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowLocator {
    pub region_column: usize,
    pub classification_column: Option<usize>,
    pub start_row: usize,
    /// Blank region cells inherit the region above (vertically merged cells)
    pub carry_region_down: bool,
}

impl RowLocator {
    #[must_use]
    pub fn new(region_column: usize, start_row: usize) -> Self {
        RowLocator {
            region_column,
            classification_column: None,
            start_row,
            carry_region_down: false,
        }
    }

    #[must_use]
    pub fn with_classification_column(mut self, column: usize) -> Self {
        self.classification_column = Some(column);
        self
    }

    #[must_use]
    pub fn with_carry_region_down(mut self, carry: bool) -> Self {
        self.carry_region_down = carry;
        self
    }

    /// First row for `region` passing `filter`, or `None` when the table has
    /// no data for it.
    #[must_use]
    pub fn locate(&self, table: &SheetTable, region: Region, filter: &ClassificationFilter) -> Option<usize> {
        self.matching_rows(table, filter)
            .find(|(_, found)| *found == region)
            .map(|(row, _)| row)
    }

    /// First qualifying row of every region present, in table order.
    #[must_use]
    pub fn locate_all(&self, table: &SheetTable, filter: &ClassificationFilter) -> IndexMap<Region, usize> {
        let mut rows = IndexMap::new();
        for (row, region) in self.matching_rows(table, filter) {
            rows.entry(region).or_insert(row);
        }
        rows
    }

    fn matching_rows<'a>(
        &'a self,
        table: &'a SheetTable,
        filter: &'a ClassificationFilter,
    ) -> impl Iterator<Item = (usize, Region)> + 'a {
        let mut carried: Option<Region> = None;
        (self.start_row..table.row_count()).filter_map(move |row| {
            let cell = table.cell(row, self.region_column);
            let region = if cell.is_blank() && self.carry_region_down {
                carried
            } else {
                let resolved = Region::normalize(&cell.as_str());
                carried = resolved;
                resolved
            }?;

            let matched = match self.classification_column {
                Some(col) => filter.matches(table.cell(row, col)),
                None => filter.matches(&CellValue::Null),
            };
            matched.then_some((row, region))
        })
    }
}

/// Find the first row for `region` at or after `start_row`.
///
/// A code filter with no classification column never matches.
#[must_use]
pub fn find_row(
    table: &SheetTable,
    region: Region,
    region_column: usize,
    classification_column: Option<usize>,
    filter: &ClassificationFilter,
    start_row: usize,
) -> Option<usize> {
    RowLocator {
        region_column,
        classification_column,
        start_row,
        carry_region_down: false,
    }
    .locate(table, region, filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SheetTable {
        SheetTable::from_rows(
            "고용률",
            vec![
                vec![CellValue::from("시도"), CellValue::from("구분"), CellValue::from("2025.2/4")],
                vec![CellValue::from("전국"), CellValue::Int(0), CellValue::Float(62.9)],
                vec![CellValue::from("서울특별시"), CellValue::Float(1.0), CellValue::Float(10.0)],
                vec![CellValue::from("서울특별시"), CellValue::Int(0), CellValue::Float(63.1)],
                vec![CellValue::from("서울특별시"), CellValue::from("0"), CellValue::Float(99.9)],
                vec![CellValue::from("주: 잠정"), CellValue::Int(0), CellValue::Float(1.0)],
                vec![CellValue::from("부산"), CellValue::from(" 0.0 "), CellValue::Float(58.2)],
            ],
        )
    }

    #[test]
    fn test_canonical_code() {
        assert_eq!(canonical_code(&CellValue::Int(0)), Some("0".to_string()));
        assert_eq!(canonical_code(&CellValue::Float(0.0)), Some("0".to_string()));
        assert_eq!(canonical_code(&CellValue::Float(-0.0)), Some("0".to_string()));
        assert_eq!(canonical_code(&CellValue::from("0.0")), Some("0".to_string()));
        assert_eq!(canonical_code(&CellValue::from(" 0 ")), Some("0".to_string()));
        assert_eq!(canonical_code(&CellValue::from("12.00")), Some("12".to_string()));
        assert_eq!(canonical_code(&CellValue::from("01")), Some("01".to_string()));
        assert_eq!(canonical_code(&CellValue::from("-0")), Some("0".to_string()));
        assert_eq!(canonical_code(&CellValue::from("-0.00")), Some("0".to_string()));
        assert_eq!(canonical_code(&CellValue::from("-3")), Some("-3".to_string()));
        assert_eq!(canonical_code_text("-0"), canonical_code(&CellValue::Float(-0.0)));
        assert_eq!(canonical_code(&CellValue::Float(1.5)), Some("1.5".to_string()));
        assert_eq!(canonical_code(&CellValue::from("C10")), Some("C10".to_string()));
        assert_eq!(canonical_code(&CellValue::from("  ")), None);
        assert_eq!(canonical_code(&CellValue::Null), None);
    }

    #[test]
    fn test_filter_construction() {
        assert_eq!(
            ClassificationFilter::code("0.0").unwrap(),
            ClassificationFilter::Code("0".to_string())
        );
        assert_eq!(
            ClassificationFilter::from_cell(&CellValue::Int(0)).unwrap(),
            ClassificationFilter::Code("0".to_string())
        );
        assert!(matches!(
            ClassificationFilter::code("  "),
            Err(ExtractError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_numeric_zero_matches_string_filter() {
        let filter = ClassificationFilter::code("0").unwrap();
        let row = find_row(&table(), Region::Seoul, 0, Some(1), &filter, 1);
        assert_eq!(row, Some(3));
    }

    #[test]
    fn test_first_match_ignores_classification() {
        let row = find_row(&table(), Region::Seoul, 0, Some(1), &ClassificationFilter::FirstMatch, 1);
        assert_eq!(row, Some(2));
    }

    #[test]
    fn test_later_duplicates_are_ignored() {
        let filter = ClassificationFilter::code("0").unwrap();
        let locator = RowLocator::new(0, 1).with_classification_column(1);
        let rows = locator.locate_all(&table(), &filter);

        assert_eq!(rows.get(&Region::Seoul), Some(&3));
        assert_eq!(rows.get(&Region::Nation), Some(&1));
        assert_eq!(rows.get(&Region::Busan), Some(&6));
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows.keys().copied().collect::<Vec<_>>(),
            vec![Region::Nation, Region::Seoul, Region::Busan]
        );
    }

    #[test]
    fn test_missing_region_is_none() {
        let filter = ClassificationFilter::code("0").unwrap();
        assert_eq!(find_row(&table(), Region::Jeju, 0, Some(1), &filter, 1), None);
    }

    #[test]
    fn test_start_row_skips_earlier_rows() {
        let row = find_row(&table(), Region::Seoul, 0, Some(1), &ClassificationFilter::FirstMatch, 4);
        assert_eq!(row, Some(4));
    }

    #[test]
    fn test_code_filter_without_column_never_matches() {
        let filter = ClassificationFilter::code("0").unwrap();
        assert_eq!(find_row(&table(), Region::Seoul, 0, None, &filter, 1), None);
    }

    #[test]
    fn test_carry_region_down() {
        let merged = SheetTable::from_rows(
            "산업별",
            vec![
                vec![CellValue::from("경기"), CellValue::from("계")],
                vec![CellValue::Null, CellValue::from("C")],
                vec![CellValue::from("강원"), CellValue::from("계")],
                vec![CellValue::Null, CellValue::from("C")],
                vec![CellValue::from("비고"), CellValue::from("계")],
                vec![CellValue::Null, CellValue::from("C")],
            ],
        );
        let filter = ClassificationFilter::code("C").unwrap();

        let plain = RowLocator::new(0, 0).with_classification_column(1);
        assert!(plain.locate_all(&merged, &filter).is_empty());

        let carrying = plain.with_carry_region_down(true);
        let rows = carrying.locate_all(&merged, &filter);
        assert_eq!(rows.get(&Region::Gyeonggi), Some(&1));
        assert_eq!(rows.get(&Region::Gangwon), Some(&3));
        // An unrecognized label stops the carry
        assert_eq!(rows.len(), 2);
    }
}
