//! Period schema inference from free-text header cells.
//!
//! Statistical releases label their time columns inconsistently:
//! `2024.2/4`, `2024 3/4`, `2025. 1/4 p`, `2024년 4/4분기`, plain `2023`
//! and so on. [`PeriodIndex::parse_header`] scans one header row and maps
//! every recognizable label to its column.

use crate::cell::CellValue;
use crate::table::SheetTable;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Years outside this range are treated as ordinary numbers, not labels.
pub const YEAR_RANGE: std::ops::RangeInclusive<i64> = 2000..=2100;

lazy_static! {
    // "2024.2/4", "2024 3/4", "2025.2/4p", "2024년 4/4분기", "2024. 1/4 (잠정)"
    static ref QUARTER_LABEL: Regex = Regex::new(
        r"^(\d{4})\s*(?:년\s*|[.\s]+)([1-4])\s*/\s*4\s*(?:분기)?\s*(?:\(?[pP]\)?|\(?잠정\)?)?$"
    )
    .unwrap();

    // "2024", "2024년", "2024p", "2024 (p)"
    static ref YEAR_LABEL: Regex =
        Regex::new(r"^(\d{4})\s*(?:년)?\s*(?:\(?[pP]\)?|\(?잠정\)?)?$").unwrap();
}

/// A calendar quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearQuarter {
    pub year: i32,
    pub quarter: u8,
}

impl YearQuarter {
    /// Create a quarter; `None` unless `quarter` is 1 through 4.
    #[must_use]
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self { year, quarter })
    }

    /// Normalized header key, e.g. `"2025 2/4"`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{} {}/4", self.year, self.quarter)
    }

    /// Same quarter one year earlier.
    #[must_use]
    pub fn previous_year(&self) -> Self {
        Self {
            year: self.year - 1,
            quarter: self.quarter,
        }
    }

    /// The quarter immediately before this one.
    #[must_use]
    pub fn previous_quarter(&self) -> Self {
        if self.quarter == 1 {
            Self {
                year: self.year - 1,
                quarter: 4,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter - 1,
            }
        }
    }
}

impl fmt::Display for YearQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/4", self.year, self.quarter)
    }
}

impl FromStr for YearQuarter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_quarter_label(s).ok_or_else(|| format!("not a quarter label: '{s}'"))
    }
}

/// Either an annual or a quarterly period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKey {
    Year(i32),
    Quarter(YearQuarter),
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Year(year) => write!(f, "{year}"),
            PeriodKey::Quarter(q) => write!(f, "{q}"),
        }
    }
}

/// Which earlier period a figure is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    YearOnYear,
    QuarterOnQuarter,
}

impl Comparison {
    /// The period `target` is compared against.
    ///
    /// Annual periods always compare with the previous year.
    #[must_use]
    pub fn comparison_period(self, target: PeriodKey) -> PeriodKey {
        match (self, target) {
            (_, PeriodKey::Year(year)) => PeriodKey::Year(year - 1),
            (Comparison::YearOnYear, PeriodKey::Quarter(q)) => PeriodKey::Quarter(q.previous_year()),
            (Comparison::QuarterOnQuarter, PeriodKey::Quarter(q)) => {
                PeriodKey::Quarter(q.previous_quarter())
            }
        }
    }

    /// Column distance assumed between a period and its comparison period
    /// when the header cannot be read.
    #[must_use]
    pub fn fallback_offset(self, target: PeriodKey) -> usize {
        match (self, target) {
            (Comparison::YearOnYear, PeriodKey::Quarter(_)) => 4,
            _ => 1,
        }
    }
}

/// Where a planned column index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSource {
    /// Read from a recognized header label.
    Header,
    /// Guessed from the rightmost column and a fixed offset.
    Fallback,
}

/// The pair of columns an extraction reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnPlan {
    pub current: usize,
    pub comparison: usize,
    pub current_source: ColumnSource,
    pub comparison_source: ColumnSource,
    /// Set whenever either column came from the offset fallback.
    pub approximate: bool,
}

/// Mapping from periods to columns for one header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodIndex {
    header_row: usize,
    years: BTreeMap<i32, usize>,
    quarters: BTreeMap<YearQuarter, usize>,
    rightmost: Option<usize>,
}

impl PeriodIndex {
    /// Scan `header_row` of `table` and record every year and quarter label.
    ///
    /// The leftmost column wins when a period label repeats.
    #[must_use]
    pub fn parse_header(table: &SheetTable, header_row: usize) -> Self {
        let mut index = PeriodIndex {
            header_row,
            ..PeriodIndex::default()
        };
        let cells = table.row(header_row).unwrap_or_default();

        for (col, cell) in cells.iter().enumerate() {
            if cell.is_blank() {
                continue;
            }
            index.rightmost = Some(col);

            if let Some(q) = quarter_of(cell) {
                index.quarters.entry(q).or_insert(col);
            } else if let Some(year) = year_of(cell) {
                index.years.entry(year).or_insert(col);
            }
        }

        if index.rightmost.is_none() && table.col_count() > 0 {
            index.rightmost = Some(table.col_count() - 1);
        }
        index
    }

    /// Header row this index was built from
    #[must_use]
    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// True when no period label was recognized
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() && self.quarters.is_empty()
    }

    #[must_use]
    pub fn year_column(&self, year: i32) -> Option<usize> {
        self.years.get(&year).copied()
    }

    #[must_use]
    pub fn quarter_column(&self, quarter: YearQuarter) -> Option<usize> {
        self.quarters.get(&quarter).copied()
    }

    /// Look up a normalized `"{year} {quarter}/4"` key (any accepted label
    /// spelling works too).
    #[must_use]
    pub fn column_for_key(&self, key: &str) -> Option<usize> {
        parse_quarter_label(key).and_then(|q| self.quarter_column(q))
    }

    #[must_use]
    pub fn column(&self, period: PeriodKey) -> Option<usize> {
        match period {
            PeriodKey::Year(year) => self.year_column(year),
            PeriodKey::Quarter(q) => self.quarter_column(q),
        }
    }

    /// `year → column`, ascending by year
    #[must_use]
    pub fn years(&self) -> &BTreeMap<i32, usize> {
        &self.years
    }

    /// `"{year} {quarter}/4" → column`, ascending by period
    #[must_use]
    pub fn quarter_keys(&self) -> Vec<(String, usize)> {
        self.quarters.iter().map(|(q, col)| (q.key(), *col)).collect()
    }

    /// Rightmost column with a non-empty header cell (or the last table
    /// column when the header row is blank).
    #[must_use]
    pub fn rightmost_column(&self) -> Option<usize> {
        self.rightmost
    }

    /// Pick the current and comparison columns for `target`.
    ///
    /// Labels found in the header are used as-is. A missing current period
    /// falls back to the rightmost column; a missing comparison period is
    /// taken [`Comparison::fallback_offset`] columns left of the current
    /// one. Either fallback marks the plan approximate. Returns `None` when
    /// not even the fallback yields two columns.
    #[must_use]
    pub fn plan(&self, target: PeriodKey, comparison: Comparison) -> Option<ColumnPlan> {
        let (current, current_source) = match self.column(target) {
            Some(col) => (col, ColumnSource::Header),
            None => (self.rightmost?, ColumnSource::Fallback),
        };

        let previous = comparison.comparison_period(target);
        let (comparison_col, comparison_source) = match self.column(previous) {
            Some(col) if current_source == ColumnSource::Header => (col, ColumnSource::Header),
            _ => (
                current.checked_sub(comparison.fallback_offset(target))?,
                ColumnSource::Fallback,
            ),
        };

        Some(ColumnPlan {
            current,
            comparison: comparison_col,
            current_source,
            comparison_source,
            approximate: current_source == ColumnSource::Fallback
                || comparison_source == ColumnSource::Fallback,
        })
    }
}

/// Parse a quarter header label such as `"2024.2/4"` or `"2025 2/4p"`.
#[must_use]
pub fn parse_quarter_label(text: &str) -> Option<YearQuarter> {
    let caps = QUARTER_LABEL.captures(text.trim())?;
    let year: i32 = caps[1].parse().ok()?;
    let quarter: u8 = caps[2].parse().ok()?;
    if !YEAR_RANGE.contains(&i64::from(year)) {
        return None;
    }
    YearQuarter::new(year, quarter)
}

/// Parse an annual header label such as `"2024"` or `"2024년"`.
#[must_use]
pub fn parse_year_label(text: &str) -> Option<i32> {
    let caps = YEAR_LABEL.captures(text.trim())?;
    let year: i64 = caps[1].parse().ok()?;
    in_year_range(year)
}

fn quarter_of(cell: &CellValue) -> Option<YearQuarter> {
    match cell {
        CellValue::String(s) => parse_quarter_label(s),
        _ => None,
    }
}

fn year_of(cell: &CellValue) -> Option<i32> {
    match cell {
        CellValue::Int(_) | CellValue::Float(_) => cell.as_int().and_then(in_year_range),
        CellValue::String(s) => parse_year_label(s),
        CellValue::Null | CellValue::Bool(_) => None,
    }
}

fn in_year_range(year: i64) -> Option<i32> {
    if YEAR_RANGE.contains(&year) {
        i32::try_from(year).ok()
    } else {
        None
    }
}
