//! Growth rates, differences and contributions.
//!
//! Every function is total over `Option<f64>`: a missing or non-finite input
//! yields `None`, never zero.

use crate::region::Region;
use regstat_sheet::CellValue;
use serde::{Deserialize, Serialize};

/// Round half away from zero to one decimal; `-0.0` becomes `0.0`.
#[must_use]
pub fn round1(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Percentage change from `previous` to `current`, one decimal.
///
/// A zero base has no defined growth rate.
#[must_use]
pub fn growth_rate(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let current = finite(current)?;
    let previous = finite(previous)?;
    if previous == 0.0 {
        return None;
    }
    Some(round1((current - previous) / previous.abs() * 100.0))
}

/// Change in level (percentage points for rates), one decimal.
#[must_use]
pub fn difference(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(round1(finite(current)? - finite(previous)?))
}

/// Weighted share of an aggregate's growth, unrounded.
#[must_use]
pub fn contribution(growth: Option<f64>, weight: Option<f64>) -> Option<f64> {
    Some(finite(growth)? * finite(weight)? / 100.0)
}

/// Read a figure out of a cell (placeholders such as `-` or `x` are `None`).
#[must_use]
pub fn cell_number(cell: &CellValue) -> Option<f64> {
    cell.as_number()
}

/// How a record's derived value is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    #[default]
    GrowthRate,
    Difference,
    Contribution,
}

/// One region's figures for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub region: Region,
    pub kind: MetricKind,
    pub value: Option<f64>,
    pub comparison_value: Option<f64>,
    /// Growth rate, difference or contribution, one decimal
    pub derived: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl MetricRecord {
    /// Build a record and compute its derived value.
    ///
    /// The derived value comes from the unrounded inputs; every stored
    /// figure is then rounded to one decimal. `weight` is only kept for
    /// contributions.
    #[must_use]
    pub fn compute(
        region: Region,
        kind: MetricKind,
        value: Option<f64>,
        comparison_value: Option<f64>,
        weight: Option<f64>,
    ) -> Self {
        let value = finite(value);
        let comparison_value = finite(comparison_value);
        let (derived, weight) = match kind {
            MetricKind::GrowthRate => (growth_rate(value, comparison_value), None),
            MetricKind::Difference => (difference(value, comparison_value), None),
            MetricKind::Contribution => {
                let growth = unrounded_growth(value, comparison_value);
                (contribution(growth, weight).map(round1), finite(weight))
            }
        };

        MetricRecord {
            region,
            kind,
            value: value.map(round1),
            comparison_value: comparison_value.map(round1),
            derived,
            weight: weight.map(round1),
        }
    }
}

fn unrounded_growth(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let current = current?;
    let previous = previous?;
    (previous != 0.0).then(|| (current - previous) / previous.abs() * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_rate() {
        assert_eq!(growth_rate(Some(110.0), Some(100.0)), Some(10.0));
        assert_eq!(growth_rate(Some(90.0), Some(100.0)), Some(-10.0));
        assert_eq!(growth_rate(Some(105.0), Some(-100.0)), Some(205.0));
        assert_eq!(growth_rate(Some(101.26), Some(100.0)), Some(1.3));
    }

    #[test]
    fn test_growth_rate_undefined() {
        assert_eq!(growth_rate(Some(5.0), Some(0.0)), None);
        assert_eq!(growth_rate(None, Some(100.0)), None);
        assert_eq!(growth_rate(Some(100.0), None), None);
        assert_eq!(growth_rate(Some(f64::NAN), Some(100.0)), None);
        assert_eq!(growth_rate(Some(100.0), Some(f64::INFINITY)), None);
    }

    #[test]
    fn test_difference() {
        assert_eq!(difference(Some(63.1), Some(62.5)), Some(0.6));
        assert_eq!(difference(Some(62.5), Some(63.1)), Some(-0.6));
        assert_eq!(difference(Some(1.0), Some(1.0)), Some(0.0));
        assert_eq!(difference(None, Some(1.0)), None);
        assert_eq!(difference(Some(1.0), None), None);
    }

    #[test]
    fn test_contribution() {
        assert_eq!(contribution(Some(10.0), Some(25.0)), Some(2.5));
        assert_eq!(contribution(None, Some(25.0)), None);
        assert_eq!(contribution(Some(10.0), None), None);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(0.25), 0.3);
        assert_eq!(round1(-0.25), -0.3);
        assert_eq!(round1(1.04), 1.0);
        assert!(round1(-0.04).is_sign_positive());
    }

    #[test]
    fn test_record_null_invariant() {
        let record = MetricRecord::compute(Region::Seoul, MetricKind::GrowthRate, Some(1.0), None, None);
        assert_eq!(record.derived, None);

        let record = MetricRecord::compute(Region::Seoul, MetricKind::GrowthRate, Some(1.0), Some(0.0), None);
        assert_eq!(record.derived, None);
        assert_eq!(record.comparison_value, Some(0.0));

        let record = MetricRecord::compute(Region::Seoul, MetricKind::Contribution, Some(1.0), Some(0.0), Some(30.0));
        assert_eq!(record.derived, None);
    }

    #[test]
    fn test_record_kinds() {
        let growth = MetricRecord::compute(Region::Busan, MetricKind::GrowthRate, Some(110.0), Some(100.0), Some(9.0));
        assert_eq!(growth.derived, Some(10.0));
        assert_eq!(growth.weight, None);

        let diff = MetricRecord::compute(Region::Busan, MetricKind::Difference, Some(58.2), Some(57.9), None);
        assert_eq!(diff.derived, Some(0.3));

        // 3.333...% growth at weight 45 is 1.5
        let contrib =
            MetricRecord::compute(Region::Busan, MetricKind::Contribution, Some(31.0), Some(30.0), Some(45.0));
        assert_eq!(contrib.derived, Some(1.5));
        assert_eq!(contrib.weight, Some(45.0));
    }

    #[test]
    fn test_record_rounds_stored_figures() {
        let diff = MetricRecord::compute(Region::Seoul, MetricKind::Difference, Some(63.14), Some(62.47), None);
        assert_eq!(diff.value, Some(63.1));
        assert_eq!(diff.comparison_value, Some(62.5));
        // 63.14 - 62.47 = 0.67, not 63.1 - 62.5
        assert_eq!(diff.derived, Some(0.7));

        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["value"], 63.1);
        assert_eq!(json["comparison_value"], 62.5);

        let contrib =
            MetricRecord::compute(Region::Busan, MetricKind::Contribution, Some(31.0), Some(30.0), Some(45.26));
        assert_eq!(contrib.weight, Some(45.3));
    }

    #[test]
    fn test_cell_number_placeholders() {
        assert_eq!(cell_number(&CellValue::from("-")), None);
        assert_eq!(cell_number(&CellValue::from("x")), None);
        assert_eq!(cell_number(&CellValue::from("…")), None);
        assert_eq!(cell_number(&CellValue::Null), None);
        assert_eq!(cell_number(&CellValue::from("1,234.5")), Some(1234.5));
        assert_eq!(cell_number(&CellValue::Int(7)), Some(7.0));
    }

    #[test]
    fn test_record_serializes_nulls() {
        let record = MetricRecord::compute(Region::Jeju, MetricKind::Difference, None, Some(1.0), None);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["region"], "제주");
        assert_eq!(json["kind"], "difference");
        assert!(json["value"].is_null());
        assert!(json["derived"].is_null());
        assert!(json.get("weight").is_none());
    }
}
