use serde::{Deserialize, Serialize};
use std::fmt;

/// A single decoded cell of a statistical sheet.
///
/// No header interpretation happens at this level; a cell is whatever the
/// workbook stored, minus formulas (only cached results are read).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Shared empty cell handed out for out-of-range lookups.
pub(crate) static NULL_CELL: CellValue = CellValue::Null;

impl CellValue {
    /// Check if the value is null or whitespace-only text
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Try to get the value as an integer.
    ///
    /// Floats only convert when they carry no fractional part, so `2024.0`
    /// is a year but `2024.5` is not.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            CellValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read the cell as a statistical figure.
    ///
    /// Publication tables mark suppressed or unavailable figures with `-`,
    /// `…`, `x` and similar placeholders; all of those are `None`. Thousands
    /// separators are tolerated. Booleans are never figures.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Float(f) => *f,
            CellValue::Int(i) => *i as f64,
            CellValue::String(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                cleaned.parse::<f64>().ok()?
            }
            CellValue::Bool(_) | CellValue::Null => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Get the value as a string
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(fl) => write!(f, "{fl}"),
            CellValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank() {
        assert!(CellValue::Null.is_blank());
        assert!(CellValue::from("   ").is_blank());
        assert!(!CellValue::Int(0).is_blank());
    }

    #[test]
    fn test_as_int_rejects_fractions() {
        assert_eq!(CellValue::Float(2024.0).as_int(), Some(2024));
        assert_eq!(CellValue::Float(2024.5).as_int(), None);
        assert_eq!(CellValue::from(" 2025 ").as_int(), Some(2025));
    }

    #[test]
    fn test_as_number_placeholders() {
        assert_eq!(CellValue::from("-").as_number(), None);
        assert_eq!(CellValue::from("…").as_number(), None);
        assert_eq!(CellValue::from("x").as_number(), None);
        assert_eq!(CellValue::Null.as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), None);
    }

    #[test]
    fn test_as_number_separators() {
        assert_eq!(CellValue::from("1,234.5").as_number(), Some(1234.5));
        assert_eq!(CellValue::Int(7).as_number(), Some(7.0));
        assert_eq!(CellValue::Float(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Int(42).to_string(), "42");
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::from("서울").as_str(), "서울");
    }
}
