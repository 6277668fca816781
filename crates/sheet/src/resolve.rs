//! Logical sheet name resolution.
//!
//! Releases rename sheets freely (`고용률`, `시도별 고용률(15세 이상)`,
//! `2. 고용률 `), so a requested name is matched in three passes: exact,
//! all-keywords on normalized text, then any-keyword.

use serde::Serialize;

/// How a logical name was matched to an actual sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Normalized,
    Partial,
}

/// Outcome of resolving a logical sheet name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetMatch {
    /// Actual sheet name in the workbook
    pub name: String,
    pub strategy: MatchStrategy,
    /// Matched keyword length over normalized sheet name length
    pub score: f64,
}

/// Lower-case `name` and drop whitespace, brackets and punctuation.
#[must_use]
pub fn normalize_sheet_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split a logical name into normalized keywords.
///
/// `"시도별 고용률(15세이상)"` yields `["시도별", "고용률", "15세이상"]`.
/// Duplicates are dropped, order is kept.
#[must_use]
pub fn sheet_keywords(logical_name: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for part in logical_name.split(|c: char| !c.is_alphanumeric()) {
        let keyword = normalize_sheet_name(part);
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }
    keywords
}

/// Resolve `logical_name` against the workbook's `available` sheet names.
#[must_use]
pub fn resolve_sheet_name(logical_name: &str, available: &[String]) -> Option<SheetMatch> {
    if let Some(name) = available.iter().find(|name| name.as_str() == logical_name) {
        return Some(SheetMatch {
            name: name.clone(),
            strategy: MatchStrategy::Exact,
            score: 1.0,
        });
    }

    let keywords = sheet_keywords(logical_name);
    if keywords.is_empty() {
        return None;
    }

    best_candidate(&keywords, available, MatchStrategy::Normalized)
        .or_else(|| best_candidate(&keywords, available, MatchStrategy::Partial))
}

/// Highest-scoring candidate for one pass; ties keep workbook order.
fn best_candidate(
    keywords: &[String],
    available: &[String],
    strategy: MatchStrategy,
) -> Option<SheetMatch> {
    let mut best: Option<SheetMatch> = None;

    for name in available {
        let normalized = normalize_sheet_name(name);
        let length = normalized.chars().count();
        if length == 0 {
            continue;
        }

        let matched: Vec<&String> = keywords
            .iter()
            .filter(|kw| normalized.contains(kw.as_str()))
            .collect();
        let accepted = match strategy {
            MatchStrategy::Normalized => matched.len() == keywords.len(),
            MatchStrategy::Partial => !matched.is_empty(),
            MatchStrategy::Exact => false,
        };
        if !accepted {
            continue;
        }

        let matched_length: usize = matched.iter().map(|kw| kw.chars().count()).sum();
        let score = matched_length as f64 / length as f64;
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(SheetMatch {
                name: name.clone(),
                strategy,
                score,
            });
        }
    }

    best
}
