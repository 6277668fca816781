//! Indicator definitions and engine settings loaded from YAML.

use crate::assemble::GroupDefinition;
use crate::error::{ExtractError, Result};
use crate::extract::ExtractionRequest;
use crate::locator::{ClassificationFilter, RowLocator};
use crate::metric::MetricKind;
use crate::region::Region;
use indexmap::IndexMap;
use regstat_sheet::{CellValue, Comparison, PeriodKey, WorkbookCache, DEFAULT_MTIME_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    /// Geographic groups; the standard seven when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<IndexMap<String, Vec<Region>>>,
    #[serde(default = "default_true")]
    pub include_nation: bool,
    #[serde(default)]
    pub indicators: IndexMap<String, IndicatorSpec>,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache: CacheConfig::default(),
            ranking: RankingConfig::default(),
            groups: None,
            include_nation: true,
            indicators: IndexMap::new(),
        }
    }
}

/// Workbook cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default = "default_tolerance_ms")]
    pub mtime_tolerance_ms: u64,
}

fn default_tolerance_ms() -> u64 {
    DEFAULT_MTIME_TOLERANCE.as_millis() as u64
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            mtime_tolerance_ms: default_tolerance_ms(),
        }
    }
}

impl CacheConfig {
    /// A fresh cache with the configured tolerance.
    #[must_use]
    pub fn build_cache(&self) -> WorkbookCache {
        WorkbookCache::with_tolerance(Duration::from_millis(self.mtime_tolerance_ms))
    }
}

/// Ranking settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RankingConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    3
}

impl Default for RankingConfig {
    fn default() -> Self {
        RankingConfig {
            top_n: default_top_n(),
        }
    }
}

/// Where one indicator lives in a workbook and how it is compared.
///
/// Row and column indices are zero-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndicatorSpec {
    /// Key of the indicator in the configuration
    #[serde(skip)]
    pub name: String,
    pub sheet: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sheet_aliases: Vec<String>,
    pub header_row: usize,
    /// First data row; the row after the header when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_start_row: Option<usize>,
    #[serde(default)]
    pub region_column: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_column: Option<usize>,
    /// Classification code, as text or number; first match when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<CellValue>,
    #[serde(default)]
    pub metric: MetricKind,
    #[serde(default)]
    pub comparison: Comparison,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_column: Option<usize>,
    #[serde(default)]
    pub carry_region_down: bool,
}

impl IndicatorSpec {
    #[must_use]
    pub fn new(name: &str, sheet: &str, header_row: usize) -> Self {
        IndicatorSpec {
            name: name.to_string(),
            sheet: sheet.to_string(),
            sheet_aliases: Vec::new(),
            header_row,
            data_start_row: None,
            region_column: 0,
            classification_column: None,
            classification: None,
            metric: MetricKind::default(),
            comparison: Comparison::default(),
            weight_column: None,
            carry_region_down: false,
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.sheet_aliases.push(alias.to_string());
        self
    }

    #[must_use]
    pub fn with_region_column(mut self, column: usize) -> Self {
        self.region_column = column;
        self
    }

    #[must_use]
    pub fn with_data_start_row(mut self, row: usize) -> Self {
        self.data_start_row = Some(row);
        self
    }

    #[must_use]
    pub fn with_classification(mut self, column: usize, code: impl Into<CellValue>) -> Self {
        self.classification_column = Some(column);
        self.classification = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    #[must_use]
    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    #[must_use]
    pub fn with_weight_column(mut self, column: usize) -> Self {
        self.weight_column = Some(column);
        self
    }

    #[must_use]
    pub fn with_carry_region_down(mut self, carry: bool) -> Self {
        self.carry_region_down = carry;
        self
    }

    /// Logical sheet names to try, primary first.
    pub fn sheet_candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.sheet.as_str()).chain(self.sheet_aliases.iter().map(String::as_str))
    }

    /// The classification filter rows must pass.
    pub fn filter(&self) -> Result<ClassificationFilter> {
        match &self.classification {
            None => Ok(ClassificationFilter::FirstMatch),
            Some(code) => ClassificationFilter::from_cell(code),
        }
    }

    #[must_use]
    pub fn locator(&self) -> RowLocator {
        RowLocator {
            region_column: self.region_column,
            classification_column: self.classification_column,
            start_row: self.data_start_row.unwrap_or(self.header_row + 1),
            carry_region_down: self.carry_region_down,
        }
    }

    /// Check the definition for contradictions.
    pub fn validate(&self) -> Result<()> {
        let name = &self.name;
        if self.sheet.trim().is_empty() {
            return Err(ExtractError::config(format!("indicator '{name}': empty sheet name")));
        }
        if self.metric == MetricKind::Contribution && self.weight_column.is_none() {
            return Err(ExtractError::config(format!(
                "indicator '{name}': contribution requires weight_column"
            )));
        }
        if self.classification.is_some() && self.classification_column.is_none() {
            return Err(ExtractError::config(format!(
                "indicator '{name}': classification given without classification_column"
            )));
        }
        if let Some(start) = self.data_start_row {
            if start <= self.header_row {
                return Err(ExtractError::config(format!(
                    "indicator '{name}': data_start_row {start} is not below header_row {}",
                    self.header_row
                )));
            }
        }
        self.filter()
            .map_err(|e| ExtractError::config(format!("indicator '{name}': {e}")))?;
        Ok(())
    }
}

impl EngineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config: EngineConfig = serde_yaml::from_str(yaml)?;
        for (name, spec) in &mut config.indicators {
            spec.name.clone_from(name);
        }
        config.validate()?;
        debug!("Loaded configuration with {} indicators", config.indicators.len());
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        for spec in self.indicators.values() {
            spec.validate()?;
        }
        if let Some(groups) = &self.groups {
            if let Some((name, _)) = groups.iter().find(|(_, members)| members.is_empty()) {
                return Err(ExtractError::config(format!("group '{name}' has no regions")));
            }
            if groups.values().flatten().any(|r| r.is_nation()) {
                return Err(ExtractError::config("the nation cannot be a group member"));
            }
        }
        Ok(())
    }

    pub fn indicator(&self, name: &str) -> Result<&IndicatorSpec> {
        self.indicators
            .get(name)
            .ok_or_else(|| ExtractError::UnknownIndicator(name.to_string()))
    }

    #[must_use]
    pub fn group_definition(&self) -> GroupDefinition {
        let groups = self
            .groups
            .clone()
            .unwrap_or_else(|| GroupDefinition::default().groups);
        GroupDefinition {
            include_nation: self.include_nation,
            groups,
        }
    }

    /// Build a request for a named indicator.
    pub fn request(&self, workbook: impl Into<PathBuf>, indicator: &str, period: PeriodKey) -> Result<ExtractionRequest> {
        let spec = self.indicator(indicator)?;
        Ok(ExtractionRequest::new(workbook, spec.clone(), period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
cache:
  mtime_tolerance_ms: 2500
ranking:
  top_n: 5
groups:
  수도권: [서울, 인천, 경기도]
  기타: [부산]
indicators:
  employment_rate:
    sheet: 고용률
    sheet_aliases: [시도별 고용률]
    header_row: 2
    data_start_row: 3
    region_column: 1
    classification_column: 2
    classification: 0
    metric: difference
  retail_sales:
    sheet: 소매판매
    header_row: 0
    comparison: quarter_on_quarter
    carry_region_down: true
"#;

    #[test]
    fn test_parse_sample() {
        let config = EngineConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.cache.mtime_tolerance_ms, 2500);
        assert_eq!(config.ranking.top_n, 5);
        assert_eq!(config.indicators.len(), 2);

        let employment = config.indicator("employment_rate").unwrap();
        assert_eq!(employment.name, "employment_rate");
        assert_eq!(employment.metric, MetricKind::Difference);
        assert_eq!(employment.comparison, Comparison::YearOnYear);
        assert_eq!(employment.filter().unwrap(), ClassificationFilter::Code("0".to_string()));
        assert_eq!(
            employment.sheet_candidates().collect::<Vec<_>>(),
            vec!["고용률", "시도별 고용률"]
        );

        let retail = config.indicator("retail_sales").unwrap();
        assert_eq!(retail.metric, MetricKind::GrowthRate);
        assert_eq!(retail.comparison, Comparison::QuarterOnQuarter);
        assert_eq!(retail.filter().unwrap(), ClassificationFilter::FirstMatch);
        assert_eq!(retail.locator().start_row, 1);
        assert!(retail.locator().carry_region_down);
    }

    #[test]
    fn test_groups_from_config() {
        let config = EngineConfig::from_yaml_str(SAMPLE).unwrap();
        let groups = config.group_definition();
        assert_eq!(groups.groups.len(), 2);
        assert_eq!(
            groups.groups["수도권"],
            vec![Region::Seoul, Region::Incheon, Region::Gyeonggi]
        );
        assert!(groups.include_nation);
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_yaml_str("indicators: {}").unwrap();
        assert_eq!(config.cache.mtime_tolerance_ms, 1000);
        assert_eq!(config.ranking.top_n, 3);
        assert_eq!(config.group_definition(), GroupDefinition::default());
        assert_eq!(config.cache.build_cache().tolerance(), Duration::from_secs(1));
    }

    #[test]
    fn test_text_and_numeric_codes_agree() {
        let text = IndicatorSpec::new("a", "고용률", 0).with_classification(1, "0.0");
        let number = IndicatorSpec::new("a", "고용률", 0).with_classification(1, 0_i64);
        assert_eq!(text.filter().unwrap(), number.filter().unwrap());
    }

    #[test]
    fn test_contribution_requires_weight() {
        let yaml = "indicators:\n  cpi:\n    sheet: 물가\n    header_row: 0\n    metric: contribution\n";
        let err = EngineConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ExtractError::Config(msg) if msg.contains("weight_column")));
    }

    #[test]
    fn test_empty_code_rejected() {
        let yaml = "indicators:\n  x:\n    sheet: 고용률\n    header_row: 0\n    classification_column: 1\n    classification: \"  \"\n";
        let err = EngineConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }

    #[test]
    fn test_code_without_column_rejected() {
        let spec = IndicatorSpec {
            classification: Some(CellValue::from("0")),
            ..IndicatorSpec::new("x", "고용률", 0)
        };
        assert!(matches!(spec.validate(), Err(ExtractError::Config(_))));
    }

    #[test]
    fn test_unknown_region_in_groups() {
        let yaml = "groups:\n  권역: [서울, 수도권]\n";
        assert!(matches!(
            EngineConfig::from_yaml_str(yaml),
            Err(ExtractError::Yaml(_))
        ));
    }

    #[test]
    fn test_unknown_indicator() {
        let config = EngineConfig::default();
        assert!(matches!(
            config.indicator("missing"),
            Err(ExtractError::UnknownIndicator(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_request_for_indicator() {
        let config = EngineConfig::from_yaml_str(SAMPLE).unwrap();
        let period = PeriodKey::Quarter("2025 2/4".parse().unwrap());
        let request = config.request("raw.xlsx", "employment_rate", period).unwrap();
        assert_eq!(request.indicator.name, "employment_rate");
        assert_eq!(request.period, period);
        assert!(request.allow_approximate);
        assert!(!request.strict().allow_approximate);
    }
}
