//! Region-grouped output tables and rankings.

use crate::metric::MetricRecord;
use crate::region::Region;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Ordered geographic groups used to lay out a regional table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    #[serde(default = "default_include_nation")]
    pub include_nation: bool,
    pub groups: IndexMap<String, Vec<Region>>,
}

fn default_include_nation() -> bool {
    true
}

impl Default for GroupDefinition {
    fn default() -> Self {
        let groups = [
            ("수도권", vec![Region::Seoul, Region::Incheon, Region::Gyeonggi]),
            (
                "충청권",
                vec![Region::Daejeon, Region::Sejong, Region::Chungbuk, Region::Chungnam],
            ),
            ("호남권", vec![Region::Gwangju, Region::Jeonbuk, Region::Jeonnam]),
            ("대경권", vec![Region::Daegu, Region::Gyeongbuk]),
            ("동남권", vec![Region::Busan, Region::Ulsan, Region::Gyeongnam]),
            ("강원권", vec![Region::Gangwon]),
            ("제주권", vec![Region::Jeju]),
        ];
        GroupDefinition {
            include_nation: true,
            groups: groups
                .into_iter()
                .map(|(name, members)| (name.to_string(), members))
                .collect(),
        }
    }
}

impl GroupDefinition {
    /// Group containing `region`, if any
    #[must_use]
    pub fn group_of(&self, region: Region) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, members)| members.contains(&region))
            .map(|(name, _)| name.as_str())
    }
}

/// One rendered row of a regional table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRow {
    pub region: Region,
    pub display_name: String,
    /// Set on the first row of a group only
    pub group_name: Option<String>,
    /// Number of rows the group label spans; first row of a group only
    pub group_span: Option<usize>,
    pub metrics: Vec<MetricRecord>,
}

/// Rows in output order: nation first, then each group's members.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionGroupTable {
    pub rows: Vec<RegionRow>,
}

impl RegionGroupTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn row(&self, region: Region) -> Option<&RegionRow> {
        self.rows.iter().find(|row| row.region == region)
    }
}

/// Lay `records` out by geographic group.
///
/// Every group member gets a row, with empty `metrics` when no record
/// exists for it, so a group's span always equals its rendered rows.
/// Members are listed in canonical region order. A group with no members
/// besides the nation is skipped, so every rendered group has a span row.
#[must_use]
pub fn assemble(records: &[MetricRecord], groups: &GroupDefinition) -> RegionGroupTable {
    let metrics_for = |region: Region| -> Vec<MetricRecord> {
        records.iter().filter(|r| r.region == region).cloned().collect()
    };

    let mut rows = Vec::new();
    if groups.include_nation {
        rows.push(RegionRow {
            region: Region::Nation,
            display_name: Region::Nation.short_name().to_string(),
            group_name: None,
            group_span: None,
            metrics: metrics_for(Region::Nation),
        });
    }

    for (name, members) in &groups.groups {
        let mut members: Vec<Region> = members.iter().copied().filter(|r| !r.is_nation()).collect();
        members.sort();
        members.dedup();
        if members.is_empty() {
            warn!("Group '{}' has no regions, skipping", name);
            continue;
        }

        let span = members.len();
        for (i, region) in members.into_iter().enumerate() {
            let first = i == 0;
            rows.push(RegionRow {
                region,
                display_name: region.short_name().to_string(),
                group_name: first.then(|| name.clone()),
                group_span: first.then_some(span),
                metrics: metrics_for(region),
            });
        }
    }

    RegionGroupTable { rows }
}

/// Ranking direction for [`top_n_by_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increase,
    Decrease,
}

/// The `n` records with the largest (or smallest) derived values.
///
/// Records without a derived value are dropped. Ties keep input order.
#[must_use]
pub fn top_n_by_value(records: &[MetricRecord], n: usize, direction: Direction) -> Vec<MetricRecord> {
    let mut ranked: Vec<(f64, &MetricRecord)> = records
        .iter()
        .filter_map(|r| r.derived.map(|value| (value, r)))
        .collect();

    match direction {
        Direction::Increase => ranked.sort_by(|a, b| b.0.total_cmp(&a.0)),
        Direction::Decrease => ranked.sort_by(|a, b| a.0.total_cmp(&b.0)),
    }

    ranked.into_iter().take(n).map(|(_, r)| r.clone()).collect()
}
