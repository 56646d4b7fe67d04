//! Group-and-aggregate primitives over a normalized [`Table`].
//!
//! Every function here is pure: it reads the table and returns a fresh result. Results
//! carry one row per distinct grouping key, in ascending key order.

use crate::error::{Error, Result};
use crate::models::{Dimension, GroupKey, Metric, Table};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// What the value column of a [`Series`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Sum(Metric),
    Count,
}

impl Measure {
    /// Column name used in exports (`sales`, `profit`, `quantity`, `count`).
    pub fn column(self) -> &'static str {
        match self {
            Measure::Sum(m) => m.column(),
            Measure::Count => "count",
        }
    }

    pub fn is_currency(self) -> bool {
        match self {
            Measure::Sum(m) => m.is_currency(),
            Measure::Count => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub key: GroupKey,
    pub value: f64,
}

/// Labeled series: grouping keys and one numeric value per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub dimensions: Vec<Dimension>,
    pub measure: Measure,
    pub rows: Vec<SeriesRow>,
}

impl Series {
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }

    pub fn get(&self, key: &[&str]) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.key.0.iter().map(String::as_str).eq(key.iter().copied()))
            .map(|r| r.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

/// Result of dividing two group sums.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Defined(f64),
    /// Denominator sum was exactly zero.
    Undefined,
}

impl Ratio {
    pub fn of(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Ratio::Undefined
        } else {
            Ratio::Defined(numerator / denominator)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(v),
            Ratio::Undefined => None,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Defined(v) => write!(f, "{v}"),
            Ratio::Undefined => f.write_str("undefined"),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Ratio::Defined(v) => serializer.serialize_f64(*v),
            Ratio::Undefined => serializer.serialize_str("undefined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioRow {
    pub key: GroupKey,
    pub numerator: f64,
    pub denominator: f64,
    pub ratio: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioTable {
    pub dimensions: Vec<Dimension>,
    pub numerator: Metric,
    pub denominator: Metric,
    pub rows: Vec<RatioRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualRow {
    pub key: GroupKey,
    pub values: [f64; 2],
}

/// Two metrics summed side by side per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualTable {
    pub dimensions: Vec<Dimension>,
    pub metrics: [Metric; 2],
    pub rows: Vec<DualRow>,
}

fn check_dims(dims: &[Dimension]) -> Result<()> {
    if dims.is_empty() || dims.len() > 2 {
        return Err(Error::invalid(format!(
            "expected one or two grouping dimensions, got {}",
            dims.len()
        )));
    }
    if dims.len() == 2 && dims[0] == dims[1] {
        return Err(Error::invalid(format!("dimension `{}` given twice", dims[0])));
    }
    Ok(())
}

/// Fold every row into its group, accumulating `N` values per group.
fn fold_groups<const N: usize>(
    table: &Table,
    dims: &[Dimension],
    pick: impl Fn(&crate::models::Order) -> [f64; N],
) -> BTreeMap<GroupKey, [f64; N]> {
    let mut groups: BTreeMap<GroupKey, [f64; N]> = BTreeMap::new();
    for order in table.rows() {
        let acc = groups.entry(GroupKey::of(dims, order)).or_insert([0.0; N]);
        for (slot, v) in acc.iter_mut().zip(pick(order)) {
            *slot += v;
        }
    }
    groups
}

/// Sum `metric` within each distinct value of `dims`.
pub fn sum_by(table: &Table, dims: &[Dimension], metric: Metric) -> Result<Series> {
    check_dims(dims)?;
    let rows = fold_groups(table, dims, |o| [metric.value(o)])
        .into_iter()
        .map(|(key, [value])| SeriesRow { key, value })
        .collect();
    Ok(Series {
        dimensions: dims.to_vec(),
        measure: Measure::Sum(metric),
        rows,
    })
}

/// Number of rows within each distinct value of `dims`.
pub fn count_by(table: &Table, dims: &[Dimension]) -> Result<Series> {
    check_dims(dims)?;
    let rows = fold_groups(table, dims, |_| [1.0])
        .into_iter()
        .map(|(key, [value])| SeriesRow { key, value })
        .collect();
    Ok(Series {
        dimensions: dims.to_vec(),
        measure: Measure::Count,
        rows,
    })
}

/// The `n` groups with the largest (or smallest) summed `metric`.
///
/// Sorting is stable, so equal sums keep the key order produced by [`sum_by`].
pub fn rank_top_n(
    table: &Table,
    dims: &[Dimension],
    metric: Metric,
    n: usize,
    order: SortOrder,
) -> Result<Series> {
    if n == 0 {
        return Err(Error::invalid("top-N count must be positive"));
    }
    let mut series = sum_by(table, dims, metric)?;
    match order {
        SortOrder::Descending => series.rows.sort_by(|a, b| b.value.total_cmp(&a.value)),
        SortOrder::Ascending => series.rows.sort_by(|a, b| a.value.total_cmp(&b.value)),
    }
    series.rows.truncate(n);
    Ok(series)
}

/// Per-group `numerator` and `denominator` sums and their ratio.
pub fn ratio_by(
    table: &Table,
    dims: &[Dimension],
    numerator: Metric,
    denominator: Metric,
) -> Result<RatioTable> {
    check_dims(dims)?;
    let rows = fold_groups(table, dims, |o| [numerator.value(o), denominator.value(o)])
        .into_iter()
        .map(|(key, [num, den])| RatioRow {
            key,
            numerator: num,
            denominator: den,
            ratio: Ratio::of(num, den),
        })
        .collect();
    Ok(RatioTable {
        dimensions: dims.to_vec(),
        numerator,
        denominator,
        rows,
    })
}

/// Sum two distinct metrics per group.
pub fn dual_metric_group(
    table: &Table,
    dims: &[Dimension],
    metrics: [Metric; 2],
) -> Result<DualTable> {
    check_dims(dims)?;
    if metrics[0] == metrics[1] {
        return Err(Error::invalid(format!(
            "dual metric grouping needs two different metrics, got `{}` twice",
            metrics[0]
        )));
    }
    let rows = fold_groups(table, dims, |o| [metrics[0].value(o), metrics[1].value(o)])
        .into_iter()
        .map(|(key, values)| DualRow { key, values })
        .collect();
    Ok(DualTable {
        dimensions: dims.to_vec(),
        metrics,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_sentinel_only_for_exact_zero() {
        assert_eq!(Ratio::of(10.0, 0.0), Ratio::Undefined);
        assert_eq!(Ratio::of(0.0, 4.0), Ratio::Defined(0.0));
        assert_eq!(Ratio::of(-3.0, 1.5).value(), Some(-2.0));
        assert_eq!(Ratio::Undefined.to_string(), "undefined");
    }

    #[test]
    fn dimension_arity_is_checked() {
        let t = Table::default();
        assert!(matches!(
            sum_by(&t, &[], Metric::Sales),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            count_by(&t, &[Dimension::Segment, Dimension::Segment]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            sum_by(
                &t,
                &[Dimension::Category, Dimension::SubCategory, Dimension::Segment],
                Metric::Sales
            ),
            Err(Error::InvalidInput(_))
        ));
    }
}
