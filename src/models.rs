use crate::error::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw row as read from the order spreadsheet. `order_date` is still text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawOrder {
    pub order_date: String,
    pub sales: f64,
    pub profit: f64,
    pub quantity: u64,
    pub category: String,
    pub sub_category: String,
    pub segment: String,
    pub product_name: String,
    pub ship_mode: String,
}

/// The dataset exactly as loaded, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<RawOrder>,
}

impl From<Vec<RawOrder>> for RawTable {
    fn from(rows: Vec<RawOrder>) -> Self {
        Self { rows }
    }
}

/// Normalized order (one row = one order line).
///
/// The period key is derived from `order_date` at construction and cannot be set on its own.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Order {
    pub order_date: NaiveDate,
    pub sales: f64,
    pub profit: f64,
    pub quantity: u64,
    pub category: String,
    pub sub_category: String,
    pub segment: String,
    pub product_name: String,
    pub ship_mode: String,
    period_key: String,
}

impl Order {
    pub(crate) fn from_raw(raw: RawOrder, order_date: NaiveDate) -> Self {
        Self {
            period_key: period_key(order_date),
            order_date,
            sales: raw.sales,
            profit: raw.profit,
            quantity: raw.quantity,
            category: raw.category,
            sub_category: raw.sub_category,
            segment: raw.segment,
            product_name: raw.product_name,
            ship_mode: raw.ship_mode,
        }
    }

    /// Year-month of the order date, e.g. `"2016-11"`.
    pub fn period_key(&self) -> &str {
        &self.period_key
    }
}

/// Format a date as its `YYYY-MM` period key.
pub fn period_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Normalized, read-only table of orders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<Order>,
}

impl Table {
    pub(crate) fn new(rows: Vec<Order>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Order] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Canonical form of a column header: trimmed, lowercase, spaces and dashes as `_`.
///
/// `"Sub-Category"` and `"sub category"` both become `"sub_category"`.
pub fn canonical_column(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Categorical (or period-derived) column used as a group-by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Year-month derived from the order date.
    Period,
    Category,
    SubCategory,
    Segment,
    ProductName,
    ShipMode,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Period,
        Dimension::Category,
        Dimension::SubCategory,
        Dimension::Segment,
        Dimension::ProductName,
        Dimension::ShipMode,
    ];

    /// Column name used in exports.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Period => "period_key",
            Dimension::Category => "category",
            Dimension::SubCategory => "sub_category",
            Dimension::Segment => "segment",
            Dimension::ProductName => "product_name",
            Dimension::ShipMode => "ship_mode",
        }
    }

    pub fn value(self, order: &Order) -> &str {
        match self {
            Dimension::Period => order.period_key(),
            Dimension::Category => &order.category,
            Dimension::SubCategory => &order.sub_category,
            Dimension::Segment => &order.segment,
            Dimension::ProductName => &order.product_name,
            Dimension::ShipMode => &order.ship_mode,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical_column(s).as_str() {
            "period_key" | "period" | "month_year" => Ok(Dimension::Period),
            "category" => Ok(Dimension::Category),
            "sub_category" => Ok(Dimension::SubCategory),
            "segment" => Ok(Dimension::Segment),
            "product_name" => Ok(Dimension::ProductName),
            "ship_mode" => Ok(Dimension::ShipMode),
            _ => Err(Error::invalid(format!("unknown dimension column `{s}`"))),
        }
    }
}

/// Numeric column summed within groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Sales,
    Profit,
    Quantity,
}

impl Metric {
    pub fn column(self) -> &'static str {
        match self {
            Metric::Sales => "sales",
            Metric::Profit => "profit",
            Metric::Quantity => "quantity",
        }
    }

    pub fn value(self, order: &Order) -> f64 {
        match self {
            Metric::Sales => order.sales,
            Metric::Profit => order.profit,
            Metric::Quantity => order.quantity as f64,
        }
    }

    /// Whether values are currency amounts (vs. whole units).
    pub fn is_currency(self) -> bool {
        !matches!(self, Metric::Quantity)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical_column(s).as_str() {
            "sales" => Ok(Metric::Sales),
            "profit" => Ok(Metric::Profit),
            "quantity" => Ok(Metric::Quantity),
            _ => Err(Error::invalid(format!("unknown metric column `{s}`"))),
        }
    }
}

/// Grouping key: one value per grouped dimension, in dimension order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey(pub Vec<String>);

impl GroupKey {
    pub fn of(dims: &[Dimension], order: &Order) -> Self {
        GroupKey(dims.iter().map(|d| d.value(order).to_string()).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" / "))
    }
}
