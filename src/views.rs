//! The named report views and the aggregation call behind each one.

use crate::aggregate::{
    DualTable, RatioTable, Series, SortOrder, count_by, dual_metric_group, rank_top_n, ratio_by,
    sum_by,
};
use crate::error::Result;
use crate::models::{Dimension, Metric, Table};
use clap::ValueEnum;
use serde::Serialize;

/// Row limit for the ranking views.
pub const TOP_N: usize = 10;

/// One panel of the sales dashboard. Variants are listed in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    /// Total sales per month
    OverallTrend,
    /// Total sales per category
    SalesByCategory,
    /// Total sales per sub-category
    SalesBySubCategory,
    /// Total profit per month
    MonthlyProfit,
    /// Total profit per category
    ProfitByCategory,
    /// Total profit per sub-category
    ProfitBySubCategory,
    /// Sales and profit side by side per customer segment
    SegmentSalesProfit,
    /// Sales-to-profit ratio per customer segment
    SegmentSalesToProfit,
    /// Ten products with the highest sales
    TopProductsBySales,
    /// Ten products with the most units sold
    MostSellingProducts,
    /// Ten most profitable category / sub-category pairs
    MostProfitableCategories,
    /// Number of orders per ship mode
    ShipModePreference,
}

/// How a view is best drawn; `None` from [`View::chart_kind`] means table only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    GroupedBar,
}

/// Data produced by a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewOutput {
    Series(Series),
    Dual(DualTable),
    Ratio(RatioTable),
}

impl ViewOutput {
    pub fn len(&self) -> usize {
        match self {
            ViewOutput::Series(s) => s.rows.len(),
            ViewOutput::Dual(d) => d.rows.len(),
            ViewOutput::Ratio(r) => r.rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_series(&self) -> Option<&Series> {
        match self {
            ViewOutput::Series(s) => Some(s),
            _ => None,
        }
    }
}

impl View {
    pub const ALL: [View; 12] = [
        View::OverallTrend,
        View::SalesByCategory,
        View::SalesBySubCategory,
        View::MonthlyProfit,
        View::ProfitByCategory,
        View::ProfitBySubCategory,
        View::SegmentSalesProfit,
        View::SegmentSalesToProfit,
        View::TopProductsBySales,
        View::MostSellingProducts,
        View::MostProfitableCategories,
        View::ShipModePreference,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::OverallTrend => "Overall Sales Trend",
            View::SalesByCategory => "Sales by Category",
            View::SalesBySubCategory => "Sales by Sub-Category",
            View::MonthlyProfit => "Monthly Profits",
            View::ProfitByCategory => "Profit by Category",
            View::ProfitBySubCategory => "Profit by Sub-Category",
            View::SegmentSalesProfit => "Sales and Profit by Customer Segment",
            View::SegmentSalesToProfit => "Sales to Profit Ratio",
            View::TopProductsBySales => "Top 10 Products by Sales",
            View::MostSellingProducts => "Most Selling Products",
            View::MostProfitableCategories => "Most Profitable Category and Sub-Category",
            View::ShipModePreference => "Most Preferred Ship Mode",
        }
    }

    /// Command-line name, e.g. `sales-by-category`.
    pub fn slug(self) -> String {
        self.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default()
    }

    pub fn chart_kind(self) -> Option<ChartKind> {
        match self {
            View::OverallTrend | View::MonthlyProfit => Some(ChartKind::Line),
            View::SalesByCategory
            | View::SalesBySubCategory
            | View::ProfitByCategory
            | View::ProfitBySubCategory
            | View::ShipModePreference => Some(ChartKind::Bar),
            View::SegmentSalesProfit => Some(ChartKind::GroupedBar),
            View::SegmentSalesToProfit
            | View::TopProductsBySales
            | View::MostSellingProducts
            | View::MostProfitableCategories => None,
        }
    }

    /// Run the view's aggregation against `table`.
    pub fn compute(self, table: &Table) -> Result<ViewOutput> {
        use Dimension::*;
        log::debug!("computing view {} over {} rows", self.slug(), table.len());
        let out = match self {
            View::OverallTrend => ViewOutput::Series(sum_by(table, &[Period], Metric::Sales)?),
            View::SalesByCategory => ViewOutput::Series(sum_by(table, &[Category], Metric::Sales)?),
            View::SalesBySubCategory => {
                ViewOutput::Series(sum_by(table, &[SubCategory], Metric::Sales)?)
            }
            View::MonthlyProfit => ViewOutput::Series(sum_by(table, &[Period], Metric::Profit)?),
            View::ProfitByCategory => {
                ViewOutput::Series(sum_by(table, &[Category], Metric::Profit)?)
            }
            View::ProfitBySubCategory => {
                ViewOutput::Series(sum_by(table, &[SubCategory], Metric::Profit)?)
            }
            View::SegmentSalesProfit => ViewOutput::Dual(dual_metric_group(
                table,
                &[Segment],
                [Metric::Sales, Metric::Profit],
            )?),
            View::SegmentSalesToProfit => {
                ViewOutput::Ratio(ratio_by(table, &[Segment], Metric::Sales, Metric::Profit)?)
            }
            View::TopProductsBySales => ViewOutput::Series(rank_top_n(
                table,
                &[ProductName],
                Metric::Sales,
                TOP_N,
                SortOrder::Descending,
            )?),
            View::MostSellingProducts => ViewOutput::Series(rank_top_n(
                table,
                &[ProductName],
                Metric::Quantity,
                TOP_N,
                SortOrder::Descending,
            )?),
            View::MostProfitableCategories => ViewOutput::Series(rank_top_n(
                table,
                &[Category, SubCategory],
                Metric::Profit,
                TOP_N,
                SortOrder::Descending,
            )?),
            View::ShipModePreference => ViewOutput::Series(count_by(table, &[ShipMode])?),
        };
        Ok(out)
    }
}
