//! superstore
//!
//! A lightweight Rust library for loading, aggregating, exporting, and charting
//! retail "superstore" order data. Pairs with the `superstore` CLI.
//!
//! ### Features
//! - Load a CSV export of the order spreadsheet and normalize dates into year-month periods
//! - Group-and-aggregate primitives: sums, counts, ratios, top-N rankings
//! - A closed set of named report views (sales trend, profit by category, top products, ...)
//! - Locale-aware text tables, CSV/JSON export, and SVG/PNG charts
//!
//! ### Example
//! ```no_run
//! use superstore::{Session, View};
//!
//! let session = Session::open("superstore_sales.csv")?;
//! let output = session.compute(View::SalesByCategory)?;
//! println!("{}", superstore::report::render(View::SalesByCategory, &output, "en"));
//! superstore::storage::save_json(&output, "sales_by_category.json")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregate;
pub mod error;
pub mod models;
pub mod report;
pub mod session;
pub mod storage;
pub mod views;
pub mod viz;

pub use error::{Error, Result};
pub use models::{Dimension, GroupKey, Metric, Order, Table};
pub use session::Session;
pub use views::{View, ViewOutput};
