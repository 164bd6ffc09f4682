//! Marketing spend and engagement rollups.
//!
//! Loads advertising-spend, social and review CSV exports and computes the
//! cross-filtered aggregates a dashboard renders: raw records go through
//! `filter` → `aggregate` → `derived`, and the `reports` builders assemble
//! those into per-view results.

pub mod aggregate;
pub mod config;
pub mod data_utils;
pub mod derived;
pub mod error;
pub mod filter;
pub mod format;
pub mod ingestion;
pub mod memo;
pub mod observability;
pub mod records;
pub mod reports;
pub mod selection;

pub use aggregate::{aggregate_by, aggregate_dimension, rollup, AggregateRow, RollupRow};
pub use config::DashboardConfig;
pub use derived::{top_n, top_n_by, with_percentages, year_over_year, DerivedRow};
pub use error::{Result, RollupError};
pub use filter::{filter_records, FilterSpec};
pub use ingestion::{Dataset, LoadState};
pub use memo::RollupMemo;
pub use records::{Dimension, Measure, Platform, ProductRow, Record, ReviewRow, SocialPost, SpendRecord};
pub use selection::{brands_with_spend, default_selection, BrandTotal, SelectionPolicy};
