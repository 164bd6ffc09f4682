//! Brand picker options and the default selection each view starts with.

use crate::aggregate;
use crate::records::{Dimension, Measure, Record};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A picker option: brand name with its total spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandTotal {
    pub brand: String,
    pub total_spend: f64,
}

/// Distinct non-empty brands, alphabetical.
pub fn unique_brands<R: Record>(records: &[R]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.key(Dimension::Brand))
        .unique()
        .sorted()
        .map(str::to_string)
        .collect()
}

/// Every brand with its total spend, highest spend first. Equal totals stay
/// alphabetical.
pub fn brands_with_spend<R: Record>(records: &[R]) -> Vec<BrandTotal> {
    let totals = aggregate::aggregate_dimension(records, Dimension::Brand, Measure::Spend);
    let options: Vec<BrandTotal> = totals
        .into_iter()
        .sorted_by(|a, b| a.key.cmp(&b.key))
        .map(|row| BrandTotal {
            brand: row.key,
            total_spend: row.sum,
        })
        .collect();
    crate::derived::rank_by(options, |o: &BrandTotal| o.total_spend)
}

/// Preferred brand if one is present, otherwise the top spender.
///
/// `brands` is the alphabetical brand list; the first one whose name
/// contains `preferred` (case-insensitive) wins. `spend_by_brand` must be
/// ordered highest spend first.
pub fn default_selection(brands: &[String], spend_by_brand: &[BrandTotal], preferred: Option<&str>) -> Vec<String> {
    if brands.is_empty() {
        return Vec::new();
    }
    if let Some(needle) = preferred.map(str::to_lowercase).filter(|n| !n.is_empty()) {
        if let Some(hit) = brands.iter().find(|b| b.to_lowercase().contains(&needle)) {
            return vec![hit.clone()];
        }
    }
    spend_by_brand
        .first()
        .map(|top| vec![top.brand.clone()])
        .unwrap_or_default()
}

/// How a view seeds its brand picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy", content = "value")]
pub enum SelectionPolicy {
    /// Empty selection, i.e. all brands.
    AllBrands,
    /// `default_selection` with this needle.
    PreferredOrTop(String),
    /// The n highest spenders.
    TopBySpend(usize),
}

impl SelectionPolicy {
    pub fn resolve<R: Record>(&self, records: &[R]) -> Vec<String> {
        match self {
            SelectionPolicy::AllBrands => Vec::new(),
            SelectionPolicy::PreferredOrTop(needle) => {
                let brands = unique_brands(records);
                let spend = brands_with_spend(records);
                default_selection(&brands, &spend, Some(needle.as_str()))
            }
            SelectionPolicy::TopBySpend(n) => brands_with_spend(records)
                .into_iter()
                .take(*n)
                .map(|o| o.brand)
                .collect(),
        }
    }
}
