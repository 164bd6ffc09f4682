//! Headline cards and facet options.

use crate::aggregate;
use crate::filter;
use crate::records::{Dimension, Measure, Record};
use itertools::Itertools;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralFigures {
    pub total_spend: f64,
    pub total_impressions: f64,
    pub unique_brands: usize,
    pub unique_publishers: usize,
}

/// Distinct non-empty values of `dimension`.
pub fn count_unique<R: Record>(records: &[R], dimension: Dimension) -> usize {
    records.iter().filter_map(|r| r.key(dimension)).unique().count()
}

pub fn general_figures<R: Record>(records: &[R]) -> GeneralFigures {
    GeneralFigures {
        total_spend: aggregate::total(records, Measure::Spend),
        total_impressions: aggregate::total(records, Measure::Impressions),
        unique_brands: count_unique(records, Dimension::Brand),
        unique_publishers: count_unique(records, Dimension::Publisher),
    }
}

/// Values offered by the year and month pickers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facets {
    pub years: Vec<String>,
    /// Restricted to the selected years.
    pub months: Vec<String>,
}

pub fn facets<R: Record>(records: &[R], selected_years: &[String]) -> Facets {
    Facets {
        years: filter::year_options(records),
        months: filter::month_options(records, selected_years),
    }
}
