//! Facet filtering: inclusion sets per dimension, applied before aggregation.

use crate::data_utils::MonthKey;
use crate::records::{Dimension, Record};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Selected values per dimension. A dimension with no selected values is
/// unrestricted, so `FilterSpec::default()` lets every record through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    selections: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection for `dimension`. Blank values are ignored.
    pub fn with<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select(dimension, values);
        self
    }

    pub fn brands<I, S>(self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Dimension::Brand, brands)
    }

    pub fn years<I, S>(self, years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Dimension::Year, years)
    }

    /// Month facet values are month-year labels such as `Jan 2024`.
    pub fn months<I, S>(self, months: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Dimension::MonthYear, months)
    }

    pub fn select<I, S>(&mut self, dimension: Dimension, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.into().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if set.is_empty() {
            self.selections.remove(&dimension);
        } else {
            self.selections.insert(dimension, set);
        }
    }

    pub fn clear(&mut self, dimension: Dimension) {
        self.selections.remove(&dimension);
    }

    pub fn selected(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        self.selections.get(&dimension)
    }

    /// True when no dimension is restricted.
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.selections.iter().all(|(dimension, allowed)| {
            record
                .key(*dimension)
                .map(|value| allowed.contains(value))
                .unwrap_or(false)
        })
    }
}

/// Records passing every restricted facet, in input order.
pub fn filter_records<'a, R: Record>(records: &'a [R], spec: &FilterSpec) -> Vec<&'a R> {
    records.iter().filter(|r| spec.matches(*r)).collect()
}

/// Distinct years present, newest first.
pub fn year_options<R: Record>(records: &[R]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.key(Dimension::Year))
        .unique()
        .sorted_by(|a, b| b.cmp(a))
        .map(str::to_string)
        .collect()
}

/// Distinct month-year labels among records in `selected_years` (all years
/// when empty), newest first. Labels that do not parse as a month go last.
pub fn month_options<R: Record>(records: &[R], selected_years: &[String]) -> Vec<String> {
    let years = FilterSpec::new().years(selected_years.iter().cloned());
    records
        .iter()
        .filter(|r| years.matches(*r))
        .filter_map(|r| r.key(Dimension::MonthYear))
        .unique()
        .map(|label| (MonthKey::parse(label), label))
        .sorted_by(|(a, la), (b, lb)| match (a, b) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => la.cmp(lb),
        })
        .map(|(_, label)| label.to_string())
        .collect()
}
