//! Secondary metrics over aggregated rows: shares, year-over-year growth,
//! ranking and top-N truncation.

use crate::aggregate::AggregateRow;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Aggregated row with its share of the grouping total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub key: String,
    pub sum: f64,
    pub count: usize,
    /// `100 * sum / total`, 0 when the total is 0.
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yoy_growth: Option<f64>,
}

impl From<AggregateRow> for DerivedRow {
    fn from(row: AggregateRow) -> Self {
        Self {
            key: row.key,
            sum: row.sum,
            count: row.count,
            percentage: 0.0,
            yoy_growth: None,
        }
    }
}

/// Attach percentage-of-total to every row.
pub fn with_percentages(rows: Vec<AggregateRow>) -> Vec<DerivedRow> {
    let total: f64 = rows.iter().map(|r| r.sum).sum();
    rows.into_iter()
        .map(|row| {
            let mut derived = DerivedRow::from(row);
            derived.percentage = percentage_of(derived.sum, total);
            derived
        })
        .collect()
}

pub fn percentage_of(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total * 100.0
    }
}

/// Year-over-year growth in percent.
///
/// A zero baseline is special-cased: growth from nothing to something is
/// reported as 100, nothing to nothing (or to a negative) as 0.
pub fn year_over_year(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Fill `yoy_growth` on `current` from the same keys in `previous`.
/// Keys absent from `previous` have a zero baseline.
pub fn with_year_over_year(current: Vec<DerivedRow>, previous: &[AggregateRow]) -> Vec<DerivedRow> {
    let baseline: HashMap<&str, f64> = previous.iter().map(|r| (r.key.as_str(), r.sum)).collect();
    current
        .into_iter()
        .map(|mut row| {
            let before = baseline.get(row.key.as_str()).copied().unwrap_or(0.0);
            row.yoy_growth = Some(year_over_year(row.sum, before));
            row
        })
        .collect()
}

/// Descending order with NaN scores pushed to the end.
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Stable sort, highest score first. Ties keep their input order.
pub fn rank_by<T, F>(mut rows: Vec<T>, score: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    rows.sort_by(|a, b| descending(score(a), score(b)));
    rows
}

/// The `n` highest-scoring rows; ties keep their input order.
pub fn top_n_by<T, F>(rows: Vec<T>, n: usize, score: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    let mut ranked = rank_by(rows, score);
    ranked.truncate(n);
    ranked
}

/// The `n` rows with the largest raw sum.
pub fn top_n(rows: Vec<DerivedRow>, n: usize) -> Vec<DerivedRow> {
    top_n_by(rows, n, |r| r.sum)
}

/// Each value as a percentage of the first (largest) one; bar widths in a
/// ranked list. A zero leader is treated as 1.
pub fn share_of_leader(rows: &[DerivedRow]) -> Vec<f64> {
    let leader = rows
        .first()
        .map(|r| r.sum)
        .filter(|s| *s != 0.0)
        .unwrap_or(1.0);
    rows.iter().map(|r| r.sum / leader * 100.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(key: &str, sum: f64) -> AggregateRow {
        AggregateRow {
            key: key.to_string(),
            sum,
            count: 1,
        }
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let rows = with_percentages(vec![agg("a", 1.0), agg("b", 2.0), agg("c", 7.0)]);
        let total: f64 = rows.iter().map(|r| r.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!((rows[2].percentage - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentages_zero_total_and_empty() {
        let rows = with_percentages(vec![agg("a", 0.0), agg("b", 0.0)]);
        assert!(rows.iter().all(|r| r.percentage == 0.0));
        assert!(with_percentages(Vec::new()).is_empty());
    }

    #[test]
    fn test_year_over_year_policy() {
        assert_eq!(year_over_year(0.0, 0.0), 0.0);
        assert_eq!(year_over_year(100.0, 0.0), 100.0);
        assert_eq!(year_over_year(150.0, 100.0), 50.0);
        assert_eq!(year_over_year(50.0, 100.0), -50.0);
        assert_eq!(year_over_year(-5.0, 0.0), 0.0);
    }

    #[test]
    fn test_top_n_stable_ties() {
        let rows = with_percentages(vec![agg("a", 50.0), agg("b", 30.0), agg("c", 30.0), agg("d", 10.0)]);
        let top: Vec<String> = top_n(rows, 3).into_iter().map(|r| r.key).collect();
        assert_eq!(top, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rank_by_puts_nan_last() {
        let ranked = rank_by(vec![1.0, f64::NAN, 3.0, 2.0], |v| *v);
        assert_eq!(&ranked[..3], &[3.0, 2.0, 1.0]);
        assert!(ranked[3].is_nan());
    }

    #[test]
    fn test_with_year_over_year_matches_keys() {
        let current = with_percentages(vec![agg("a", 150.0), agg("new", 10.0)]);
        let previous = vec![agg("a", 100.0), agg("gone", 40.0)];
        let rows = with_year_over_year(current, &previous);
        assert_eq!(rows[0].yoy_growth, Some(50.0));
        assert_eq!(rows[1].yoy_growth, Some(100.0));
    }

    #[test]
    fn test_share_of_leader() {
        let rows = with_percentages(vec![agg("a", 40.0), agg("b", 10.0)]);
        assert_eq!(share_of_leader(&rows), vec![100.0, 25.0]);
        assert!(share_of_leader(&[]).is_empty());
    }
}
