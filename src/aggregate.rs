//! Group-by + sum. Every chart and table reduces its rows through here.

use crate::records::{Dimension, Measure, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// One group of a single-key aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub key: String,
    pub sum: f64,
    pub count: usize,
}

/// One group of a composite-key, multi-measure rollup. `sums[i]` is the
/// total of the i-th requested measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupRow {
    pub keys: Vec<String>,
    pub sums: Vec<f64>,
    pub count: usize,
}

impl RollupRow {
    pub fn key(&self, index: usize) -> &str {
        self.keys.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn sum(&self, index: usize) -> f64 {
        self.sums.get(index).copied().unwrap_or(0.0)
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Shared fold: groups keep the order in which their key was first seen.
fn fold_groups<'a, R, I, G, K, M>(records: I, group_key_of: K, measures: M, width: usize) -> Vec<(G, Vec<f64>, usize)>
where
    R: 'a + ?Sized,
    I: IntoIterator<Item = &'a R>,
    G: Eq + Hash + Clone,
    K: Fn(&'a R) -> Option<G>,
    M: Fn(&'a R, &mut [f64]),
{
    let mut index: HashMap<G, usize> = HashMap::new();
    let mut groups: Vec<(G, Vec<f64>, usize)> = Vec::new();
    let mut scratch = vec![0.0; width];

    for record in records {
        let Some(key) = group_key_of(record) else {
            continue;
        };
        let slot = match index.get(&key) {
            Some(slot) => *slot,
            None => {
                groups.push((key.clone(), vec![0.0; width], 0));
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        scratch.iter_mut().for_each(|v| *v = 0.0);
        measures(record, scratch.as_mut_slice());
        let group = &mut groups[slot];
        for (total, value) in group.1.iter_mut().zip(scratch.iter()) {
            *total += sanitize(*value);
        }
        group.2 += 1;
    }

    groups
}

/// Group `records` by `group_key_of` and sum `measure_of` per group.
///
/// Records whose key is `None` or empty are dropped. NaN measures count as 0.
/// Rows come out in first-encountered key order.
pub fn aggregate_by<'a, R, I, S, K, M>(records: I, group_key_of: K, measure_of: M) -> Vec<AggregateRow>
where
    R: 'a + ?Sized,
    I: IntoIterator<Item = &'a R>,
    S: AsRef<str>,
    K: Fn(&'a R) -> Option<S>,
    M: Fn(&'a R) -> f64,
{
    let keyed = |record: &'a R| {
        group_key_of(record)
            .map(|k| k.as_ref().to_string())
            .filter(|k| !k.is_empty())
    };
    fold_groups(records, keyed, |record, out: &mut [f64]| out[0] = measure_of(record), 1)
        .into_iter()
        .map(|(key, sums, count)| AggregateRow {
            key,
            sum: sums[0],
            count,
        })
        .collect()
}

/// `aggregate_by` over a named dimension and measure.
pub fn aggregate_dimension<'a, R, I>(records: I, dimension: Dimension, measure: Measure) -> Vec<AggregateRow>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    aggregate_by(records, |r: &'a R| r.key(dimension), |r: &'a R| r.measure(measure))
}

/// Composite-key rollup summing several measures in one pass. A record is
/// dropped if any of its key components is missing or empty.
pub fn rollup<'a, R, I>(records: I, dimensions: &[Dimension], measures: &[Measure]) -> Vec<RollupRow>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let keyed = |record: &'a R| {
        dimensions
            .iter()
            .map(|d| record.key(*d).map(str::to_string))
            .collect::<Option<Vec<String>>>()
    };
    let measured = |record: &'a R, out: &mut [f64]| {
        for (slot, measure) in out.iter_mut().zip(measures.iter()) {
            *slot = record.measure(*measure);
        }
    };
    fold_groups(records, keyed, measured, measures.len())
        .into_iter()
        .map(|(keys, sums, count)| RollupRow { keys, sums, count })
        .collect()
}

/// Total of a measure over records, with the same NaN handling as grouping.
pub fn total<'a, R, I>(records: I, measure: Measure) -> f64
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    records.into_iter().map(|r| sanitize(r.measure(measure))).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SpendRecord;

    fn row(brand: &str, channel: &str, year: &str, spend: f64, impressions: f64) -> SpendRecord {
        SpendRecord {
            brand_root: brand.to_string(),
            channel: channel.to_string(),
            year: year.to_string(),
            spend_usd: spend,
            impressions,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_key_is_dropped_not_grouped() {
        let records = vec![
            row("X", "", "2024", 100.0, 0.0),
            row("", "", "2024", 50.0, 0.0),
            row("X", "", "2024", 20.0, 0.0),
        ];
        let rows = aggregate_dimension(&records, Dimension::Brand, Measure::Spend);
        assert_eq!(
            rows,
            vec![AggregateRow {
                key: "X".to_string(),
                sum: 120.0,
                count: 2
            }]
        );
    }

    #[test]
    fn test_first_encountered_order_and_conservation() {
        let records = vec![
            row("B", "Social", "2024", 10.0, 1.0),
            row("A", "Display", "2024", 5.0, 2.0),
            row("B", "Display", "2025", 7.5, 3.0),
            row("C", "", "2025", 0.0, 4.0),
        ];
        let rows = aggregate_dimension(&records, Dimension::Brand, Measure::Spend);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
        let grouped: f64 = rows.iter().map(|r| r.sum).sum();
        assert_eq!(grouped, total(&records, Measure::Spend));
        assert_eq!(rows[2].sum, 0.0);
        assert_eq!(rows[2].count, 1);
    }

    #[test]
    fn test_closure_keys_and_nan_measures() {
        let records = vec![("a", f64::NAN), ("a", 2.0), ("b", 1.0)];
        let rows = aggregate_by(&records, |r: &(&str, f64)| Some(r.0.to_string()), |r: &(&str, f64)| r.1);
        assert_eq!(rows[0].sum, 2.0);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].key, "b");
    }

    #[test]
    fn test_rollup_composite_multi_measure() {
        let records = vec![
            row("A", "Social", "2024", 10.0, 100.0),
            row("A", "Social", "2025", 4.0, 40.0),
            row("A", "Social", "2024", 1.0, 10.0),
            row("B", "", "2024", 3.0, 30.0),
        ];
        let rows = rollup(&records, &[Dimension::Year, Dimension::Brand], &[Measure::Spend, Measure::Impressions]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].keys, vec!["2024", "A"]);
        assert_eq!(rows[0].sums, vec![11.0, 110.0]);
        assert_eq!(rows[0].count, 2);

        let by_channel = rollup(&records, &[Dimension::Channel, Dimension::Brand], &[Measure::Spend]);
        assert_eq!(by_channel.len(), 1);
        assert_eq!(by_channel[0].sum(0), 15.0);
    }

    #[test]
    fn test_filtered_refs_aggregate() {
        let records = vec![row("A", "Social", "2024", 10.0, 0.0), row("B", "Social", "2025", 5.0, 0.0)];
        let only_2025: Vec<&SpendRecord> = records.iter().filter(|r| r.year == "2025").collect();
        let rows = aggregate_dimension(only_2025, Dimension::Brand, Measure::Spend);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "B");
    }
}
