//! Single-entry memo for the filter → aggregate step.
//!
//! Views recompute from the full record set on every change; the memo only
//! skips the work when the exact same (dataset, filter, dimension, measure)
//! is asked for twice in a row.

use crate::aggregate::{self, AggregateRow};
use crate::filter::{self, FilterSpec};
use crate::records::{Dimension, Measure, Record};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    pub dataset_id: u64,
    pub filter: FilterSpec,
    pub dimension: Dimension,
    pub measure: Measure,
}

#[derive(Debug, Default)]
pub struct RollupMemo {
    entry: Option<(MemoKey, Vec<AggregateRow>)>,
    hits: u64,
    misses: u64,
}

impl RollupMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filtered aggregation of `records`, reusing the previous result when
    /// the key is unchanged.
    pub fn aggregate<R: Record>(
        &mut self,
        dataset_id: u64,
        records: &[R],
        spec: &FilterSpec,
        dimension: Dimension,
        measure: Measure,
    ) -> &[AggregateRow] {
        let key = MemoKey {
            dataset_id,
            filter: spec.clone(),
            dimension,
            measure,
        };

        let fresh = matches!(&self.entry, Some((cached, _)) if *cached == key);
        if fresh {
            self.hits += 1;
            trace!("memo hit for {} by {}", measure, dimension);
        } else {
            self.misses += 1;
            let filtered = filter::filter_records(records, spec);
            let rows = aggregate::aggregate_dimension(filtered, dimension, measure);
            self.entry = Some((key, rows));
        }

        self.entry
            .as_ref()
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SpendRecord;

    fn records() -> Vec<SpendRecord> {
        vec![
            SpendRecord {
                brand_root: "A".to_string(),
                year: "2024".to_string(),
                spend_usd: 10.0,
                ..Default::default()
            },
            SpendRecord {
                brand_root: "B".to_string(),
                year: "2025".to_string(),
                spend_usd: 5.0,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_memo_reuses_identical_request() {
        let data = records();
        let mut memo = RollupMemo::new();
        let spec = FilterSpec::new().years(["2025"]);

        let first = memo.aggregate(1, &data, &spec, Dimension::Brand, Measure::Spend).to_vec();
        let second = memo.aggregate(1, &data, &spec, Dimension::Brand, Measure::Spend).to_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!((memo.hits(), memo.misses()), (1, 1));

        memo.aggregate(2, &data, &spec, Dimension::Brand, Measure::Spend);
        assert_eq!(memo.misses(), 2);

        let all = memo.aggregate(2, &data, &FilterSpec::default(), Dimension::Brand, Measure::Spend);
        assert_eq!(all.len(), 2);
        assert_eq!(memo.misses(), 3);
    }
}
