//! Investment distribution: spend share by channel or placement, and the
//! publisher ranking, for a brand selection.

use crate::aggregate;
use crate::derived::{self, DerivedRow};
use crate::filter::{self, FilterSpec};
use crate::records::{Dimension, Measure, Record};
use serde::Serialize;
use tracing::debug;

/// Header text for a brand picker: everything, one brand, or a count.
pub fn selection_label(brands: &[String]) -> String {
    match brands {
        [] => "All Brands (Gross)".to_string(),
        [only] => only.clone(),
        many => format!("{} brands selected", many.len()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub dimension: Dimension,
    pub label: String,
    pub total: f64,
    /// Highest spend first.
    pub rows: Vec<DerivedRow>,
}

/// Spend share by `dimension` for `brands` (all brands when empty).
pub fn distribution<R: Record>(records: &[R], brands: &[String], dimension: Dimension) -> Distribution {
    let spec = FilterSpec::new().brands(brands.iter().cloned());
    let filtered = filter::filter_records(records, &spec);
    let rows = aggregate::aggregate_dimension(filtered, dimension, Measure::Spend);
    let rows = derived::rank_by(derived::with_percentages(rows), |r| r.sum);
    let total: f64 = rows.iter().map(|r| r.sum).sum();
    debug!("{} distribution: {} groups", dimension, rows.len());

    Distribution {
        dimension,
        label: selection_label(brands),
        total,
        rows,
    }
}

/// Two selections side by side over the same dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionComparison {
    pub left: Distribution,
    pub right: Distribution,
}

pub fn compare_distributions<R: Record>(
    records: &[R],
    left: &[String],
    right: &[String],
    dimension: Dimension,
) -> DistributionComparison {
    DistributionComparison {
        left: distribution(records, left, dimension),
        right: distribution(records, right, dimension),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublisherRank {
    pub rank: usize,
    pub publisher: String,
    pub spend: f64,
    /// Share of all publisher spend in the selection, not just the top list.
    pub percentage: f64,
    /// Bar width relative to the top publisher.
    pub share_of_leader: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublisherRanking {
    pub label: String,
    /// Spend across the listed publishers.
    pub total: f64,
    pub rows: Vec<PublisherRank>,
}

pub fn publisher_ranking<R: Record>(records: &[R], brands: &[String], limit: usize) -> PublisherRanking {
    let spec = FilterSpec::new().brands(brands.iter().cloned());
    let filtered = filter::filter_records(records, &spec);
    let rows = aggregate::aggregate_dimension(filtered, Dimension::Publisher, Measure::Spend);
    let top = derived::top_n(derived::with_percentages(rows), limit);
    let widths = derived::share_of_leader(&top);

    let rows: Vec<PublisherRank> = top
        .into_iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (row, width))| PublisherRank {
            rank: idx + 1,
            publisher: row.key,
            spend: row.sum,
            percentage: row.percentage,
            share_of_leader: width,
        })
        .collect();

    PublisherRanking {
        label: selection_label(brands),
        total: rows.iter().map(|r| r.spend).sum(),
        rows,
    }
}

/// Publisher rankings for two selections, as the channel split has.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublisherComparison {
    pub left: PublisherRanking,
    pub right: PublisherRanking,
}

pub fn compare_publishers<R: Record>(
    records: &[R],
    left: &[String],
    right: &[String],
    limit: usize,
) -> PublisherComparison {
    PublisherComparison {
        left: publisher_ranking(records, left, limit),
        right: publisher_ranking(records, right, limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SpendRecord;

    fn row(brand: &str, channel: &str, publisher: &str, spend: f64) -> SpendRecord {
        SpendRecord {
            brand_root: brand.to_string(),
            channel: channel.to_string(),
            publisher: publisher.to_string(),
            spend_usd: spend,
            ..Default::default()
        }
    }

    fn sample() -> Vec<SpendRecord> {
        vec![
            row("Medela", "Social", "Meta", 300.0),
            row("Medela", "Display", "Google", 100.0),
            row("Avent", "Social", "Meta", 50.0),
            row("Avent", "", "TikTok", 50.0),
            row("Spectra", "Search", "Google", 500.0),
        ]
    }

    #[test]
    fn test_distribution_all_brands() {
        let dist = distribution(&sample(), &[], Dimension::Channel);
        assert_eq!(dist.label, "All Brands (Gross)");
        let keys: Vec<&str> = dist.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Search", "Social", "Display"]);
        assert_eq!(dist.total, 950.0);
        let pct: f64 = dist.rows.iter().map(|r| r.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_for_selection() {
        let brands = vec!["Avent".to_string()];
        let dist = distribution(&sample(), &brands, Dimension::Channel);
        assert_eq!(dist.label, "Avent");
        assert_eq!(dist.rows.len(), 1);
        assert_eq!(dist.rows[0].percentage, 100.0);

        let cmp = compare_distributions(&sample(), &brands, &[], Dimension::Channel);
        assert_eq!(cmp.right.rows.len(), 3);
    }

    #[test]
    fn test_publisher_ranking() {
        let ranking = publisher_ranking(&sample(), &[], 2);
        assert_eq!(ranking.rows.len(), 2);
        assert_eq!(ranking.rows[0].publisher, "Google");
        assert_eq!(ranking.rows[0].rank, 1);
        assert_eq!(ranking.rows[0].share_of_leader, 100.0);
        assert_eq!(ranking.rows[1].publisher, "Meta");
        assert!((ranking.rows[1].share_of_leader - 350.0 / 600.0 * 100.0).abs() < 1e-9);
        assert!((ranking.rows[0].percentage - 600.0 / 1000.0 * 100.0).abs() < 1e-9);
        assert_eq!(ranking.total, 950.0);
    }

    #[test]
    fn test_compare_publishers() {
        let cmp = compare_publishers(&sample(), &[], &["Avent".to_string()], 30);
        assert_eq!(cmp.left.label, "All Brands (Gross)");
        assert_eq!(cmp.left.rows.len(), 3);
        assert_eq!(cmp.right.label, "Avent");
        let right: Vec<&str> = cmp.right.rows.iter().map(|r| r.publisher.as_str()).collect();
        assert_eq!(right, vec!["Meta", "TikTok"]);
        assert_eq!(cmp.right.rows[1].share_of_leader, 100.0);
        assert_eq!(cmp.right.total, 100.0);
    }

    #[test]
    fn test_selection_label() {
        assert_eq!(selection_label(&["A".to_string(), "B".to_string()]), "2 brands selected");
    }
}
