//! Spend over time: yearly brand breakdown and the monthly brand timeline.

use crate::aggregate;
use crate::data_utils::MonthKey;
use crate::derived::{self, percentage_of};
use crate::records::{Dimension, Measure, Record};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandYear {
    pub brand: String,
    pub spend: f64,
    pub impressions: f64,
    /// Share of the year's spend.
    pub spend_share: f64,
    /// Share of the year's impressions.
    pub impressions_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBreakdown {
    pub year: String,
    pub total_spend: f64,
    pub total_impressions: f64,
    /// Highest spend first.
    pub brands: Vec<BrandYear>,
}

/// Per-year spend and impressions by brand, years ascending.
pub fn yearly_brand_breakdown<R: Record>(records: &[R]) -> Vec<YearBreakdown> {
    let groups = aggregate::rollup(
        records,
        &[Dimension::Year, Dimension::Brand],
        &[Measure::Spend, Measure::Impressions],
    );

    let mut years: Vec<YearBreakdown> = Vec::new();
    for group in groups {
        let year = group.key(0);
        let slot = match years.iter().position(|y| y.year == year) {
            Some(slot) => slot,
            None => {
                years.push(YearBreakdown {
                    year: year.to_string(),
                    total_spend: 0.0,
                    total_impressions: 0.0,
                    brands: Vec::new(),
                });
                years.len() - 1
            }
        };
        let entry = &mut years[slot];
        entry.total_spend += group.sum(0);
        entry.total_impressions += group.sum(1);
        entry.brands.push(BrandYear {
            brand: group.key(1).to_string(),
            spend: group.sum(0),
            impressions: group.sum(1),
            spend_share: 0.0,
            impressions_share: 0.0,
        });
    }

    years.sort_by(|a, b| a.year.cmp(&b.year));
    for year in years.iter_mut() {
        let (spend, impressions) = (year.total_spend, year.total_impressions);
        for brand in year.brands.iter_mut() {
            brand.spend_share = percentage_of(brand.spend, spend);
            brand.impressions_share = percentage_of(brand.impressions, impressions);
        }
        year.brands = derived::rank_by(std::mem::take(&mut year.brands), |b| b.spend);
    }
    years
}

/// Year x brand spend grid for the selected brands; absent cells are 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBrandTable {
    pub brands: Vec<String>,
    pub rows: Vec<YearBrandRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBrandRow {
    pub year: String,
    /// Aligned with `YearBrandTable::brands`.
    pub spend: Vec<f64>,
}

pub fn year_brand_table(breakdown: &[YearBreakdown], brands: &[String]) -> YearBrandTable {
    let rows = breakdown
        .iter()
        .map(|year| {
            let by_brand: HashMap<&str, f64> =
                year.brands.iter().map(|b| (b.brand.as_str(), b.spend)).collect();
            YearBrandRow {
                year: year.year.clone(),
                spend: brands
                    .iter()
                    .map(|b| by_brand.get(b.as_str()).copied().unwrap_or(0.0))
                    .collect(),
            }
        })
        .collect();
    YearBrandTable {
        brands: brands.to_vec(),
        rows,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandPoint {
    pub brand: String,
    pub spend: f64,
    /// Share of the month's total across the plotted brands.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub month_year: String,
    pub total: f64,
    pub values: Vec<BrandPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub brands: Vec<String>,
    /// Chronological. Months no plotted brand spent in still appear, at 0.
    pub points: Vec<TimelinePoint>,
}

fn chronological(a: &str, b: &str) -> Ordering {
    match (MonthKey::parse(a), MonthKey::parse(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Monthly spend for `brands`, one series per brand.
pub fn monthly_timeline<R: Record>(records: &[R], brands: &[String]) -> Timeline {
    let groups = aggregate::rollup(records, &[Dimension::MonthYear, Dimension::Brand], &[Measure::Spend]);

    let mut months: Vec<String> = Vec::new();
    let mut cells: HashMap<(String, String), f64> = HashMap::new();
    for group in groups {
        let month = group.key(0).to_string();
        if !months.contains(&month) {
            months.push(month.clone());
        }
        cells.insert((month, group.key(1).to_string()), group.sum(0));
    }
    months.sort_by(|a, b| chronological(a, b));

    let points = months
        .into_iter()
        .map(|month| {
            let spends: Vec<(String, f64)> = brands
                .iter()
                .map(|brand| {
                    let spend = cells.get(&(month.clone(), brand.clone())).copied().unwrap_or(0.0);
                    (brand.clone(), spend)
                })
                .collect();
            let total: f64 = spends.iter().map(|(_, s)| s).sum();
            TimelinePoint {
                month_year: month,
                total,
                values: spends
                    .into_iter()
                    .map(|(brand, spend)| BrandPoint {
                        brand,
                        spend,
                        percentage: percentage_of(spend, total),
                    })
                    .collect(),
            }
        })
        .collect();

    Timeline {
        brands: brands.to_vec(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SpendRecord;

    fn row(brand: &str, month_year: &str, spend: f64, impressions: f64) -> SpendRecord {
        SpendRecord {
            brand_root: brand.to_string(),
            year: month_year.rsplit(' ').next().unwrap_or("").to_string(),
            month_year: month_year.to_string(),
            spend_usd: spend,
            impressions,
            ..Default::default()
        }
    }

    fn sample() -> Vec<SpendRecord> {
        vec![
            row("Medela", "Feb 2025", 100.0, 10.0),
            row("Avent", "Jan 2024", 40.0, 4.0),
            row("Medela", "Jan 2024", 60.0, 6.0),
            row("Spectra", "Dec 2024", 10.0, 1.0),
            row("Avent", "Feb 2025", 300.0, 30.0),
        ]
    }

    #[test]
    fn test_yearly_breakdown_sorted() {
        let years = yearly_brand_breakdown(&sample());
        let labels: Vec<&str> = years.iter().map(|y| y.year.as_str()).collect();
        assert_eq!(labels, vec!["2024", "2025"]);
        assert_eq!(years[0].total_spend, 110.0);
        assert_eq!(years[0].brands[0].brand, "Medela");
        assert_eq!(years[1].brands[0].brand, "Avent");
        assert!((years[1].brands[0].spend_share - 75.0).abs() < 1e-9);
        assert!((years[1].brands[0].impressions_share - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_year_brand_table_fills_zero() {
        let years = yearly_brand_breakdown(&sample());
        let table = year_brand_table(&years, &["Spectra".to_string(), "Medela".to_string()]);
        assert_eq!(table.rows[0].spend, vec![10.0, 60.0]);
        assert_eq!(table.rows[1].spend, vec![0.0, 100.0]);
    }

    #[test]
    fn test_monthly_timeline_chronological() {
        let brands = vec!["Avent".to_string(), "Medela".to_string()];
        let timeline = monthly_timeline(&sample(), &brands);
        let months: Vec<&str> = timeline.points.iter().map(|p| p.month_year.as_str()).collect();
        assert_eq!(months, vec!["Jan 2024", "Dec 2024", "Feb 2025"]);

        let jan = &timeline.points[0];
        assert_eq!(jan.total, 100.0);
        assert_eq!(jan.values[0].percentage, 40.0);

        let dec = &timeline.points[1];
        assert_eq!(dec.total, 0.0);
        assert!(dec.values.iter().all(|v| v.percentage == 0.0));
    }
}
