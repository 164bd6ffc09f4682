//! Month-by-month spend of selected brands in two years, with YoY growth.

use crate::aggregate;
use crate::data_utils::MONTH_NAMES;
use crate::derived::year_over_year;
use crate::records::{Dimension, Measure, Record};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonCell {
    pub base: f64,
    pub compare: f64,
    pub yoy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub month: String,
    /// One per selected brand, in selection order.
    pub cells: Vec<ComparisonCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub base_year: String,
    pub compare_year: String,
    pub brands: Vec<String>,
    /// Always twelve rows, Jan to Dec.
    pub rows: Vec<ComparisonRow>,
}

pub fn comparison_table<R: Record>(
    records: &[R],
    brands: &[String],
    base_year: &str,
    compare_year: &str,
) -> ComparisonTable {
    let groups = aggregate::rollup(
        records,
        &[Dimension::Brand, Dimension::Year, Dimension::Month],
        &[Measure::Spend],
    );
    let spend: HashMap<(&str, &str, &str), f64> = groups
        .iter()
        .map(|g| ((g.key(0), g.key(1), g.key(2)), g.sum(0)))
        .collect();
    let lookup = |brand: &str, year: &str, month: &str| spend.get(&(brand, year, month)).copied().unwrap_or(0.0);

    let rows = MONTH_NAMES
        .iter()
        .map(|month| ComparisonRow {
            month: month.to_string(),
            cells: brands
                .iter()
                .map(|brand| {
                    let base = lookup(brand, base_year, month);
                    let compare = lookup(brand, compare_year, month);
                    ComparisonCell {
                        base,
                        compare,
                        yoy: year_over_year(compare, base),
                    }
                })
                .collect(),
        })
        .collect();

    ComparisonTable {
        base_year: base_year.to_string(),
        compare_year: compare_year.to_string(),
        brands: brands.to_vec(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SpendRecord;

    fn row(brand: &str, month_year: &str, year: &str, spend: f64) -> SpendRecord {
        SpendRecord {
            brand_root: brand.to_string(),
            month_year: month_year.to_string(),
            year: year.to_string(),
            spend_usd: spend,
            ..Default::default()
        }
    }

    #[test]
    fn test_comparison_table_cells() {
        let records = vec![
            row("Avent", "Jan 2024", "2024", 100.0),
            row("Avent", "Jan 2025", "2025", 150.0),
            row("Avent", "Feb 2025", "2025", 80.0),
            row("Avent", "Mar 2024", "2024", 100.0),
            row("Avent", "Mar 2025", "2025", 50.0),
            row("Medela", "Jan 2024", "2024", 10.0),
        ];
        let brands = vec!["Avent".to_string(), "Elvie".to_string()];
        let table = comparison_table(&records, &brands, "2024", "2025");

        assert_eq!(table.rows.len(), 12);
        assert_eq!(table.rows[0].month, "Jan");
        assert_eq!(
            table.rows[0].cells[0],
            ComparisonCell { base: 100.0, compare: 150.0, yoy: 50.0 }
        );
        assert_eq!(table.rows[1].cells[0].yoy, 100.0);
        assert_eq!(table.rows[2].cells[0].yoy, -50.0);
        assert_eq!(table.rows[3].cells[0], ComparisonCell { base: 0.0, compare: 0.0, yoy: 0.0 });
        assert!(table.rows.iter().all(|r| r.cells[1].base == 0.0 && r.cells[1].yoy == 0.0));
    }
}
