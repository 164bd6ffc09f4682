//! Amazon catalog: products joined with their reviews by ASIN.

use crate::aggregate;
use crate::derived::{self, percentage_of};
use crate::records::{Dimension, Measure, ProductRow, ReviewRow};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// A listing with its reviews folded in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub asin: String,
    pub title: String,
    pub brand: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub discount_pct: f64,
    pub star_rating: f64,
    pub number_of_ratings: f64,
    pub url: String,
    pub review_count: usize,
    /// Mean of the joined reviews' ratings; `None` without reviews.
    pub avg_review_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandStats {
    pub brand: String,
    pub product_count: usize,
    /// Sum of the listings' "Number of Ratings".
    pub total_ratings: f64,
    pub avg_price: f64,
    pub avg_discount: f64,
    pub avg_star_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBucket {
    pub stars: u8,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewCatalog {
    pub products: Vec<Product>,
    pub brands: Vec<BrandStats>,
    pub rating_distribution: Vec<RatingBucket>,
    /// Reviewed products only, highest average review rating first.
    pub top_products: Vec<Product>,
}

pub fn join_products(products: &[ProductRow], reviews: &[ReviewRow]) -> Vec<Product> {
    let per_asin = aggregate::aggregate_dimension(reviews, Dimension::Asin, Measure::Rating);
    let ratings: HashMap<&str, (f64, usize)> = per_asin
        .iter()
        .map(|row| (row.key.as_str(), (row.sum, row.count)))
        .collect();

    products
        .iter()
        .map(|p| {
            let (sum, count) = ratings.get(p.asin.as_str()).copied().unwrap_or((0.0, 0));
            Product {
                asin: p.asin.clone(),
                title: p.title.clone(),
                brand: p.brand.clone(),
                price: p.price(),
                original_price: p.original_price(),
                discount_pct: p.discount_pct(),
                star_rating: p.star_rating,
                number_of_ratings: p.number_of_ratings,
                url: p.url.clone(),
                review_count: count,
                avg_review_rating: (count > 0).then(|| sum / count as f64),
            }
        })
        .collect()
}

/// Per-brand averages, brands in first-listed order.
pub fn brand_stats(products: &[ProductRow]) -> Vec<BrandStats> {
    aggregate::rollup(
        products,
        &[Dimension::Brand],
        &[Measure::RatingCount, Measure::Price, Measure::Discount, Measure::Rating],
    )
    .into_iter()
    .map(|group| {
        let n = group.count as f64;
        BrandStats {
            brand: group.key(0).to_string(),
            product_count: group.count,
            total_ratings: group.sum(0),
            avg_price: group.sum(1) / n,
            avg_discount: group.sum(2) / n,
            avg_star_rating: group.sum(3) / n,
        }
    })
    .collect()
}

/// Reviews per whole star, 1 to 5. Fractional or out-of-range ratings are
/// not bucketed.
pub fn rating_distribution(reviews: &[ReviewRow]) -> Vec<RatingBucket> {
    let counts: Vec<(u8, usize)> = (1u8..=5)
        .map(|stars| {
            let count = reviews.iter().filter(|r| r.rating == f64::from(stars)).count();
            (stars, count)
        })
        .collect();
    let total = reviews.len() as f64;
    counts
        .into_iter()
        .map(|(stars, count)| RatingBucket {
            stars,
            count,
            percentage: percentage_of(count as f64, total),
        })
        .collect()
}

pub fn review_catalog(products: &[ProductRow], reviews: &[ReviewRow], top: usize) -> ReviewCatalog {
    let joined = join_products(products, reviews);
    let reviewed: Vec<Product> = joined.iter().filter(|p| p.review_count > 0).cloned().collect();
    let top_products = derived::top_n_by(reviewed, top, |p| p.avg_review_rating.unwrap_or(0.0));
    debug!(
        "Catalog: {} products, {} reviews, {} reviewed in top list",
        joined.len(),
        reviews.len(),
        top_products.len()
    );

    ReviewCatalog {
        brands: brand_stats(products),
        rating_distribution: rating_distribution(reviews),
        top_products,
        products: joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(asin: &str, brand: &str, price: &str, original: &str, stars: f64) -> ProductRow {
        ProductRow {
            asin: asin.to_string(),
            brand: brand.to_string(),
            price_raw: price.to_string(),
            original_price_raw: original.to_string(),
            star_rating: stars,
            number_of_ratings: 100.0,
            ..Default::default()
        }
    }

    fn review(asin: &str, rating: f64) -> ReviewRow {
        ReviewRow {
            asin: asin.to_string(),
            rating,
            ..Default::default()
        }
    }

    #[test]
    fn test_review_catalog() {
        let products = vec![
            product("A1", "Medela", "$100", "$200", 4.0),
            product("A2", "Medela", "$50", "", 5.0),
            product("B1", "Spectra", "$1,000.00", "$1,000.00", 4.5),
        ];
        let reviews = vec![review("A1", 5.0), review("A1", 3.0), review("B1", 5.0), review("ZZ", 4.5)];
        let catalog = review_catalog(&products, &reviews, 5);

        assert_eq!(catalog.products[0].avg_review_rating, Some(4.0));
        assert_eq!(catalog.products[1].avg_review_rating, None);

        let tops: Vec<&str> = catalog.top_products.iter().map(|p| p.asin.as_str()).collect();
        assert_eq!(tops, vec!["B1", "A1"]);

        let medela = &catalog.brands[0];
        assert_eq!(medela.product_count, 2);
        assert_eq!(medela.total_ratings, 200.0);
        assert_eq!(medela.avg_price, 75.0);
        assert_eq!(medela.avg_discount, 25.0);
        assert_eq!(medela.avg_star_rating, 4.5);
        assert_eq!(catalog.brands[1].avg_discount, 0.0);

        let counts: Vec<usize> = catalog.rating_distribution.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 0, 1, 0, 2]);
        assert_eq!(catalog.rating_distribution[4].percentage, 50.0);
    }
}
