//! Dashboard configuration: where the CSV exports live and the knobs each
//! view uses (limits, preferred brand, comparison years).
//!
//! Layering: defaults, then an optional JSON file, then `ROLLUP_*`
//! environment variables (a `.env` file is honoured).

use crate::error::{Result, RollupError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub spend_csv: String,
    pub dme_csv: String,
    pub instagram_csv: String,
    pub tiktok_csv: String,
    pub products_csv: String,
    pub reviews_csv: String,
    /// Substring matched (case-insensitive) when seeding comparison pickers.
    pub preferred_brand: String,
    pub publisher_limit: usize,
    pub timeline_brand_limit: usize,
    pub spend_brand_limit: usize,
    pub top_posts: usize,
    pub top_products: usize,
    pub base_year: String,
    pub compare_year: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            spend_csv: "brand_manufacturer_clean.csv".to_string(),
            dme_csv: "dme_provider_clean.csv".to_string(),
            instagram_csv: "SM_IG_Breast_Pump_Brands.csv".to_string(),
            tiktok_csv: "SM_TikTok_Breast_Pump_Brands.csv".to_string(),
            products_csv: "consolidated_products.csv".to_string(),
            reviews_csv: "consolidated_reviews.csv".to_string(),
            preferred_brand: "avent".to_string(),
            publisher_limit: 30,
            timeline_brand_limit: 8,
            spend_brand_limit: 15,
            top_posts: 10,
            top_products: 5,
            base_year: "2024".to_string(),
            compare_year: "2025".to_string(),
        }
    }
}

fn parse_env<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| RollupError::Config(format!("{} has an invalid value: '{}'", name, raw)))
}

impl DashboardConfig {
    /// Defaults, optionally overlaid by `file`, then by the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RollupError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay `ROLLUP_*` values returned by `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ROLLUP_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        let locations: [(&str, &mut String); 6] = [
            ("ROLLUP_SPEND_CSV", &mut self.spend_csv),
            ("ROLLUP_DME_CSV", &mut self.dme_csv),
            ("ROLLUP_INSTAGRAM_CSV", &mut self.instagram_csv),
            ("ROLLUP_TIKTOK_CSV", &mut self.tiktok_csv),
            ("ROLLUP_PRODUCTS_CSV", &mut self.products_csv),
            ("ROLLUP_REVIEWS_CSV", &mut self.reviews_csv),
        ];
        for (name, slot) in locations {
            if let Some(v) = lookup(name) {
                *slot = v;
            }
        }
        if let Some(v) = lookup("ROLLUP_PREFERRED_BRAND") {
            self.preferred_brand = v;
        }
        if let Some(v) = lookup("ROLLUP_BASE_YEAR") {
            self.base_year = v;
        }
        if let Some(v) = lookup("ROLLUP_COMPARE_YEAR") {
            self.compare_year = v;
        }
        let limits: [(&str, &mut usize); 5] = [
            ("ROLLUP_PUBLISHER_LIMIT", &mut self.publisher_limit),
            ("ROLLUP_TIMELINE_BRAND_LIMIT", &mut self.timeline_brand_limit),
            ("ROLLUP_SPEND_BRAND_LIMIT", &mut self.spend_brand_limit),
            ("ROLLUP_TOP_POSTS", &mut self.top_posts),
            ("ROLLUP_TOP_PRODUCTS", &mut self.top_products),
        ];
        for (name, slot) in limits {
            if let Some(v) = lookup(name) {
                *slot = parse_env(name, &v)?;
            }
        }
        Ok(())
    }

    /// URLs pass through; anything else is relative to `data_dir`
    /// unless already absolute.
    pub fn resolve(&self, location: &str) -> String {
        if is_url(location) || Path::new(location).is_absolute() {
            location.to_string()
        } else {
            self.data_dir.join(location).display().to_string()
        }
    }
}

pub fn is_url(location: &str) -> bool {
    let lower = location.trim_start().to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_overrides_layer_on_defaults() {
        let env: HashMap<&str, &str> = [
            ("ROLLUP_DATA_DIR", "/srv/exports"),
            ("ROLLUP_SPEND_CSV", "https://cdn.example.com/spend.csv"),
            ("ROLLUP_PUBLISHER_LIMIT", "10"),
        ]
        .into_iter()
        .collect();
        let mut config = DashboardConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.publisher_limit, 10);
        assert_eq!(config.timeline_brand_limit, 8);
        assert_eq!(config.resolve(&config.spend_csv), "https://cdn.example.com/spend.csv");
        assert_eq!(
            config.resolve(&config.reviews_csv),
            Path::new("/srv/exports").join("consolidated_reviews.csv").display().to_string()
        );
    }

    #[test]
    fn test_invalid_limit_is_config_error() {
        let mut config = DashboardConfig::default();
        let err = config
            .apply_overrides(|k| (k == "ROLLUP_TOP_POSTS").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, RollupError::Config(_)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"preferred_brand": "medela", "top_products": 3}"#).unwrap();
        assert_eq!(config.preferred_brand, "medela");
        assert_eq!(config.top_products, 3);
        assert_eq!(config.publisher_limit, 30);
    }
}
