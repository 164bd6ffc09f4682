//! Typed rows for every CSV export the dashboard reads, plus the
//! `Dimension`/`Measure` vocabulary the pipeline groups and sums by.

use crate::data_utils::{self, lenient_f64, lenient_string};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categorical column a record can be filtered or grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Brand,
    Advertiser,
    CategoryLevel2,
    CategoryLevel3,
    CategoryLevel8,
    Channel,
    Placement,
    Publisher,
    Year,
    /// Full month label as exported, e.g. `Jan 2024`.
    MonthYear,
    /// Month name only, e.g. `Jan`.
    Month,
    Company,
    Handle,
    PostType,
    Platform,
    Asin,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Brand => "brand",
            Dimension::Advertiser => "advertiser",
            Dimension::CategoryLevel2 => "category_level_2",
            Dimension::CategoryLevel3 => "category_level_3",
            Dimension::CategoryLevel8 => "category_level_8",
            Dimension::Channel => "channel",
            Dimension::Placement => "placement",
            Dimension::Publisher => "publisher",
            Dimension::Year => "year",
            Dimension::MonthYear => "month_year",
            Dimension::Month => "month",
            Dimension::Company => "company",
            Dimension::Handle => "handle",
            Dimension::PostType => "post_type",
            Dimension::Platform => "platform",
            Dimension::Asin => "asin",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        let dimension = match normalized.as_str() {
            "brand" | "brand_root" => Dimension::Brand,
            "advertiser" => Dimension::Advertiser,
            "category_level_2" => Dimension::CategoryLevel2,
            "category_level_3" => Dimension::CategoryLevel3,
            "category_level_8" => Dimension::CategoryLevel8,
            "channel" => Dimension::Channel,
            "placement" => Dimension::Placement,
            "publisher" => Dimension::Publisher,
            "year" => Dimension::Year,
            "month_year" => Dimension::MonthYear,
            "month" => Dimension::Month,
            "company" => Dimension::Company,
            "handle" | "presence_handle" => Dimension::Handle,
            "post_type" => Dimension::PostType,
            "platform" => Dimension::Platform,
            "asin" => Dimension::Asin,
            other => return Err(format!("unknown dimension '{}'", other)),
        };
        Ok(dimension)
    }
}

/// Numeric column a record can be summed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Spend,
    Impressions,
    Likes,
    Comments,
    Shares,
    Views,
    Followers,
    Engagement,
    EngagementRateByFollower,
    EngagementRateByView,
    EstimatedImpressions,
    Rating,
    RatingCount,
    Price,
    /// Percent off the list price.
    Discount,
    /// 1 per record.
    Count,
}

impl Measure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Measure::Spend => "spend",
            Measure::Impressions => "impressions",
            Measure::Likes => "likes",
            Measure::Comments => "comments",
            Measure::Shares => "shares",
            Measure::Views => "views",
            Measure::Followers => "followers",
            Measure::Engagement => "engagement",
            Measure::EngagementRateByFollower => "engagement_rate_by_follower",
            Measure::EngagementRateByView => "engagement_rate_by_view",
            Measure::EstimatedImpressions => "estimated_impressions",
            Measure::Rating => "rating",
            Measure::RatingCount => "rating_count",
            Measure::Price => "price",
            Measure::Discount => "discount",
            Measure::Count => "count",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Measure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        let measure = match normalized.as_str() {
            "spend" | "spend_(usd)" => Measure::Spend,
            "impressions" => Measure::Impressions,
            "likes" => Measure::Likes,
            "comments" => Measure::Comments,
            "shares" => Measure::Shares,
            "views" => Measure::Views,
            "followers" => Measure::Followers,
            "engagement" | "engagement_total" => Measure::Engagement,
            "engagement_rate_by_follower" => Measure::EngagementRateByFollower,
            "engagement_rate_by_view" => Measure::EngagementRateByView,
            "estimated_impressions" => Measure::EstimatedImpressions,
            "rating" => Measure::Rating,
            "rating_count" => Measure::RatingCount,
            "price" => Measure::Price,
            "discount" => Measure::Discount,
            "count" => Measure::Count,
            other => return Err(format!("unknown measure '{}'", other)),
        };
        Ok(measure)
    }
}

/// Read access the pipeline needs from any row type.
pub trait Record {
    /// Raw categorical value; `None` when the schema has no such column.
    fn dimension(&self, dimension: Dimension) -> Option<&str>;

    /// Numeric value, already coerced; 0 when the schema has no such column.
    fn measure(&self, measure: Measure) -> f64;

    /// Categorical value usable as a key: absent and empty are both `None`.
    fn key(&self, dimension: Dimension) -> Option<&str> {
        self.dimension(dimension).filter(|v| !v.is_empty())
    }
}

impl<T: Record + ?Sized> Record for &T {
    fn dimension(&self, dimension: Dimension) -> Option<&str> {
        (**self).dimension(dimension)
    }

    fn measure(&self, measure: Measure) -> f64 {
        (**self).measure(measure)
    }
}

/// Post-decode fix-ups run by the loader on every row.
pub trait Normalize {
    fn normalize(&mut self) {}
}

/// One advertising-spend observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendRecord {
    #[serde(rename = "month-year", deserialize_with = "lenient_string")]
    pub month_year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub advertiser: String,
    #[serde(rename = "brand root", deserialize_with = "lenient_string")]
    pub brand_root: String,
    #[serde(rename = "category level 2", deserialize_with = "lenient_string")]
    pub category_level_2: String,
    #[serde(rename = "category level 3", deserialize_with = "lenient_string")]
    pub category_level_3: String,
    #[serde(rename = "category level 8", deserialize_with = "lenient_string")]
    pub category_level_8: String,
    #[serde(deserialize_with = "lenient_string")]
    pub channel: String,
    #[serde(deserialize_with = "lenient_string")]
    pub placement: String,
    #[serde(deserialize_with = "lenient_string")]
    pub publisher: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub impressions: f64,
    #[serde(rename = "spend (usd)", deserialize_with = "lenient_f64")]
    pub spend_usd: f64,
}

impl Record for SpendRecord {
    fn dimension(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Brand => Some(self.brand_root.as_str()),
            Dimension::Advertiser => Some(self.advertiser.as_str()),
            Dimension::CategoryLevel2 => Some(self.category_level_2.as_str()),
            Dimension::CategoryLevel3 => Some(self.category_level_3.as_str()),
            Dimension::CategoryLevel8 => Some(self.category_level_8.as_str()),
            Dimension::Channel => Some(self.channel.as_str()),
            Dimension::Placement => Some(self.placement.as_str()),
            Dimension::Publisher => Some(self.publisher.as_str()),
            Dimension::Year => Some(self.year.as_str()),
            Dimension::MonthYear => Some(self.month_year.as_str()),
            Dimension::Month => Some(data_utils::month_token(&self.month_year)),
            _ => None,
        }
    }

    fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Spend => self.spend_usd,
            Measure::Impressions => self.impressions,
            Measure::Count => 1.0,
            _ => 0.0,
        }
    }
}

impl Normalize for SpendRecord {}

/// Social network a post was exported from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Instagram,
    TikTok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
        }
    }

    /// Rate averaged on the platform's summary card.
    pub fn engagement_rate_measure(&self) -> Measure {
        match self {
            Platform::Instagram => Measure::EngagementRateByFollower,
            Platform::TikTok => Measure::EngagementRateByView,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instagram" | "ig" => Ok(Platform::Instagram),
            "tiktok" | "tt" => Ok(Platform::TikTok),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

/// One social post. Columns missing on a platform stay 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialPost {
    #[serde(deserialize_with = "lenient_string")]
    pub published_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub presence_handle: String,
    #[serde(deserialize_with = "lenient_string")]
    pub message: String,
    #[serde(deserialize_with = "lenient_string")]
    pub post_type: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub likes: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub comments: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub shares: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub views: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub followers: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub engagement_total: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub engagement_rate_by_follower: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub engagement_rate_by_view: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub estimated_impressions: f64,
    #[serde(skip_deserializing)]
    pub platform: Platform,
    #[serde(skip_deserializing)]
    pub year: String,
    #[serde(skip_deserializing)]
    pub month_year: String,
}

impl SocialPost {
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

impl Record for SocialPost {
    fn dimension(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Company | Dimension::Brand => Some(self.company.as_str()),
            Dimension::Handle => Some(self.presence_handle.as_str()),
            Dimension::PostType => Some(self.post_type.as_str()),
            Dimension::Platform => Some(self.platform.as_str()),
            Dimension::Year => Some(self.year.as_str()),
            Dimension::MonthYear => Some(self.month_year.as_str()),
            Dimension::Month => Some(data_utils::month_token(&self.month_year)),
            _ => None,
        }
    }

    fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Likes => self.likes,
            Measure::Comments => self.comments,
            Measure::Shares => self.shares,
            Measure::Views => self.views,
            Measure::Followers => self.followers,
            Measure::Engagement => self.engagement_total,
            Measure::EngagementRateByFollower => self.engagement_rate_by_follower,
            Measure::EngagementRateByView => self.engagement_rate_by_view,
            Measure::EstimatedImpressions | Measure::Impressions => self.estimated_impressions,
            Measure::Count => 1.0,
            _ => 0.0,
        }
    }
}

impl Normalize for SocialPost {
    fn normalize(&mut self) {
        if let Some(date) = data_utils::parse_post_date(&self.published_date) {
            self.year = date.year().to_string();
            self.month_year = format!(
                "{} {}",
                data_utils::MONTH_NAMES[date.month0() as usize],
                date.year()
            );
        }
    }
}

/// Amazon product listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRow {
    #[serde(rename = "ASIN", deserialize_with = "lenient_string")]
    pub asin: String,
    #[serde(rename = "Product Title", deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(rename = "Price", deserialize_with = "lenient_string")]
    pub price_raw: String,
    #[serde(rename = "Original Price", deserialize_with = "lenient_string")]
    pub original_price_raw: String,
    #[serde(rename = "Brand", deserialize_with = "lenient_string")]
    pub brand: String,
    #[serde(rename = "Star Rating", deserialize_with = "lenient_f64")]
    pub star_rating: f64,
    #[serde(rename = "Number of Ratings", deserialize_with = "lenient_f64")]
    pub number_of_ratings: f64,
    #[serde(rename = "Product URL", deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(rename = "Product Photo", deserialize_with = "lenient_string")]
    pub photo: String,
}

impl ProductRow {
    pub fn price(&self) -> f64 {
        data_utils::parse_currency(&self.price_raw).unwrap_or(0.0)
    }

    /// List price before discount; a zero or unreadable cell means "no discount".
    pub fn original_price(&self) -> Option<f64> {
        data_utils::parse_currency(&self.original_price_raw).filter(|p| *p != 0.0)
    }

    pub fn discount_pct(&self) -> f64 {
        match self.original_price() {
            Some(original) => (original - self.price()) / original * 100.0,
            None => 0.0,
        }
    }
}

impl Record for ProductRow {
    fn dimension(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Brand => Some(self.brand.as_str()),
            Dimension::Asin => Some(self.asin.as_str()),
            _ => None,
        }
    }

    fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Price => self.price(),
            Measure::Discount => self.discount_pct(),
            Measure::Rating => self.star_rating,
            Measure::RatingCount => self.number_of_ratings,
            Measure::Count => 1.0,
            _ => 0.0,
        }
    }
}

impl Normalize for ProductRow {
    fn normalize(&mut self) {
        self.brand = data_utils::clean_store_brand(&self.brand);
    }
}

/// Amazon review, joined to products by ASIN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewRow {
    #[serde(rename = "Review ID", deserialize_with = "lenient_string")]
    pub review_id: String,
    #[serde(rename = "ASIN", deserialize_with = "lenient_string")]
    pub asin: String,
    #[serde(rename = "Rating", deserialize_with = "lenient_f64")]
    pub rating: f64,
    #[serde(rename = "Review Title", deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(rename = "Review Text", deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(rename = "Review Link", deserialize_with = "lenient_string")]
    pub link: String,
}

impl Record for ReviewRow {
    fn dimension(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Asin => Some(self.asin.as_str()),
            _ => None,
        }
    }

    fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Rating => self.rating,
            Measure::Count => 1.0,
            _ => 0.0,
        }
    }
}

impl Normalize for ReviewRow {}
