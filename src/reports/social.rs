//! Social engagement summaries for Instagram and TikTok posts.

use crate::aggregate;
use crate::derived::{self, DerivedRow};
use crate::filter::{self, FilterSpec};
use crate::records::{Dimension, Measure, Platform, Record, SocialPost};
use crate::reports::figures::count_unique;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformSummary {
    pub platform: Platform,
    pub posts: usize,
    pub total_engagement: f64,
    pub likes: f64,
    pub comments: f64,
    pub shares: f64,
    pub views: f64,
    pub estimated_impressions: f64,
    /// Mean per-post rate: by follower on Instagram, by view on TikTok.
    /// A fraction, not a percent.
    pub avg_engagement_rate: f64,
    pub unique_companies: usize,
}

pub fn platform_summary(posts: &[SocialPost], platform: Platform) -> PlatformSummary {
    let posts: Vec<&SocialPost> = posts.iter().filter(|p| p.platform == platform).collect();
    let rate_total = aggregate::total(posts.iter().copied(), platform.engagement_rate_measure());
    let avg_engagement_rate = if posts.is_empty() {
        0.0
    } else {
        rate_total / posts.len() as f64
    };

    PlatformSummary {
        platform,
        posts: posts.len(),
        total_engagement: aggregate::total(posts.iter().copied(), Measure::Engagement),
        likes: aggregate::total(posts.iter().copied(), Measure::Likes),
        comments: aggregate::total(posts.iter().copied(), Measure::Comments),
        shares: aggregate::total(posts.iter().copied(), Measure::Shares),
        views: aggregate::total(posts.iter().copied(), Measure::Views),
        estimated_impressions: aggregate::total(posts.iter().copied(), Measure::EstimatedImpressions),
        avg_engagement_rate,
        unique_companies: count_unique(&posts, Dimension::Company),
    }
}

/// Posts with the highest `measure`; ties keep export order.
pub fn top_posts(posts: &[SocialPost], measure: Measure, n: usize) -> Vec<SocialPost> {
    derived::top_n_by(posts.to_vec(), n, |p| p.measure(measure))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialReport {
    pub platforms: Vec<PlatformSummary>,
    /// Total engagement per company, highest first.
    pub by_company: Vec<DerivedRow>,
    pub top_posts: Vec<SocialPost>,
}

/// Summary over posts passing `spec`, e.g. a company or year selection.
pub fn social_report(posts: &[SocialPost], spec: &FilterSpec, top: usize) -> SocialReport {
    let selected: Vec<SocialPost> = filter::filter_records(posts, spec).into_iter().cloned().collect();
    let platforms = [Platform::Instagram, Platform::TikTok]
        .into_iter()
        .map(|platform| platform_summary(&selected, platform))
        .filter(|summary| summary.posts > 0)
        .collect();
    let by_company = derived::rank_by(
        derived::with_percentages(aggregate::aggregate_dimension(&selected, Dimension::Company, Measure::Engagement)),
        |r| r.sum,
    );

    SocialReport {
        platforms,
        by_company,
        top_posts: top_posts(&selected, Measure::Engagement, top),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(company: &str, platform: Platform, engagement: f64, rate: f64) -> SocialPost {
        let post = SocialPost {
            company: company.to_string(),
            engagement_total: engagement,
            likes: engagement / 2.0,
            views: if platform == Platform::TikTok { engagement * 10.0 } else { 0.0 },
            engagement_rate_by_follower: rate,
            engagement_rate_by_view: rate * 2.0,
            ..Default::default()
        };
        post.with_platform(platform)
    }

    fn sample() -> Vec<SocialPost> {
        vec![
            post("Medela", Platform::Instagram, 100.0, 0.02),
            post("Avent", Platform::Instagram, 300.0, 0.04),
            post("Medela", Platform::TikTok, 50.0, 0.01),
            post("", Platform::Instagram, 10.0, 0.0),
        ]
    }

    #[test]
    fn test_platform_summary() {
        let ig = platform_summary(&sample(), Platform::Instagram);
        assert_eq!(ig.posts, 3);
        assert_eq!(ig.total_engagement, 410.0);
        assert!((ig.avg_engagement_rate - 0.02).abs() < 1e-12);
        assert_eq!(ig.unique_companies, 2);

        let tt = platform_summary(&sample(), Platform::TikTok);
        assert_eq!(tt.views, 500.0);
        assert!((tt.avg_engagement_rate - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_empty_platform_has_zero_rate() {
        let summary = platform_summary(&[], Platform::TikTok);
        assert_eq!(summary.posts, 0);
        assert_eq!(summary.avg_engagement_rate, 0.0);
    }

    #[test]
    fn test_social_report() {
        let report = social_report(&sample(), &FilterSpec::default(), 2);
        assert_eq!(report.platforms.len(), 2);
        assert_eq!(report.by_company[0].key, "Avent");
        assert_eq!(report.by_company[1].sum, 150.0);
        let tops: Vec<f64> = report.top_posts.iter().map(|p| p.engagement_total).collect();
        assert_eq!(tops, vec![300.0, 100.0]);

        let medela = social_report(&sample(), &FilterSpec::new().with(Dimension::Company, ["Medela"]), 10);
        assert_eq!(medela.top_posts.len(), 2);
        assert_eq!(medela.by_company.len(), 1);
    }
}
