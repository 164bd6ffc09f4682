//! Report builders: one per dashboard view, all built from the shared
//! filter → aggregate → derive pipeline.

pub mod comparison;
pub mod distribution;
pub mod figures;
pub mod reviews;
pub mod social;
pub mod timeline;

pub use comparison::{comparison_table, ComparisonTable};
pub use distribution::{
    compare_distributions, compare_publishers, distribution, publisher_ranking, Distribution, PublisherComparison,
    PublisherRanking,
};
pub use figures::{facets, general_figures, Facets, GeneralFigures};
pub use reviews::{review_catalog, ReviewCatalog};
pub use social::{social_report, SocialReport};
pub use timeline::{monthly_timeline, year_brand_table, yearly_brand_breakdown, Timeline, YearBreakdown};
