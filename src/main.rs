use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use spend_rollup::config::DashboardConfig;
use spend_rollup::filter::{self, FilterSpec};
use spend_rollup::format::{format_currency, format_number, format_percentage, format_whole_currency, format_yoy};
use spend_rollup::ingestion::{self, Dataset};
use spend_rollup::records::{Dimension, Platform, ProductRow, ReviewRow, SocialPost, SpendRecord};
use spend_rollup::reports;
use spend_rollup::observability;
use spend_rollup::selection::SelectionPolicy;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "spend-rollup")]
#[command(about = "Marketing spend and engagement rollups from CSV exports")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file (defaults, then this file, then ROLLUP_* env vars)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SpendDataset {
    /// Brand / manufacturer spend
    Brand,
    /// DME provider spend
    Dme,
}

#[derive(Clone, Copy, ValueEnum)]
enum Split {
    Channel,
    Placement,
}

#[derive(ClapArgs)]
struct FacetArgs {
    /// Which spend export to read
    #[arg(long, value_enum, default_value = "brand")]
    dataset: SpendDataset,

    /// Restrict to these years (repeatable)
    #[arg(long)]
    year: Vec<String>,

    /// Restrict to these month-year labels, e.g. "Jan 2025" (repeatable)
    #[arg(long)]
    month: Vec<String>,

    /// Brand selection (repeatable); empty means the view's default
    #[arg(long)]
    brand: Vec<String>,
}

impl FacetArgs {
    fn period_spec(&self) -> FilterSpec {
        FilterSpec::new()
            .years(self.year.iter().cloned())
            .months(self.month.iter().cloned())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Headline totals and the year / month options
    Figures {
        #[command(flatten)]
        facets: FacetArgs,
    },
    /// Spend share by channel or placement, optionally against a second selection
    Distribution {
        #[command(flatten)]
        facets: FacetArgs,

        #[arg(long, value_enum, default_value = "channel")]
        by: Split,

        /// Right-hand brand selection (repeatable); empty means the preferred brand
        #[arg(long)]
        against: Vec<String>,
    },
    /// Top publishers by spend, optionally against a second selection
    Publishers {
        #[command(flatten)]
        facets: FacetArgs,

        #[arg(long)]
        limit: Option<usize>,

        /// Right-hand brand selection (repeatable); empty means the preferred brand
        #[arg(long)]
        against: Vec<String>,
    },
    /// Monthly spend per brand, or the yearly brand breakdown
    Timeline {
        #[command(flatten)]
        facets: FacetArgs,

        /// Per-year spend and impressions instead of the monthly series
        #[arg(long)]
        yearly: bool,
    },
    /// Jan-Dec spend of the selected brands in two years, with YoY growth
    Comparison {
        #[command(flatten)]
        facets: FacetArgs,

        #[arg(long)]
        base_year: Option<String>,

        #[arg(long)]
        compare_year: Option<String>,
    },
    /// Instagram and TikTok engagement
    Social {
        /// Restrict to these companies (repeatable)
        #[arg(long)]
        company: Vec<String>,

        #[arg(long)]
        year: Vec<String>,

        #[arg(long)]
        top: Option<usize>,
    },
    /// Amazon products and reviews
    Reviews {
        #[arg(long)]
        top: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    observability::init_logging(args.verbose);

    let config = DashboardConfig::load(args.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    let json = args.json;

    match args.command {
        Commands::Figures { facets } => run_figures(&config, facets, json).await,
        Commands::Distribution { facets, by, against } => run_distribution(&config, facets, by, against, json).await,
        Commands::Publishers { facets, limit, against } => run_publishers(&config, facets, limit, against, json).await,
        Commands::Timeline { facets, yearly } => run_timeline(&config, facets, yearly, json).await,
        Commands::Comparison {
            facets,
            base_year,
            compare_year,
        } => run_comparison(&config, facets, base_year, compare_year, json).await,
        Commands::Social { company, year, top } => run_social(&config, company, year, top, json).await,
        Commands::Reviews { top } => run_reviews(&config, top, json).await,
    }
}

async fn load_spend(config: &DashboardConfig, dataset: SpendDataset) -> Result<Dataset<SpendRecord>> {
    let location = match dataset {
        SpendDataset::Brand => config.resolve(&config.spend_csv),
        SpendDataset::Dme => config.resolve(&config.dme_csv),
    };
    let source = ingestion::source_for(&location);
    ingestion::load::<SpendRecord>(source.as_ref())
        .await
        .with_context(|| format!("Failed to load spend data from {}", location))
}

/// Spend records narrowed to the requested years and months.
async fn load_period(config: &DashboardConfig, facets: &FacetArgs) -> Result<Vec<SpendRecord>> {
    let dataset = load_spend(config, facets.dataset).await?;
    let spec = facets.period_spec();
    let records: Vec<SpendRecord> = filter::filter_records(&dataset.records, &spec)
        .into_iter()
        .cloned()
        .collect();
    info!("{} of {} rows in period", records.len(), dataset.len());
    Ok(records)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_header(title: &str) {
    println!("\n{}", "=".repeat(80));
    println!(" {}", title);
    println!("{}", "=".repeat(80));
}

async fn run_figures(config: &DashboardConfig, facets: FacetArgs, json: bool) -> Result<()> {
    let dataset = load_spend(config, facets.dataset).await?;
    let spec = facets.period_spec().brands(facets.brand.iter().cloned());
    let records: Vec<&SpendRecord> = filter::filter_records(&dataset.records, &spec);
    let figures = reports::general_figures(&records);
    let options = reports::facets(&dataset.records, &facets.year);

    if json {
        #[derive(Serialize)]
        struct Output<'a> {
            figures: &'a reports::GeneralFigures,
            options: &'a reports::Facets,
        }
        return print_json(&Output {
            figures: &figures,
            options: &options,
        });
    }

    print_header("GENERAL FIGURES");
    println!("   Total spend:        {}", format_currency(figures.total_spend));
    println!("   Total impressions:  {}", format_number(figures.total_impressions));
    println!("   Brands:             {}", figures.unique_brands);
    println!("   Publishers:         {}", figures.unique_publishers);
    println!("\n   Years:  {}", options.years.join(", "));
    println!("   Months: {}", options.months.join(", "));
    Ok(())
}

/// `--against`, or the preferred brand (top spender as fallback) when empty.
fn right_selection(config: &DashboardConfig, records: &[SpendRecord], against: Vec<String>) -> Vec<String> {
    if against.is_empty() {
        SelectionPolicy::PreferredOrTop(config.preferred_brand.clone()).resolve(records)
    } else {
        against
    }
}

async fn run_distribution(
    config: &DashboardConfig,
    facets: FacetArgs,
    by: Split,
    against: Vec<String>,
    json: bool,
) -> Result<()> {
    let records = load_period(config, &facets).await?;
    let right = right_selection(config, &records, against);
    let dimension = match by {
        Split::Channel => Dimension::Channel,
        Split::Placement => Dimension::Placement,
    };
    let comparison = reports::compare_distributions(&records, &facets.brand, &right, dimension);

    if json {
        return print_json(&comparison);
    }

    for side in [&comparison.left, &comparison.right] {
        print_header(&format!("{} DISTRIBUTION: {}", dimension.as_str().to_uppercase(), side.label));
        println!("   Total spend: {}", format_currency(side.total));
        for row in &side.rows {
            println!(
                "   {:<40} {:>10} {:>8}",
                row.key,
                format_currency(row.sum),
                format_percentage(row.percentage)
            );
        }
    }
    Ok(())
}

async fn run_publishers(
    config: &DashboardConfig,
    facets: FacetArgs,
    limit: Option<usize>,
    against: Vec<String>,
    json: bool,
) -> Result<()> {
    let records = load_period(config, &facets).await?;
    let limit = limit.unwrap_or(config.publisher_limit);
    let right = right_selection(config, &records, against);
    let comparison = reports::compare_publishers(&records, &facets.brand, &right, limit);

    if json {
        return print_json(&comparison);
    }

    for ranking in [&comparison.left, &comparison.right] {
        print_header(&format!(
            "TOP {} PUBLISHERS: {} (total {})",
            limit,
            ranking.label,
            format_currency(ranking.total)
        ));
        for row in &ranking.rows {
            println!(
                "   {:>3}. {:<40} {:>10}  share {}",
                row.rank,
                row.publisher,
                format_currency(row.spend),
                format_percentage(row.percentage)
            );
        }
    }
    Ok(())
}

async fn run_timeline(config: &DashboardConfig, facets: FacetArgs, yearly: bool, json: bool) -> Result<()> {
    let records = load_period(config, &facets).await?;

    if yearly {
        let brands = if facets.brand.is_empty() {
            SelectionPolicy::TopBySpend(config.spend_brand_limit).resolve(&records)
        } else {
            facets.brand.clone()
        };
        let breakdown = reports::yearly_brand_breakdown(&records);
        let table = reports::year_brand_table(&breakdown, &brands);
        if json {
            #[derive(Serialize)]
            struct Output<'a> {
                years: &'a [reports::YearBreakdown],
                table: &'a reports::timeline::YearBrandTable,
            }
            return print_json(&Output {
                years: &breakdown,
                table: &table,
            });
        }

        for year in &breakdown {
            print_header(&format!(
                "{}: spend {}, impressions {}",
                year.year,
                format_currency(year.total_spend),
                format_number(year.total_impressions)
            ));
            for brand in &year.brands {
                println!(
                    "   {:<40} {:>10} {:>8} {:>10} {:>8}",
                    brand.brand,
                    format_currency(brand.spend),
                    format_percentage(brand.spend_share),
                    format_number(brand.impressions),
                    format_percentage(brand.impressions_share)
                );
            }
        }
        print_header("SPEND BY YEAR");
        println!("   {:<6} {}", "Year", table.brands.join(" | "));
        for row in &table.rows {
            let cells: Vec<String> = row.spend.iter().map(|v| format_whole_currency(*v)).collect();
            println!("   {:<6} {}", row.year, cells.join(" | "));
        }
        return Ok(());
    }

    let brands = if facets.brand.is_empty() {
        SelectionPolicy::TopBySpend(config.timeline_brand_limit).resolve(&records)
    } else {
        facets.brand.clone()
    };
    let timeline = reports::monthly_timeline(&records, &brands);

    if json {
        return print_json(&timeline);
    }

    print_header(&format!("SPEND OVER TIME: {}", brands.join(", ")));
    for point in &timeline.points {
        let values: Vec<String> = point
            .values
            .iter()
            .filter(|v| v.spend != 0.0)
            .map(|v| format!("{} {} ({:.0}%)", v.brand, format_currency(v.spend), v.percentage))
            .collect();
        println!(
            "   {:<10} total {:>8}  {}",
            point.month_year,
            format_currency(point.total),
            values.join(", ")
        );
    }
    Ok(())
}

async fn run_comparison(
    config: &DashboardConfig,
    facets: FacetArgs,
    base_year: Option<String>,
    compare_year: Option<String>,
    json: bool,
) -> Result<()> {
    let records = load_period(config, &facets).await?;
    let brands = if facets.brand.is_empty() {
        SelectionPolicy::PreferredOrTop(config.preferred_brand.clone()).resolve(&records)
    } else {
        facets.brand.clone()
    };
    let base_year = base_year.unwrap_or_else(|| config.base_year.clone());
    let compare_year = compare_year.unwrap_or_else(|| config.compare_year.clone());
    let table = reports::comparison_table(&records, &brands, &base_year, &compare_year);

    if json {
        return print_json(&table);
    }

    for (idx, brand) in table.brands.iter().enumerate() {
        print_header(&format!("{}: {} vs {}", brand, table.base_year, table.compare_year));
        println!("   {:<5} {:>14} {:>14} {:>8}", "Month", table.base_year, table.compare_year, "YoY");
        for row in &table.rows {
            let cell = row.cells[idx];
            println!(
                "   {:<5} {:>14} {:>14} {:>8}",
                row.month,
                format_whole_currency(cell.base),
                format_whole_currency(cell.compare),
                format_yoy(cell.yoy)
            );
        }
    }
    Ok(())
}

async fn run_social(
    config: &DashboardConfig,
    company: Vec<String>,
    year: Vec<String>,
    top: Option<usize>,
    json: bool,
) -> Result<()> {
    let instagram = ingestion::source_for(&config.resolve(&config.instagram_csv));
    let tiktok = ingestion::source_for(&config.resolve(&config.tiktok_csv));
    let (instagram, tiktok) = tokio::try_join!(
        ingestion::load_social(instagram.as_ref(), Platform::Instagram),
        ingestion::load_social(tiktok.as_ref(), Platform::TikTok),
    )
    .context("Failed to load social media data")?;

    let posts: Vec<SocialPost> = instagram.records.into_iter().chain(tiktok.records).collect();
    let spec = FilterSpec::new()
        .with(Dimension::Company, company)
        .years(year);
    let report = reports::social_report(&posts, &spec, top.unwrap_or(config.top_posts));

    if json {
        return print_json(&report);
    }

    for summary in &report.platforms {
        print_header(&format!("{} ({} posts)", summary.platform.as_str().to_uppercase(), summary.posts));
        println!("   Engagement:       {}", format_number(summary.total_engagement));
        println!("   Likes:            {}", format_number(summary.likes));
        println!("   Comments:         {}", format_number(summary.comments));
        if summary.platform == Platform::TikTok {
            println!("   Shares:           {}", format_number(summary.shares));
            println!("   Views:            {}", format_number(summary.views));
        } else {
            println!("   Est. impressions: {}", format_number(summary.estimated_impressions));
        }
        println!("   Avg. engagement:  {}", format_percentage(summary.avg_engagement_rate * 100.0));
        println!("   Companies:        {}", summary.unique_companies);
    }

    print_header("ENGAGEMENT BY COMPANY");
    for row in &report.by_company {
        println!(
            "   {:<40} {:>10} {:>8}",
            row.key,
            format_number(row.sum),
            format_percentage(row.percentage)
        );
    }

    print_header("TOP POSTS");
    for post in &report.top_posts {
        println!(
            "   @{:<30} {:>10} engagements  {}",
            post.presence_handle,
            format_number(post.engagement_total),
            post.published_date
        );
    }
    Ok(())
}

async fn run_reviews(config: &DashboardConfig, top: Option<usize>, json: bool) -> Result<()> {
    let products = ingestion::source_for(&config.resolve(&config.products_csv));
    let reviews = ingestion::source_for(&config.resolve(&config.reviews_csv));
    let (products, reviews) = tokio::try_join!(
        ingestion::load::<ProductRow>(products.as_ref()),
        ingestion::load::<ReviewRow>(reviews.as_ref()),
    )
    .context("Failed to load Amazon review data")?;

    let catalog = reports::review_catalog(&products.records, &reviews.records, top.unwrap_or(config.top_products));

    if json {
        return print_json(&catalog);
    }

    print_header("BRAND OVERVIEW");
    for brand in &catalog.brands {
        println!(
            "   {:<30} {:>3} products  {:>8} ratings  avg {:>9}  {:>6} off  {:.2} stars",
            brand.brand,
            brand.product_count,
            format_number(brand.total_ratings),
            format_currency(brand.avg_price),
            format_percentage(brand.avg_discount),
            brand.avg_star_rating
        );
    }

    print_header("RATING DISTRIBUTION");
    for bucket in &catalog.rating_distribution {
        println!("   {} stars  {:>6}  {}", bucket.stars, bucket.count, format_percentage(bucket.percentage));
    }

    print_header("TOP RATED PRODUCTS");
    for product in &catalog.top_products {
        println!(
            "   {:.2} ({} reviews)  {}  {}",
            product.avg_review_rating.unwrap_or(product.star_rating),
            product.review_count,
            product.brand,
            product.title
        );
    }
    Ok(())
}
