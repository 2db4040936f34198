//! Review Feed CLI
//!
//! Command-line host for the review feed pipeline: review dataset in,
//! product feed URL in, `reviews.xml` out. Products the feed does not
//! know are listed on the terminal after the run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use review_feed::{
    generate, read_path, GenerateConfig, GeneratedFeed, HttpFeedFetcher, RatingPolicy,
    RecordSynthesizer, FEED_FILENAME,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Generate a merchant review XML feed from a review spreadsheet.
#[derive(Parser)]
#[command(name = "reviewfeed", version, about)]
struct Args {
    /// Review dataset (.csv, .xlsx, .xls or .ods) with columns
    /// product_name, review_content, rating, reviewer
    #[arg(long)]
    reviews: PathBuf,

    /// URL of the product feed to match against
    #[arg(long)]
    feed_url: String,

    /// Output path for the generated document
    #[arg(long, default_value = FEED_FILENAME)]
    out: PathBuf,

    /// What a rating that is not a number means for the run
    #[arg(long, value_enum, default_value_t = BadRating::Abort)]
    on_bad_rating: BadRating,

    /// Seed for synthesized ids and timestamps (reproducible output)
    #[arg(long)]
    seed: Option<u64>,

    /// Also write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum BadRating {
    /// Fail the whole run on the first bad rating cell
    Abort,
    /// Drop the offending row and keep going
    Skip,
}

impl From<BadRating> for RatingPolicy {
    fn from(value: BadRating) -> Self {
        match value {
            BadRating::Abort => RatingPolicy::Abort,
            BadRating::Skip => RatingPolicy::SkipRow,
        }
    }
}

#[derive(Serialize)]
struct RunReport<'a> {
    output: &'a Path,
    matched: usize,
    unmatched: &'a [String],
    skipped_rows: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,review_feed=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let sheet = read_path(&args.reviews)
        .with_context(|| format!("Failed to read review dataset {}", args.reviews.display()))?;

    let config = GenerateConfig::new(&args.feed_url).with_rating_policy(args.on_bad_rating.into());
    let fetcher = HttpFeedFetcher::new();
    let mut synthesizer = match args.seed {
        Some(seed) => RecordSynthesizer::seeded(seed, chrono::Utc::now()),
        None => RecordSynthesizer::new(),
    };

    let feed = generate(&sheet, &fetcher, &mut synthesizer, &config)
        .await
        .context("Feed generation failed")?;

    std::fs::write(&args.out, &feed.xml)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    print_summary(&args.out, &feed);

    if let Some(report_path) = &args.report {
        write_report(report_path, &args.out, &feed)?;
    }

    Ok(())
}

fn print_summary(out: &Path, feed: &GeneratedFeed) {
    println!(
        "{}",
        format!("✅ Wrote {} ({} reviews)", out.display(), feed.matched)
            .bright_green()
            .bold()
    );

    if !feed.unmatched.is_empty() {
        println!();
        println!(
            "{}",
            format!(
                "⚠️  {} review(s) skipped, product not in the feed:",
                feed.unmatched.len()
            )
            .yellow()
            .bold()
        );
        for product in &feed.unmatched {
            println!("{}", format!("   - {product}").yellow());
        }
    }

    if feed.skipped_rows > 0 {
        println!(
            "{}",
            format!("⚠️  {} row(s) dropped for bad ratings", feed.skipped_rows).yellow()
        );
    }
}

fn write_report(report_path: &Path, out: &Path, feed: &GeneratedFeed) -> Result<()> {
    let report = RunReport {
        output: out,
        matched: feed.matched,
        unmatched: &feed.unmatched,
        skipped_rows: feed.skipped_rows,
    };

    let body = serde_json::to_vec_pretty(&report).context("Failed to serialize run report")?;
    std::fs::write(report_path, body)
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;

    println!("{}", format!("📄 Report written to {}", report_path.display()).bright_blue());
    Ok(())
}
