use anyhow::{Context, Result, bail};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

#[path = "../dashboard/mod.rs"]
mod dashboard;

use dashboard::{FilterState, views};

const DEFAULT_ARTIFACT: &str = "data/standardized_sales.csv";

/// Terminal rendition of the analytics view: loads the cleaned artifact
/// and prints the same aggregations the interactive dashboard exposes.
/// Optional args: [category] [rating_min] [rating_max].
fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let path = Path::new(DEFAULT_ARTIFACT);
    if !path.exists() {
        bail!("❌ The standardized data file was not found. Run the ETL process first.");
    }

    let mut df = CsvReader::new(File::open(path)?)
        .finish()
        .context("failed to read the cleaned artifact")?;

    // Columns that are entirely null load as String; force the numeric
    // columns back to floats so the aggregations can run.
    for column in [
        "discounted_price",
        "actual_price",
        "discount_percentage",
        "rating",
        "rating_count",
        "profit_margin",
        "discount_ratio",
    ] {
        if let Ok(existing) = df.column(column).cloned() {
            df.with_column(existing.cast(&DataType::Float64)?)?;
        }
    }

    let mut filters = FilterState::default();
    if let Some(category) = args.first() {
        filters = filters.with_category(category);
    }
    if let (Some(min), Some(max)) = (args.get(1), args.get(2)) {
        filters = filters.with_rating_range(min.parse()?, max.parse()?);
    }

    let view = dashboard::apply_filters(&df, &filters)?;
    println!("=== AMAZON SALES ANALYTICS (text preview) ===");
    println!("{} of {} rows after filters\n", view.height(), df.height());

    let metrics = views::key_metrics(&view);
    println!("--- Key Business Metrics ---");
    if let Some(revenue) = metrics.total_revenue {
        println!("💰 Estimated total revenue: {:.0}", revenue);
    }
    if let Some(margin) = metrics.average_profit_margin {
        println!("📊 Average profit margin: {:.2}", margin);
    }
    if let Some(discount) = metrics.average_discount_percentage {
        println!("🎯 Average discount: {:.1}%", discount);
    }
    if let Some(rating) = metrics.average_rating {
        println!("⭐ Average rating: {:.2}/5.0", rating);
    }

    println!("\n--- Top 10 Products by Ratings Count ---");
    println!("{}", views::top_products(&view, 10)?);

    println!("--- Products by Category (Top 10) ---");
    println!("{}", views::category_counts(&view, 10)?);

    println!("--- Revenue by Category (Top 10) ---");
    println!("{}", views::category_revenue(&view, 10)?);

    println!("--- Profit Margin Distribution ---");
    for bin in views::histogram(&view, "profit_margin", 20)? {
        println!("[{:10.2} .. {:10.2})  {}", bin.lower, bin.upper, bin.count);
    }

    println!("\n--- Discount Distribution ---");
    for bin in views::histogram(&view, "discount_percentage", 20)? {
        println!("[{:6.1} .. {:6.1})  {}", bin.lower, bin.upper, bin.count);
    }

    println!("\n--- Average Rating by Discount Range ---");
    for bin in views::rating_by_discount_bins(&view)? {
        match bin.average_rating {
            Some(avg) => println!("{:>8}: {:.2} ({} products)", bin.label, avg, bin.products),
            None => println!("{:>8}: no data", bin.label),
        }
    }

    println!("\n--- Detail Table (first page) ---");
    println!("{}", views::paginate(&view, 0, 10));

    let export_path = Path::new("data/filtered_export.csv");
    views::export_csv(&view, export_path)?;
    println!("📄 Filtered view exported to {}", export_path.display());

    Ok(())
}
