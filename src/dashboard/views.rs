use anyhow::Result;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Headline numbers for the top of the analytics view. Every metric is
/// optional because every source column is.
#[derive(Debug, Clone)]
pub struct KeyMetrics {
    pub total_revenue: Option<f64>,
    pub average_profit_margin: Option<f64>,
    pub average_discount_percentage: Option<f64>,
    pub average_rating: Option<f64>,
}

pub fn key_metrics(df: &DataFrame) -> KeyMetrics {
    KeyMetrics {
        total_revenue: column_sum(df, "discounted_price"),
        average_profit_margin: column_mean(df, "profit_margin"),
        average_discount_percentage: column_mean(df, "discount_percentage"),
        average_rating: column_mean(df, "rating"),
    }
}

fn column_mean(df: &DataFrame, name: &str) -> Option<f64> {
    df.column(name)
        .ok()
        .and_then(|column| column.as_materialized_series().mean())
}

fn column_sum(df: &DataFrame, name: &str) -> Option<f64> {
    df.column(name)
        .ok()
        .and_then(|column| column.as_materialized_series().sum::<f64>().ok())
}

/// Top-N products by rating_count: name, count, and whichever of
/// discounted_price / rating are available.
pub fn top_products(df: &DataFrame, n: usize) -> Result<DataFrame> {
    if df.column("rating_count").is_err() || df.column("product_name").is_err() {
        return Ok(DataFrame::empty());
    }

    let sorted = df.sort(
        ["rating_count"],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_nulls_last(true),
    )?;
    let top = sorted.head(Some(n));

    let mut selection = vec!["product_name", "rating_count"];
    for optional in ["discounted_price", "rating"] {
        if top.column(optional).is_ok() {
            selection.push(optional);
        }
    }

    Ok(top.select(selection)?)
}

/// Product counts per category, top 10 descending.
pub fn category_counts(df: &DataFrame, top: usize) -> Result<DataFrame> {
    if df.column("category").is_err() {
        return Ok(DataFrame::empty());
    }

    let out = df
        .clone()
        .lazy()
        .drop_nulls(Some(cols(["category"])))
        .group_by([col("category")])
        .agg([len().alias("product_count")])
        .sort(
            ["product_count"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .limit(top as IdxSize)
        .collect()?;

    Ok(out)
}

/// discounted_price sums per category, top 10 descending.
pub fn category_revenue(df: &DataFrame, top: usize) -> Result<DataFrame> {
    if df.column("category").is_err() || df.column("discounted_price").is_err() {
        return Ok(DataFrame::empty());
    }

    let out = df
        .clone()
        .lazy()
        .drop_nulls(Some(cols(["category"])))
        .group_by([col("category")])
        .agg([col("discounted_price").sum().alias("total_revenue")])
        .sort(
            ["total_revenue"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .limit(top as IdxSize)
        .collect()?;

    Ok(out)
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over a numeric column, nulls skipped. Used for
/// the profit_margin and discount_percentage distributions.
pub fn histogram(df: &DataFrame, column: &str, bins: usize) -> Result<Vec<HistogramBin>> {
    let Ok(values) = df.column(column) else {
        return Ok(Vec::new());
    };
    let values: Vec<f64> = values.f64()?.into_iter().flatten().collect();
    if values.is_empty() || bins == 0 {
        return Ok(Vec::new());
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in &values {
        let idx = if width > 0.0 {
            (((value - min) / width) as usize).min(bins - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count,
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct DiscountBin {
    pub label: &'static str,
    pub average_rating: Option<f64>,
    pub products: usize,
}

const DISCOUNT_BIN_LABELS: [&str; 5] = ["0-20%", "20-40%", "40-60%", "60-80%", "80-100%"];

/// Average rating per fixed 20-point discount range. Rows need both a
/// discount_percentage and a rating; the last bin is closed at 100.
pub fn rating_by_discount_bins(df: &DataFrame) -> Result<Vec<DiscountBin>> {
    if df.column("discount_percentage").is_err() || df.column("rating").is_err() {
        return Ok(Vec::new());
    }

    let discounts = df.column("discount_percentage")?.f64()?.clone();
    let ratings = df.column("rating")?.f64()?.clone();

    let mut sums = [0.0f64; 5];
    let mut counts = [0usize; 5];
    for (discount, rating) in discounts.into_iter().zip(ratings.into_iter()) {
        let (Some(discount), Some(rating)) = (discount, rating) else {
            continue;
        };
        if !(0.0..=100.0).contains(&discount) {
            continue;
        }
        let idx = ((discount / 20.0) as usize).min(4);
        sums[idx] += rating;
        counts[idx] += 1;
    }

    Ok(DISCOUNT_BIN_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| DiscountBin {
            label,
            average_rating: (counts[i] > 0).then(|| sums[i] / counts[i] as f64),
            products: counts[i],
        })
        .collect())
}

/// One page of the detail table.
pub fn paginate(df: &DataFrame, page: usize, page_size: usize) -> DataFrame {
    df.slice((page * page_size) as i64, page_size)
}

/// CSV export of the currently filtered view, full overwrite.
pub fn export_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let mut out = df.clone();
    let file = File::create(path)?;
    CsvWriter::new(file).finish(&mut out)?;
    Ok(())
}
