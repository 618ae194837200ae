use anyhow::Result;
use polars::prelude::*;

#[path = "../processor/field_normalizer.rs"]
mod field_normalizer;

#[path = "../processor/schema.rs"]
mod schema;

use field_normalizer::FieldNormalizer;
use schema::{CleaningPolicy, TableSchema};

fn main() -> Result<()> {
    println!("=== TESTING FIELD CLEANING POLICIES ===\n");

    // Dirty cells in the shapes the real export contains: rupee glyphs,
    // mojibake, Indian-style comma grouping, stray text.
    let mut df = df!(
        "ï»¿Product ID" => ["P001", "P002", "P003", "P004", "P005"],
        "Product Name" => ["USB Cable", "Fast Charger", "Phone Stand", "HDMI Hub", "Mouse Pad"],
        "Discounted Price" => ["₹399", "â‚¹1,099", "N/A", "₹149.50", "₹799"],
        "Actual Price" => ["₹1,099", "₹2,199", "₹349", "₹299", "₹1,599"],
        "discount_percentage" => ["64%", "50%", "free", "50%", "50%"],
        "rating" => ["4.2", "4.0", "3.9", "oops", "4.5"],
        "rating_count" => ["24,269", "1,24,863", "7,928", "994", "43,994"],
    )?;

    println!("1. Raw frame:");
    println!("{}\n", df);

    // Column-name cleanup first, so the policy table can match.
    let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for name in names {
        let normalized = field_normalizer::normalize_column_name(&name);
        if normalized != name {
            df.rename(&name, normalized.into())?;
        }
    }

    println!("2. After column-name normalization:");
    println!("columns: {:?}\n", df.get_column_names());

    let table_schema = TableSchema::discover(&df);
    println!(
        "3. Discovered {} governed columns, keys: {:?}\n",
        table_schema.governed.len(),
        table_schema.key_columns
    );

    let normalizer = FieldNormalizer::new();
    for (column, policy) in &table_schema.governed {
        let cleaned: Vec<Option<f64>> = df
            .column(column)?
            .str()?
            .into_iter()
            .map(|cell| match policy {
                CleaningPolicy::Currency => normalizer.normalize_currency(cell),
                CleaningPolicy::Percentage => normalizer.normalize_percentage(cell),
                CleaningPolicy::Count => normalizer.normalize_count(cell),
                CleaningPolicy::PlainNumeric => normalizer.normalize_plain_numeric(cell),
            })
            .collect();
        df.with_column(Series::new(column.as_str().into(), cleaned))?;
    }

    println!("4. After field cleaning:");
    println!("{}\n", df);

    let discounted = df.column("discounted_price")?.f64()?;
    assert_eq!(discounted.get(0), Some(399.0));
    assert_eq!(discounted.get(1), Some(1099.0)); // mojibake rupee
    assert_eq!(discounted.get(2), None); // N/A degrades to missing

    let counts = df.column("rating_count")?.f64()?;
    assert_eq!(counts.get(1), Some(124863.0)); // grouping-independent

    println!("✅ All field cleaning checks passed");
    Ok(())
}
