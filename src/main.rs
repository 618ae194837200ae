use anyhow::{Context, Result};
use tracing::{error, info};

mod config;
mod errors;
mod loader;
mod models;
mod processor;
mod storage;

use config::PipelineConfig;
use errors::PipelineError;
use processor::SalesPipeline;
use storage::SqliteSink;

const CONFIG_PATH: &str = "configs/pipeline.toml";

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run() {
        match e.downcast_ref::<PipelineError>() {
            Some(PipelineError::SourceNotFound { path }) => {
                error!("❌ Error: source file '{}' not found", path.display());
            }
            _ => {
                error!("❌ An unexpected error occurred: {:#}", e);
            }
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    info!("🚀 Starting Amazon sales data pipeline");

    let config = PipelineConfig::load_or_default(CONFIG_PATH);

    // Cleaning and standardization
    let pipeline = SalesPipeline::new();
    let (df, summary) = pipeline.run(&config.paths.input_csv, &config.paths.output_csv)?;

    info!(
        "cleaned {} source rows, removed {}, kept {}",
        summary.source_rows, summary.removed_rows, summary.final_rows
    );
    for (column, non_null) in &summary.non_null_counts {
        info!("{}: {}/{} non-null values", column, non_null, summary.final_rows);
    }

    // Full-replace load into the local warehouse
    let sink = SqliteSink::new(&config.paths.sqlite_db, &config.sink.table_name);
    let loaded = sink
        .load_dataframe(&df)
        .context("failed to load cleaned data into sqlite")?;
    info!(
        "📦 loaded {} rows into table '{}'",
        loaded, config.sink.table_name
    );

    for line in sink.read_sample(config.sink.sample_rows)? {
        info!("sample row: {}", line);
    }

    info!("✅ Process completed successfully. Explore the data with:");
    info!("   cargo run --bin dashboard_preview");

    Ok(())
}
