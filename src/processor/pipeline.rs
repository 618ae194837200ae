use crate::errors::PipelineError;
use crate::loader;
use crate::models::PipelineSummary;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

use super::field_normalizer::{self, FieldNormalizer};
use super::schema::{CleaningPolicy, TableSchema};

/// Drives one source table end to end: load, normalize column names,
/// clean governed numeric fields, drop null-key rows, derive metrics,
/// write the cleaned artifact.
pub struct SalesPipeline {
    normalizer: FieldNormalizer,
}

impl SalesPipeline {
    pub fn new() -> Self {
        Self {
            normalizer: FieldNormalizer::new(),
        }
    }

    pub fn run(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<(DataFrame, PipelineSummary), PipelineError> {
        info!("loading data from {}", input.display());
        let mut df = loader::load_table(input)?;
        info!(
            "original data shape: {} rows x {} columns",
            df.height(),
            df.width()
        );

        let summary = self.transform(&mut df)?;

        self.write_artifact(&mut df, output)?;
        info!(
            "final data shape: {} rows x {} columns",
            df.height(),
            df.width()
        );

        Ok((df, summary))
    }

    /// The cleaning stages over an already-loaded raw frame. Split from
    /// `run` so the transformation can be driven without touching the
    /// filesystem.
    pub fn transform(&self, df: &mut DataFrame) -> Result<PipelineSummary, PipelineError> {
        self.normalize_column_names(df)?;

        let schema = TableSchema::discover(df);
        self.normalize_fields(df, &schema)?;

        let source_rows = df.height();
        let removed_rows = self.filter_null_keys(df, &schema)?;

        self.derive_metrics(df, &schema)?;

        Ok(PipelineSummary::from_frame(df, source_rows, removed_rows))
    }

    fn normalize_column_names(&self, df: &mut DataFrame) -> Result<(), PipelineError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for name in names {
            let normalized = field_normalizer::normalize_column_name(&name);
            if normalized != name {
                df.rename(&name, normalized.into())?;
            }
        }

        Ok(())
    }

    /// Replace each governed string column with its cleaned Float64
    /// counterpart. Columns the schema did not discover are untouched.
    fn normalize_fields(
        &self,
        df: &mut DataFrame,
        schema: &TableSchema,
    ) -> Result<(), PipelineError> {
        for (column, policy) in &schema.governed {
            info!("cleaning {}...", column);

            let raw = df.column(column)?.clone();
            let normalized: Vec<Option<f64>> = match raw.dtype() {
                DataType::String => raw
                    .str()?
                    .into_iter()
                    .map(|cell| self.apply_policy(*policy, cell))
                    .collect(),
                // Already-numeric input (e.g. a pre-typed frame in tests)
                // only needs the float cast.
                _ => raw.cast(&DataType::Float64)?.f64()?.into_iter().collect(),
            };

            df.with_column(Series::new(column.as_str().into(), normalized))?;
        }

        Ok(())
    }

    fn apply_policy(&self, policy: CleaningPolicy, cell: Option<&str>) -> Option<f64> {
        match policy {
            CleaningPolicy::Currency => self.normalizer.normalize_currency(cell),
            CleaningPolicy::Percentage => self.normalizer.normalize_percentage(cell),
            CleaningPolicy::Count => self.normalizer.normalize_count(cell),
            CleaningPolicy::PlainNumeric => self.normalizer.normalize_plain_numeric(cell),
        }
    }

    /// Drop rows where any present key column is null and report how many
    /// went. Absent key columns skip their part of the filter entirely.
    fn filter_null_keys(
        &self,
        df: &mut DataFrame,
        schema: &TableSchema,
    ) -> Result<usize, PipelineError> {
        if schema.key_columns.is_empty() {
            return Ok(0);
        }

        let initial = df.height();
        let mut mask: Option<BooleanChunked> = None;
        for key in &schema.key_columns {
            let not_null = df.column(key)?.as_materialized_series().is_not_null();
            mask = Some(match mask {
                Some(m) => m & not_null,
                None => not_null,
            });
        }

        if let Some(mask) = mask {
            *df = df.filter(&mask)?;
        }

        let removed = initial - df.height();
        info!(
            "removed {} rows with missing product_id or product_name",
            removed
        );
        Ok(removed)
    }

    /// profit_margin and discount_ratio, computed only where both prices
    /// are non-missing. If either price column is absent the derived
    /// columns are not created at all.
    fn derive_metrics(&self, df: &mut DataFrame, schema: &TableSchema) -> Result<(), PipelineError> {
        if !schema.has_prices {
            return Ok(());
        }

        let actual = df.column("actual_price")?.f64()?.clone();
        let discounted = df.column("discounted_price")?.f64()?.clone();

        let mut margins = Vec::with_capacity(df.height());
        let mut ratios = Vec::with_capacity(df.height());
        for (actual_opt, discounted_opt) in actual.into_iter().zip(discounted.into_iter()) {
            match (actual_opt, discounted_opt) {
                (Some(actual), Some(discounted)) => {
                    margins.push(Some(actual - discounted));
                    ratios.push(Some(discounted / actual));
                }
                _ => {
                    margins.push(None);
                    ratios.push(None);
                }
            }
        }

        df.with_column(Series::new("profit_margin".into(), margins))?;
        df.with_column(Series::new("discount_ratio".into(), ratios))?;

        Ok(())
    }

    /// Full overwrite of the cleaned artifact, utf-8.
    fn write_artifact(&self, df: &mut DataFrame, output: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(output)?;
        CsvWriter::new(file).finish(df)?;
        info!("data saved to {}", output.display());

        Ok(())
    }
}

impl Default for SalesPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir()
            .join("sales_pipeline_tests")
            .join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn raw_frame() -> DataFrame {
        df!(
            "ï»¿Product ID" => [Some("P001"), Some("P002"), Some("P003"), Some("P004"), Some("P005")],
            "Product Name" => [Some("Cable"), Some("Charger"), None, Some("Stand"), Some("Hub")],
            "category" => ["Electronics", "Electronics", "Electronics", "Home", "Computers"],
            "Discounted Price" => [Some("₹399"), Some("N/A"), Some("₹149"), Some("₹1,099.50"), Some("â‚¹799")],
            "Actual Price" => [Some("₹1,099"), Some("₹699"), Some("₹349"), Some("₹2,199"), None],
            "discount_percentage" => ["64%", "50%", "57%", "50%", "20%"],
            "rating" => ["4.2", "4.0", "3.9", "oops", "4.5"],
            "rating_count" => ["24,269", "1,24,863", "7,928", "994", "43,994"],
        )
        .unwrap()
    }

    #[test]
    fn transform_cleans_filters_and_derives() {
        let pipeline = SalesPipeline::new();
        let mut df = raw_frame();

        let summary = pipeline.transform(&mut df).unwrap();

        // Row 3 lost its product_name, so exactly one row drops.
        assert_eq!(summary.source_rows, 5);
        assert_eq!(summary.removed_rows, 1);
        assert_eq!(summary.final_rows, 4);
        assert_eq!(df.height(), 4);

        // Governed columns are now typed.
        assert_eq!(df.column("discounted_price").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("rating").unwrap().dtype(), &DataType::Float64);

        let discounted = df.column("discounted_price").unwrap().f64().unwrap();
        assert_eq!(discounted.get(0), Some(399.0));
        // "N/A" degraded to missing instead of aborting.
        assert_eq!(discounted.get(1), None);
        assert_eq!(discounted.get(2), Some(1099.50));
        // Mojibake rupee glyph cleaned like the real one.
        assert_eq!(discounted.get(3), Some(799.0));

        let counts = df.column("rating_count").unwrap().f64().unwrap();
        assert_eq!(counts.get(1), Some(124863.0));

        // Unparseable rating is silently missing.
        let ratings = df.column("rating").unwrap().f64().unwrap();
        assert_eq!(ratings.get(2), None);

        // Derived metrics exist where both prices do.
        let margins = df.column("profit_margin").unwrap().f64().unwrap();
        let ratios = df.column("discount_ratio").unwrap().f64().unwrap();
        assert_eq!(margins.get(0), Some(700.0));
        assert!((ratios.get(0).unwrap() - 399.0 / 1099.0).abs() < 1e-12);
        // discounted_price missing on row 1 -> both derived missing.
        assert_eq!(margins.get(1), None);
        assert_eq!(ratios.get(1), None);
        // actual_price missing on the last row -> both derived missing.
        assert_eq!(margins.get(3), None);
        assert_eq!(ratios.get(3), None);
    }

    #[test]
    fn derived_metrics_match_definition() {
        let pipeline = SalesPipeline::new();
        let mut df = df!(
            "product_id" => ["P1"],
            "product_name" => ["Widget"],
            "actual_price" => ["100.0"],
            "discounted_price" => ["80.0"],
        )
        .unwrap();

        pipeline.transform(&mut df).unwrap();

        let margin = df.column("profit_margin").unwrap().f64().unwrap().get(0);
        let ratio = df.column("discount_ratio").unwrap().f64().unwrap().get(0);
        assert_eq!(margin, Some(20.0));
        assert_eq!(ratio, Some(0.8));
    }

    #[test]
    fn derived_columns_skipped_when_price_column_absent() {
        let pipeline = SalesPipeline::new();
        let mut df = df!(
            "product_id" => ["P1"],
            "product_name" => ["Widget"],
            "discounted_price" => ["₹80"],
        )
        .unwrap();

        pipeline.transform(&mut df).unwrap();

        assert!(df.column("profit_margin").is_err());
        assert!(df.column("discount_ratio").is_err());
    }

    #[test]
    fn filter_skipped_when_key_columns_absent() {
        let pipeline = SalesPipeline::new();
        let mut df = df!(
            "category" => [Some("A"), None],
            "rating" => ["4.0", "3.0"],
        )
        .unwrap();

        let summary = pipeline.transform(&mut df).unwrap();

        assert_eq!(summary.removed_rows, 0);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn unrecognized_columns_pass_through_untouched() {
        let pipeline = SalesPipeline::new();
        let mut df = df!(
            "product_id" => ["P1"],
            "product_name" => ["Widget"],
            "vendor_notes" => ["keep me, verbatim"],
        )
        .unwrap();

        pipeline.transform(&mut df).unwrap();

        let notes = df.column("vendor_notes").unwrap().str().unwrap().get(0);
        assert_eq!(notes, Some("keep me, verbatim"));
    }

    #[test]
    fn end_to_end_from_file() {
        let dir = temp_dir("end_to_end");
        let input = write_file(
            &dir,
            "amazon.csv",
            "product_id,product_name,category,discounted_price,actual_price,discount_percentage,rating,rating_count\n\
             P001,Cable,Electronics,₹399,\"₹1,099\",64%,4.2,\"24,269\"\n\
             P002,Charger,Electronics,N/A,₹699,50%,4.0,\"1,24,863\"\n\
             P003,,Electronics,₹149,₹349,57%,3.9,\"7,928\"\n\
             P004,Stand,Home,\"₹1,099.50\",\"₹2,199\",50%,4.1,994\n\
             P005,Hub,Computers,₹799,\"₹1,599\",50%,4.5,\"43,994\"\n",
        );
        let output = dir.join("standardized_sales.csv");

        let pipeline = SalesPipeline::new();
        let (df, summary) = pipeline.run(&input, &output).unwrap();

        assert_eq!(summary.removed_rows, 1);
        assert_eq!(df.height(), 4);

        // The persisted artifact reloads with the derived columns populated.
        let persisted = CsvReader::new(File::open(&output).unwrap()).finish().unwrap();
        assert_eq!(persisted.height(), 4);
        let margins = persisted.column("profit_margin").unwrap().f64().unwrap();
        assert_eq!(margins.get(0), Some(700.0));
        // The unparseable discounted_price row has missing derived values.
        assert_eq!(margins.get(1), None);
    }

    #[test]
    fn second_run_fully_replaces_the_artifact() {
        let dir = temp_dir("overwrite");
        let output = dir.join("standardized_sales.csv");
        let pipeline = SalesPipeline::new();

        let first = write_file(
            &dir,
            "first.csv",
            "product_id,product_name,rating\nA1,One,4.0\nA2,Two,3.5\nA3,Three,4.8\n",
        );
        pipeline.run(&first, &output).unwrap();

        let second = write_file(
            &dir,
            "second.csv",
            "product_id,product_name,rating\nB1,Only,2.5\n",
        );
        pipeline.run(&second, &output).unwrap();

        let persisted = CsvReader::new(File::open(&output).unwrap()).finish().unwrap();
        assert_eq!(persisted.height(), 1);
        let ids = persisted.column("product_id").unwrap().str().unwrap();
        assert_eq!(ids.get(0), Some("B1"));
    }

    #[test]
    fn missing_source_is_fatal() {
        let pipeline = SalesPipeline::new();
        let err = pipeline
            .run(
                Path::new("data/nope.csv"),
                &temp_dir("missing").join("out.csv"),
            )
            .unwrap_err();

        assert!(matches!(err, PipelineError::SourceNotFound { .. }));
    }
}
