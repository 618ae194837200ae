use crate::processor::schema::GOVERNED_COLUMNS;
use polars::prelude::DataFrame;

/// What one pipeline run did to the table, for end-of-run reporting.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub source_rows: usize,
    pub removed_rows: usize,
    pub final_rows: usize,
    /// Non-null counts for the governed columns that exist in the output.
    pub non_null_counts: Vec<(String, usize)>,
}

impl PipelineSummary {
    pub fn from_frame(df: &DataFrame, source_rows: usize, removed_rows: usize) -> Self {
        let non_null_counts = GOVERNED_COLUMNS
            .iter()
            .filter_map(|(name, _)| {
                df.column(name)
                    .ok()
                    .map(|column| (name.to_string(), column.len() - column.null_count()))
            })
            .collect();

        Self {
            source_rows,
            removed_rows,
            final_rows: df.height(),
            non_null_counts,
        }
    }
}
