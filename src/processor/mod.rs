pub mod field_normalizer;
pub mod pipeline;
pub mod schema;

pub use field_normalizer::FieldNormalizer;
pub use pipeline::SalesPipeline;
pub use schema::{CleaningPolicy, TableSchema};
