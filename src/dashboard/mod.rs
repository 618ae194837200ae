pub mod filters;
pub mod views;

pub use filters::{ALL_CATEGORIES, FilterState, apply_filters};
