use anyhow::Result;
use polars::prelude::*;

/// Sentinel meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All Categories";

/// The interactive controls of the analytics view: exact-match category
/// plus an inclusive rating range.
#[derive(Debug, Clone)]
pub struct FilterState {
    pub category: Option<String>,
    pub rating_min: f64,
    pub rating_max: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: None,
            rating_min: 0.0,
            rating_max: 5.0,
        }
    }
}

impl FilterState {
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = if category == ALL_CATEGORIES {
            None
        } else {
            Some(category.to_string())
        };
        self
    }

    pub fn with_rating_range(mut self, min: f64, max: f64) -> Self {
        self.rating_min = min;
        self.rating_max = max;
        self
    }
}

/// Apply the controls to a cleaned table. Each filter only applies if its
/// column exists; rows with a missing value in a filtered column drop out.
pub fn apply_filters(df: &DataFrame, filters: &FilterState) -> Result<DataFrame> {
    let mut view = df.clone();

    if let Some(category) = &filters.category {
        if let Ok(column) = view.column("category") {
            let flags: Vec<bool> = column
                .str()?
                .into_iter()
                .map(|cell| cell == Some(category.as_str()))
                .collect();
            view = view.filter(&BooleanChunked::from_slice("mask".into(), &flags))?;
        }
    }

    if let Ok(column) = view.column("rating") {
        let flags: Vec<bool> = column
            .f64()?
            .into_iter()
            .map(|cell| {
                cell.map(|r| r >= filters.rating_min && r <= filters.rating_max)
                    .unwrap_or(false)
            })
            .collect();
        view = view.filter(&BooleanChunked::from_slice("mask".into(), &flags))?;
    }

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        df!(
            "product_id" => ["P1", "P2", "P3", "P4"],
            "category" => ["Electronics", "Home", "Electronics", "Home"],
            "rating" => [Some(4.5), Some(3.0), None, Some(2.0)],
        )
        .unwrap()
    }

    #[test]
    fn category_filter_is_exact_match() {
        let view = apply_filters(
            &sample_frame(),
            &FilterState::default().with_category("Electronics"),
        )
        .unwrap();

        // P3 has a null rating and drops out of the rating range too.
        assert_eq!(view.height(), 1);
        let ids = view.column("product_id").unwrap().str().unwrap();
        assert_eq!(ids.get(0), Some("P1"));
    }

    #[test]
    fn all_categories_sentinel_disables_the_filter() {
        let state = FilterState::default().with_category(ALL_CATEGORIES);
        assert!(state.category.is_none());

        let view = apply_filters(&sample_frame(), &state).unwrap();
        // Only the null-rating row is excluded by the default rating range.
        assert_eq!(view.height(), 3);
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        let view = apply_filters(
            &sample_frame(),
            &FilterState::default().with_rating_range(2.0, 3.0),
        )
        .unwrap();

        assert_eq!(view.height(), 2);
        let ids = view.column("product_id").unwrap().str().unwrap();
        assert_eq!(ids.get(0), Some("P2"));
        assert_eq!(ids.get(1), Some("P4"));
    }

    #[test]
    fn filters_are_noops_for_absent_columns() {
        let df = df!("product_id" => ["P1"]).unwrap();
        let view = apply_filters(
            &df,
            &FilterState::default().with_category("Electronics"),
        )
        .unwrap();

        assert_eq!(view.height(), 1);
    }
}
