use polars::prelude::DataFrame;

/// The cleaning policies a governed column can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningPolicy {
    Currency,
    Percentage,
    Count,
    PlainNumeric,
}

/// Governed numeric columns and the one policy that applies to each.
/// Governing a new column is a one-line edit here.
pub const GOVERNED_COLUMNS: &[(&str, CleaningPolicy)] = &[
    ("discounted_price", CleaningPolicy::Currency),
    ("actual_price", CleaningPolicy::Currency),
    ("discount_percentage", CleaningPolicy::Percentage),
    ("rating_count", CleaningPolicy::Count),
    ("rating", CleaningPolicy::PlainNumeric),
];

/// Rows missing any of these keys are dropped, not repaired.
pub const KEY_COLUMNS: &[&str] = &["product_id", "product_name"];

/// Which recognized columns the loaded table actually has. Discovered once
/// after column-name normalization; every later pipeline step branches on
/// this instead of re-checking membership ad hoc.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub governed: Vec<(String, CleaningPolicy)>,
    pub key_columns: Vec<String>,
    pub has_prices: bool,
}

impl TableSchema {
    pub fn discover(df: &DataFrame) -> Self {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let governed = GOVERNED_COLUMNS
            .iter()
            .filter(|(name, _)| present.iter().any(|c| c == name))
            .map(|(name, policy)| (name.to_string(), *policy))
            .collect();

        let key_columns = KEY_COLUMNS
            .iter()
            .filter(|name| present.iter().any(|c| c == *name))
            .map(|name| name.to_string())
            .collect();

        let has_prices = present.iter().any(|c| c == "actual_price")
            && present.iter().any(|c| c == "discounted_price");

        TableSchema {
            governed,
            key_columns,
            has_prices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn discovers_only_present_columns() {
        let df = df!(
            "product_id" => ["a"],
            "discounted_price" => ["₹100"],
            "rating" => ["4.2"],
            "vendor_notes" => ["unrecognized, passes through"],
        )
        .unwrap();

        let schema = TableSchema::discover(&df);

        assert_eq!(
            schema.governed,
            vec![
                ("discounted_price".to_string(), CleaningPolicy::Currency),
                ("rating".to_string(), CleaningPolicy::PlainNumeric),
            ]
        );
        assert_eq!(schema.key_columns, vec!["product_id".to_string()]);
        assert!(!schema.has_prices);
    }

    #[test]
    fn has_prices_requires_both_price_columns() {
        let df = df!(
            "actual_price" => ["₹100"],
            "discounted_price" => ["₹80"],
        )
        .unwrap();

        assert!(TableSchema::discover(&df).has_prices);
    }

    #[test]
    fn empty_schema_for_unrecognized_table() {
        let df = df!("foo" => ["x"], "bar" => ["y"]).unwrap();
        let schema = TableSchema::discover(&df);

        assert!(schema.governed.is_empty());
        assert!(schema.key_columns.is_empty());
        assert!(!schema.has_prices);
    }
}
