use regex::Regex;
use tracing::warn;

/// Per-cell cleaning of dirty numeric strings. Each policy strips its own
/// set of symbols before the generic float parse so the diagnostics can
/// name the right semantic context. Malformed input never raises: it
/// degrades to `None` plus a warning.
pub struct FieldNormalizer {
    currency_glyphs: Regex,
    non_numeric: Regex,
}

impl FieldNormalizer {
    pub fn new() -> Self {
        Self {
            // Rupee sign plus its utf-8-read-as-latin-1 mojibake form "â‚¹".
            currency_glyphs: Regex::new(r"[â‚¹₹]").unwrap(),
            non_numeric: Regex::new(r"[^\d.,]").unwrap(),
        }
    }

    /// Currency cells: strip the rupee glyphs, then anything that is not a
    /// digit, `.` or `,`, then thousands commas, then parse.
    pub fn normalize_currency(&self, raw: Option<&str>) -> Option<f64> {
        let value = raw?;
        let stripped = self.currency_glyphs.replace_all(value, "");
        let cleaned = self
            .non_numeric
            .replace_all(&stripped, "")
            .replace(',', "");

        match cleaned.parse::<f64>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(
                    "could not convert '{}' to float, cleaned to '{}'",
                    value, cleaned
                );
                None
            }
        }
    }

    /// Percentage cells: drop the percent glyph and surrounding whitespace.
    /// The value stays on the 0-100 scale. Signs and exponents survive the
    /// stripping and are left to the float grammar.
    pub fn normalize_percentage(&self, raw: Option<&str>) -> Option<f64> {
        let value = raw?;
        let cleaned = value.replace('%', "");
        let cleaned = cleaned.trim();

        match cleaned.parse::<f64>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!("could not convert percentage '{}' to float", value);
                None
            }
        }
    }

    /// Count cells: remove every comma regardless of grouping convention
    /// ("1,24,863" and "124,863" both clean to the same number).
    pub fn normalize_count(&self, raw: Option<&str>) -> Option<f64> {
        let value = raw?;
        let cleaned = value.replace(',', "");

        match cleaned.trim().parse::<f64>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!("could not convert rating count '{}' to float", value);
                None
            }
        }
    }

    /// Best-effort numeric coercion with no symbol stripping and no
    /// diagnostic on failure.
    pub fn normalize_plain_numeric(&self, raw: Option<&str>) -> Option<f64> {
        raw?.trim().parse::<f64>().ok()
    }
}

impl Default for FieldNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Column-name cleanup: trim, strip byte-order-mark artifacts (both the
/// real U+FEFF and its "ï»¿" mojibake), fix the stray "â" mis-encoding,
/// lowercase, spaces to underscores. Idempotent.
pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .replace('\u{feff}', "")
        .replace("ï»¿", "")
        .replace('â', "a")
        .to_lowercase()
        .replace(' ', "_")
}
