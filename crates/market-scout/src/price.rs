//! Price text parsing and formatting.
//!
//! Prices on the marketplace are rendered as comma-grouped integers
//! (`"1,000"`, `"12,500,000"`). Anything else is rejected so the extractor
//! can drop the record instead of keeping a malformed listing.

use regex::Regex;
use std::sync::LazyLock;

static GROUPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,3}(?:,\d{3})*|\d+)$").expect("valid price pattern"));

/// A price string that is not a non-negative comma-grouped integer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unparsable price text: {text:?}")]
pub struct PriceParseError {
    pub text: String,
}

/// Parse a price such as `"2,500"` into `2500`.
///
/// Surrounding whitespace is ignored. Commas must group digits in threes;
/// an ungrouped run of digits is also accepted.
pub fn parse_price(text: &str) -> Result<u64, PriceParseError> {
    let trimmed = text.trim();
    let err = || PriceParseError {
        text: text.to_string(),
    };

    if !GROUPED.is_match(trimmed) {
        return Err(err());
    }

    trimmed.replace(',', "").parse::<u64>().map_err(|_| err())
}

/// Render a price with comma grouping, the inverse of [`parse_price`].
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
