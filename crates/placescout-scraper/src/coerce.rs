//! Numeric coercion of rating and review-count text.

use thiserror::Error;

/// Why a numeric field could not be coerced. The record keeps a `None`
/// sentinel for the field either way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldParseError {
    #[error("source text is absent")]
    Absent,

    #[error("malformed value: {0:?}")]
    Malformed(String),
}

/// Parses rating text, normalising a comma decimal separator.
///
/// `"4,5"` and `"4.5"` both give `4.5`.
///
/// # Errors
///
/// Returns [`FieldParseError::Absent`] for missing or blank text and
/// [`FieldParseError::Malformed`] when the text is not a finite number.
pub fn parse_rating(text: Option<&str>) -> Result<f64, FieldParseError> {
    let raw = non_blank(text)?;
    let normalized = raw.replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FieldParseError::Malformed(raw.to_owned())),
    }
}

/// Parses review-count text by keeping only its digits.
///
/// `"1.234 reviews"` and `"(1,234)"` both give `1234`.
///
/// # Errors
///
/// Returns [`FieldParseError::Absent`] for missing or blank text and
/// [`FieldParseError::Malformed`] when no digits remain or the count
/// overflows.
pub fn parse_review_count(text: Option<&str>) -> Result<u64, FieldParseError> {
    let raw = non_blank(text)?;
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse::<u64>()
        .map_err(|_| FieldParseError::Malformed(raw.to_owned()))
}

fn non_blank(text: Option<&str>) -> Result<&str, FieldParseError> {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(FieldParseError::Absent),
    }
}
