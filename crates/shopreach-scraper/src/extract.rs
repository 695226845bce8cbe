//! Best-effort field extraction helpers.
//!
//! Every field of a scraped record comes from its own fallible step. A step
//! failure is logged and turns into an absent field; it never aborts the
//! sibling steps or the record.

use shopreach_browser::DriverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("{0} is missing")]
    Missing(&'static str),

    #[error("cannot parse {what} from {value:?}")]
    Parse { what: &'static str, value: String },
}

/// Turns the result of one extraction step into an optional field value,
/// logging the failure.
pub fn optional_field<T>(field: &'static str, result: Result<T, ExtractError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(field, error = %e, "field not extracted; leaving it out");
            None
        }
    }
}

/// Stable item identifier: the last path segment of `url`, ignoring query
/// string, fragment and trailing slashes.
///
/// `https://sawa9ly.app/product/k57a1b2?ref=home` → `k57a1b2`.
#[must_use]
pub fn item_id_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() || segment.ends_with(':') {
        return None;
    }
    Some(segment.to_owned())
}

/// Parses a displayed price such as `"2,500 دج"` into whole units by
/// removing the currency marker, thousands separators and whitespace.
///
/// # Errors
///
/// [`ExtractError::Parse`] if what remains is not an integer.
pub fn parse_price(text: &str, currency_marker: &str) -> Result<i64, ExtractError> {
    let without_marker = if currency_marker.is_empty() {
        text.to_owned()
    } else {
        text.replace(currency_marker, "")
    };
    let digits: String = without_marker
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    digits.parse::<i64>().map_err(|_| ExtractError::Parse {
        what: "price",
        value: text.to_owned(),
    })
}
