//! Input validation helpers shared by the resource handlers.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

/// Deserializer for update DTOs that must distinguish "key absent" from
/// "key present, value null". Pair with `#[serde(default)]`: an absent key
/// stays `None`, a present key (null included) becomes `Some(inner)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trim a string, mapping blank results to `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::validation("date must be YYYY-MM-DD."))
}

/// Validate and normalize a VIN: trimmed, uppercased, exactly 17 chars.
pub fn normalize_vin(value: &str) -> Result<String, ApiError> {
    let vin = value.trim().to_uppercase();
    if vin.len() != 17 {
        return Err(ApiError::validation("vin must be exactly 17 characters."));
    }
    Ok(vin)
}

/// Reject negative values for fields declared "integer >= 0".
pub fn non_negative(value: i64, field: &str) -> Result<i64, ApiError> {
    if value < 0 {
        return Err(ApiError::validation(format!("{field} must be >= 0.")));
    }
    Ok(value)
}

/// Round a cost to 2 fractional digits.
pub fn round_cost(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
