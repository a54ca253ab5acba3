// Directory
pub mod cost_centers;
pub mod customers;
pub mod users;

// Forms
pub mod attachments;
pub mod dashboard;
pub mod form_numbers;
pub mod forms;

use serde::{de, Deserialize, Deserializer};
use std::{fmt, str::FromStr};

/// Reads an optional query value, treating `?key=` the same as a missing key.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid value `{value}`: {e}"))),
    }
}
