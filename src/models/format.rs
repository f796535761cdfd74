//! Serde helpers for the API's date and time wire formats.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};
use serde::Serializer;

/// Timestamps as RFC 3339 with whole seconds (`2024-03-01T12:00:00Z`).
pub mod rfc3339 {
    use super::*;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

/// A year-granular date rendered as an integer (`1910`).
pub mod year_int {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i32(value.year())
    }
}

/// A year-granular date rendered as a string (`"2006"`).
pub mod year_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format("%Y").to_string())
    }
}

/// An optional year rendered as a string, or `""` when absent.
pub mod optional_year_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&date.format("%Y").to_string()),
            None => s.serialize_str(""),
        }
    }
}

/// A long-form date (`"January 2, 2006"`).
pub mod long_date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format("%B %-d, %Y").to_string())
    }
}

/// January 1st of `year`, the storage form of year-granular fields.
pub fn january_first(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}
