//! House (brand) model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::format;

/// A perfume house.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct House {
    /// Storage id; 0 until persisted.
    #[serde(skip)]
    pub id: i64,
    #[serde(rename = "id")]
    pub public_id: String,
    pub slug: String,
    pub name: String,
    pub country: String,
    pub description: String,
    /// Stored as January 1st of the founding year.
    #[serde(with = "format::year_int")]
    pub year_founded: NaiveDate,
    #[serde(with = "format::rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "format::rfc3339")]
    pub updated_at: DateTime<Utc>,
}
