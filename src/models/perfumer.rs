use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::format;

/// A perfumer ("nose").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Perfumer {
    #[serde(skip)]
    pub id: i64,
    #[serde(rename = "id")]
    pub public_id: String,
    pub slug: String,
    pub name: String,
    pub nationality: String,
    pub image_url: String,
    #[serde(with = "format::long_date")]
    pub birth_date: NaiveDate,
    #[serde(with = "format::rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "format::rfc3339")]
    pub updated_at: DateTime<Utc>,
}
