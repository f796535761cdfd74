use chrono::{DateTime, Utc};
use serde::Serialize;

use super::format;

/// A family of related notes (e.g. citrus, woods).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteGroup {
    #[serde(skip)]
    pub id: i64,
    #[serde(rename = "id")]
    pub public_id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    #[serde(with = "format::rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "format::rfc3339")]
    pub updated_at: DateTime<Utc>,
}
