use chrono::{DateTime, Utc};
use serde::Serialize;

use super::format;

/// A single scent note, owned by a [`NoteGroup`](super::NoteGroup).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    #[serde(skip)]
    pub id: i64,
    #[serde(rename = "id")]
    pub public_id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Public id of the owning note group.
    pub note_group_id: String,
    #[serde(with = "format::rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "format::rfc3339")]
    pub updated_at: DateTime<Utc>,
}
