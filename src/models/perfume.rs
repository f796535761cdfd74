//! Perfume aggregate and its partial-update draft.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{create_slug, format, Concentration, House, Note, NoteCategory, Perfumer};

/// Notes keyed by their position in the pyramid.
pub type NotesByCategory = BTreeMap<NoteCategory, Vec<Note>>;

/// A perfume together with its house, perfumers and categorized notes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Perfume {
    #[serde(skip)]
    pub id: i64,
    #[serde(rename = "id")]
    pub public_id: String,
    /// Derived from `name + "-" + concentration`.
    pub slug: String,
    pub name: String,
    pub description: String,
    pub concentration: Concentration,
    pub image_url: String,
    pub house: House,
    /// Unordered.
    pub perfumers: Vec<Perfumer>,
    pub notes: NotesByCategory,
    #[serde(with = "format::year_string")]
    pub year_released: NaiveDate,
    /// `None` while still in production.
    #[serde(with = "format::optional_year_string")]
    pub year_discontinued: Option<NaiveDate>,
    #[serde(with = "format::rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "format::rfc3339")]
    pub updated_at: DateTime<Utc>,
}

impl Perfume {
    /// Slug for a name/concentration pair.
    pub fn slug_for(name: &str, concentration: Concentration) -> String {
        create_slug(&format!("{}-{}", name, concentration))
    }

    /// Public ids of the perfumers, in stored order.
    pub fn perfumer_ids(&self) -> Vec<String> {
        self.perfumers.iter().map(|p| p.public_id.clone()).collect()
    }

    /// Public ids of the notes for each category.
    pub fn note_ids(&self) -> BTreeMap<NoteCategory, Vec<String>> {
        self.notes
            .iter()
            .map(|(category, notes)| {
                (
                    *category,
                    notes.iter().map(|n| n.public_id.clone()).collect(),
                )
            })
            .collect()
    }
}

/// Named optional fields used to build or patch a [`Perfume`].
///
/// A `Some` field overwrites; `None` leaves the target untouched.
/// `year_discontinued` is tri-state: `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct PerfumeDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub concentration: Option<Concentration>,
    pub image_url: Option<String>,
    pub house: Option<House>,
    pub perfumers: Option<Vec<Perfumer>>,
    /// Replaces the supplied categories only; others are kept.
    pub notes: Option<NotesByCategory>,
    pub year_released: Option<NaiveDate>,
    pub year_discontinued: Option<Option<NaiveDate>>,
}

impl PerfumeDraft {
    /// Merges the draft onto `perfume` and recomputes its slug.
    pub fn apply_to(self, perfume: &mut Perfume) {
        if let Some(name) = self.name {
            perfume.name = name;
        }
        if let Some(description) = self.description {
            perfume.description = description;
        }
        if let Some(concentration) = self.concentration {
            perfume.concentration = concentration;
        }
        if let Some(image_url) = self.image_url {
            perfume.image_url = image_url;
        }
        if let Some(house) = self.house {
            perfume.house = house;
        }
        if let Some(perfumers) = self.perfumers {
            perfume.perfumers = perfumers;
        }
        if let Some(notes) = self.notes {
            perfume.notes.extend(notes);
        }
        if let Some(year_released) = self.year_released {
            perfume.year_released = year_released;
        }
        if let Some(year_discontinued) = self.year_discontinued {
            perfume.year_discontinued = year_discontinued;
        }
        perfume.slug = Perfume::slug_for(&perfume.name, perfume.concentration);
    }
}
