//! Entity factory: fresh public ids, derived slugs and creation timestamps.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::error::AppError;
use crate::id::IdGenerator;
use crate::models::{
    create_slug, Concentration, House, Note, NoteGroup, NotesByCategory, Perfume, PerfumeDraft,
    Perfumer,
};

/// Builds new, not-yet-persisted entities.
///
/// Every entity gets a fresh public id, a slug computed from its name, and
/// identical `created_at`/`updated_at`. Construction fails only when the id
/// generator does.
#[derive(Clone)]
pub struct Factory {
    ids: Arc<dyn IdGenerator>,
}

impl Factory {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    pub fn new_house(
        &self,
        name: &str,
        country: &str,
        description: &str,
        year_founded: NaiveDate,
    ) -> Result<House, AppError> {
        let now = Utc::now();
        Ok(House {
            id: 0,
            public_id: self.ids.generate()?,
            slug: create_slug(name),
            name: name.to_string(),
            country: country.to_string(),
            description: description.to_string(),
            year_founded,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn new_note_group(
        &self,
        name: &str,
        description: &str,
        image_url: &str,
    ) -> Result<NoteGroup, AppError> {
        let now = Utc::now();
        Ok(NoteGroup {
            id: 0,
            public_id: self.ids.generate()?,
            slug: create_slug(name),
            name: name.to_string(),
            description: description.to_string(),
            image_url: image_url.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn new_note(
        &self,
        name: &str,
        description: &str,
        image_url: &str,
        note_group_id: &str,
    ) -> Result<Note, AppError> {
        let now = Utc::now();
        Ok(Note {
            id: 0,
            public_id: self.ids.generate()?,
            slug: create_slug(name),
            name: name.to_string(),
            description: description.to_string(),
            image_url: image_url.to_string(),
            note_group_id: note_group_id.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn new_perfumer(
        &self,
        name: &str,
        nationality: &str,
        image_url: &str,
        birth_date: NaiveDate,
    ) -> Result<Perfumer, AppError> {
        let now = Utc::now();
        Ok(Perfumer {
            id: 0,
            public_id: self.ids.generate()?,
            slug: create_slug(name),
            name: name.to_string(),
            nationality: nationality.to_string(),
            image_url: image_url.to_string(),
            birth_date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Builds a perfume from a draft merged onto empty defaults.
    ///
    /// Fields the draft leaves out stay at their defaults (empty strings,
    /// `Unknown` concentration, no perfumers or notes, not discontinued).
    pub fn new_perfume(&self, draft: PerfumeDraft) -> Result<Perfume, AppError> {
        let now = Utc::now();
        let mut perfume = Perfume {
            id: 0,
            public_id: self.ids.generate()?,
            slug: String::new(),
            name: String::new(),
            description: String::new(),
            concentration: Concentration::Unknown,
            image_url: String::new(),
            house: empty_house(now),
            perfumers: Vec::new(),
            notes: NotesByCategory::new(),
            year_released: NaiveDate::default(),
            year_discontinued: None,
            created_at: now,
            updated_at: now,
        };
        draft.apply_to(&mut perfume);
        Ok(perfume)
    }
}

fn empty_house(now: chrono::DateTime<Utc>) -> House {
    House {
        id: 0,
        public_id: String::new(),
        slug: String::new(),
        name: String::new(),
        country: String::new(),
        description: String::new(),
        year_founded: NaiveDate::default(),
        created_at: now,
        updated_at: now,
    }
}
