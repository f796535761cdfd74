//! Note repository.

use chrono::Utc;

use super::missing_ids;
use crate::context::Context;
use crate::db::backends::postgres::PostgresClient;
use crate::db::{Db, DbClient, Row};
use crate::di::FromContext;
use crate::error::{AppError, Resource};
use crate::models::Note;
use crate::pagination::PageRequest;

const COLUMNS: &str =
    "id, public_id, slug, name, description, image_url, note_group_id, created_at, updated_at";

/// Repository for Note persistence.
#[derive(FromContext, Clone)]
pub struct NoteRepository<C: DbClient = PostgresClient> {
    db: Db<C>,
}

impl<C: DbClient> NoteRepository<C> {
    pub fn new(db: Db<C>) -> Self {
        Self { db }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Vec<Note>, AppError> {
        let rows = self
            .db
            .query(&format!(
                "SELECT {COLUMNS} FROM notes WHERE id > $1 ORDER BY id LIMIT $2"
            ))
            .bind(page.after_id)
            .bind(page.per_page)
            .fetch_all()
            .await?;

        rows.iter().map(|row| note_from_row(row, "")).collect()
    }

    /// Inserts (id 0) or updates a note.
    ///
    /// A `note_group_id` that matches no note group yields
    /// `ReferenceNotFound` on the `note_group_id` field.
    pub async fn save(&self, note: &mut Note) -> Result<(), AppError> {
        let group_missing = || {
            Some((
                "note_group_id",
                Resource::NoteGroup,
                vec![note.note_group_id.clone()],
            ))
        };

        if note.id == 0 {
            let row = self
                .db
                .query(
                    "INSERT INTO notes (public_id, slug, name, description, image_url, note_group_id, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                     RETURNING id",
                )
                .bind(&note.public_id)
                .bind(&note.slug)
                .bind(&note.name)
                .bind(&note.description)
                .bind(&note.image_url)
                .bind(&note.note_group_id)
                .bind(note.created_at)
                .bind(note.updated_at)
                .fetch_one()
                .await
                .map_err(|e| e.map_constraint(Some(Resource::Note), group_missing()))?
                .ok_or_else(|| AppError::Internal("insert into notes returned no id".into()))?;

            note.id = row.get("id")?;
            tracing::info!(public_id = %note.public_id, slug = %note.slug, "Created note");
            return Ok(());
        }

        let updated_at = Utc::now();
        let affected = self
            .db
            .query(
                "UPDATE notes
                 SET slug = $2, name = $3, description = $4, image_url = $5, note_group_id = $6, updated_at = $7
                 WHERE id = $1",
            )
            .bind(note.id)
            .bind(&note.slug)
            .bind(&note.name)
            .bind(&note.description)
            .bind(&note.image_url)
            .bind(&note.note_group_id)
            .bind(updated_at)
            .execute()
            .await
            .map_err(|e| e.map_constraint(Some(Resource::Note), group_missing()))?;

        if affected == 0 {
            return Err(AppError::not_found(Resource::Note, &note.public_id));
        }
        note.updated_at = updated_at;
        tracing::info!(public_id = %note.public_id, "Updated note");
        Ok(())
    }

    pub async fn find(&self, public_id: &str) -> Result<Note, AppError> {
        self.find_by("public_id", public_id).await
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Note, AppError> {
        self.find_by("slug", slug).await
    }

    /// Fetches every note in `public_ids`.
    ///
    /// Fails with `ReferenceNotFound` on the `notes` field, naming each id
    /// that matched nothing.
    pub async fn find_many(&self, public_ids: &[String]) -> Result<Vec<Note>, AppError> {
        if public_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self
            .db
            .query(&format!(
                "SELECT {COLUMNS} FROM notes WHERE public_id = ANY($1) ORDER BY id"
            ))
            .bind(public_ids.to_vec())
            .fetch_all()
            .await?;
        let notes = rows
            .iter()
            .map(|row| note_from_row(row, ""))
            .collect::<Result<Vec<_>, _>>()?;

        let missing = missing_ids(public_ids, notes.iter().map(|n| n.public_id.as_str()));
        if !missing.is_empty() {
            return Err(AppError::ReferenceNotFound {
                field: "notes",
                resource: Resource::Note,
                ids: missing,
            });
        }
        Ok(notes)
    }

    async fn find_by(&self, column: &str, value: &str) -> Result<Note, AppError> {
        let row = self
            .db
            .query(&format!("SELECT {COLUMNS} FROM notes WHERE {column} = $1"))
            .bind(value)
            .fetch_one()
            .await?;

        match row {
            Some(row) => note_from_row(&row, ""),
            None => Err(AppError::not_found(Resource::Note, value)),
        }
    }
}

/// Maps a row to a Note; `prefix` selects aliased columns.
pub(crate) fn note_from_row(row: &Row, prefix: &str) -> Result<Note, AppError> {
    let col = |name: &str| format!("{prefix}{name}");

    Ok(Note {
        id: row.get(&col("id"))?,
        public_id: row.get(&col("public_id"))?,
        slug: row.get(&col("slug"))?,
        name: row.get(&col("name"))?,
        description: row.get(&col("description"))?,
        image_url: row.get(&col("image_url"))?,
        note_group_id: row.get(&col("note_group_id"))?,
        created_at: row.get(&col("created_at"))?,
        updated_at: row.get(&col("updated_at"))?,
    })
}
