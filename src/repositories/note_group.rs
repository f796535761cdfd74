//! Note group repository.

use chrono::Utc;

use crate::context::Context;
use crate::db::backends::postgres::PostgresClient;
use crate::db::{Db, DbClient, Row};
use crate::di::FromContext;
use crate::error::{AppError, Resource};
use crate::models::NoteGroup;
use crate::pagination::PageRequest;

const COLUMNS: &str = "id, public_id, slug, name, description, image_url, created_at, updated_at";

/// Repository for NoteGroup persistence.
#[derive(FromContext, Clone)]
pub struct NoteGroupRepository<C: DbClient = PostgresClient> {
    db: Db<C>,
}

impl<C: DbClient> NoteGroupRepository<C> {
    pub fn new(db: Db<C>) -> Self {
        Self { db }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Vec<NoteGroup>, AppError> {
        let rows = self
            .db
            .query(&format!(
                "SELECT {COLUMNS} FROM note_groups WHERE id > $1 ORDER BY id LIMIT $2"
            ))
            .bind(page.after_id)
            .bind(page.per_page)
            .fetch_all()
            .await?;

        rows.iter().map(note_group_from_row).collect()
    }

    /// Inserts (id 0) or updates a note group.
    pub async fn save(&self, group: &mut NoteGroup) -> Result<(), AppError> {
        if group.id == 0 {
            let row = self
                .db
                .query(
                    "INSERT INTO note_groups (public_id, slug, name, description, image_url, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)
                     RETURNING id",
                )
                .bind(&group.public_id)
                .bind(&group.slug)
                .bind(&group.name)
                .bind(&group.description)
                .bind(&group.image_url)
                .bind(group.created_at)
                .bind(group.updated_at)
                .fetch_one()
                .await
                .map_err(|e| e.map_constraint(Some(Resource::NoteGroup), None))?
                .ok_or_else(|| AppError::Internal("insert into note_groups returned no id".into()))?;

            group.id = row.get("id")?;
            tracing::info!(public_id = %group.public_id, slug = %group.slug, "Created note group");
            return Ok(());
        }

        group.updated_at = Utc::now();
        let affected = self
            .db
            .query(
                "UPDATE note_groups
                 SET slug = $2, name = $3, description = $4, image_url = $5, updated_at = $6
                 WHERE id = $1",
            )
            .bind(group.id)
            .bind(&group.slug)
            .bind(&group.name)
            .bind(&group.description)
            .bind(&group.image_url)
            .bind(group.updated_at)
            .execute()
            .await
            .map_err(|e| e.map_constraint(Some(Resource::NoteGroup), None))?;

        if affected == 0 {
            return Err(AppError::not_found(Resource::NoteGroup, &group.public_id));
        }
        tracing::info!(public_id = %group.public_id, "Updated note group");
        Ok(())
    }

    pub async fn find(&self, public_id: &str) -> Result<NoteGroup, AppError> {
        self.find_by("public_id", public_id).await
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<NoteGroup, AppError> {
        self.find_by("slug", slug).await
    }

    async fn find_by(&self, column: &str, value: &str) -> Result<NoteGroup, AppError> {
        let row = self
            .db
            .query(&format!(
                "SELECT {COLUMNS} FROM note_groups WHERE {column} = $1"
            ))
            .bind(value)
            .fetch_one()
            .await?;

        match row {
            Some(row) => note_group_from_row(&row),
            None => Err(AppError::not_found(Resource::NoteGroup, value)),
        }
    }
}

fn note_group_from_row(row: &Row) -> Result<NoteGroup, AppError> {
    Ok(NoteGroup {
        id: row.get("id")?,
        public_id: row.get("public_id")?,
        slug: row.get("slug")?,
        name: row.get("name")?,
        description: row.get("description")?,
        image_url: row.get("image_url")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
