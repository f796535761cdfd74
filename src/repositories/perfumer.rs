//! Perfumer repository.

use chrono::Utc;

use super::missing_ids;
use crate::context::Context;
use crate::db::backends::postgres::PostgresClient;
use crate::db::{Db, DbClient, Row};
use crate::di::FromContext;
use crate::error::{AppError, Resource};
use crate::models::Perfumer;
use crate::pagination::PageRequest;

const COLUMNS: &str =
    "id, public_id, slug, name, nationality, image_url, birth_date, created_at, updated_at";

/// Repository for Perfumer persistence.
#[derive(FromContext, Clone)]
pub struct PerfumerRepository<C: DbClient = PostgresClient> {
    db: Db<C>,
}

impl<C: DbClient> PerfumerRepository<C> {
    pub fn new(db: Db<C>) -> Self {
        Self { db }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Vec<Perfumer>, AppError> {
        let rows = self
            .db
            .query(&format!(
                "SELECT {COLUMNS} FROM perfumers WHERE id > $1 ORDER BY id LIMIT $2"
            ))
            .bind(page.after_id)
            .bind(page.per_page)
            .fetch_all()
            .await?;

        rows.iter().map(|row| perfumer_from_row(row, "")).collect()
    }

    /// Inserts (id 0) or updates a perfumer.
    pub async fn save(&self, perfumer: &mut Perfumer) -> Result<(), AppError> {
        if perfumer.id == 0 {
            let row = self
                .db
                .query(
                    "INSERT INTO perfumers (public_id, slug, name, nationality, image_url, birth_date, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                     RETURNING id",
                )
                .bind(&perfumer.public_id)
                .bind(&perfumer.slug)
                .bind(&perfumer.name)
                .bind(&perfumer.nationality)
                .bind(&perfumer.image_url)
                .bind(perfumer.birth_date)
                .bind(perfumer.created_at)
                .bind(perfumer.updated_at)
                .fetch_one()
                .await
                .map_err(|e| e.map_constraint(Some(Resource::Perfumer), None))?
                .ok_or_else(|| AppError::Internal("insert into perfumers returned no id".into()))?;

            perfumer.id = row.get("id")?;
            tracing::info!(public_id = %perfumer.public_id, slug = %perfumer.slug, "Created perfumer");
            return Ok(());
        }

        perfumer.updated_at = Utc::now();
        let affected = self
            .db
            .query(
                "UPDATE perfumers
                 SET slug = $2, name = $3, nationality = $4, image_url = $5, birth_date = $6, updated_at = $7
                 WHERE id = $1",
            )
            .bind(perfumer.id)
            .bind(&perfumer.slug)
            .bind(&perfumer.name)
            .bind(&perfumer.nationality)
            .bind(&perfumer.image_url)
            .bind(perfumer.birth_date)
            .bind(perfumer.updated_at)
            .execute()
            .await
            .map_err(|e| e.map_constraint(Some(Resource::Perfumer), None))?;

        if affected == 0 {
            return Err(AppError::not_found(Resource::Perfumer, &perfumer.public_id));
        }
        tracing::info!(public_id = %perfumer.public_id, "Updated perfumer");
        Ok(())
    }

    pub async fn find(&self, public_id: &str) -> Result<Perfumer, AppError> {
        self.find_by("public_id", public_id).await
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Perfumer, AppError> {
        self.find_by("slug", slug).await
    }

    /// Fetches every perfumer in `public_ids`, or `ReferenceNotFound` on the
    /// `perfumers` field naming the ids that matched nothing.
    pub async fn find_many(&self, public_ids: &[String]) -> Result<Vec<Perfumer>, AppError> {
        if public_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self
            .db
            .query(&format!(
                "SELECT {COLUMNS} FROM perfumers WHERE public_id = ANY($1) ORDER BY id"
            ))
            .bind(public_ids.to_vec())
            .fetch_all()
            .await?;
        let perfumers = rows
            .iter()
            .map(|row| perfumer_from_row(row, ""))
            .collect::<Result<Vec<_>, _>>()?;

        let missing = missing_ids(public_ids, perfumers.iter().map(|p| p.public_id.as_str()));
        if !missing.is_empty() {
            return Err(AppError::ReferenceNotFound {
                field: "perfumers",
                resource: Resource::Perfumer,
                ids: missing,
            });
        }
        Ok(perfumers)
    }

    async fn find_by(&self, column: &str, value: &str) -> Result<Perfumer, AppError> {
        let row = self
            .db
            .query(&format!(
                "SELECT {COLUMNS} FROM perfumers WHERE {column} = $1"
            ))
            .bind(value)
            .fetch_one()
            .await?;

        match row {
            Some(row) => perfumer_from_row(&row, ""),
            None => Err(AppError::not_found(Resource::Perfumer, value)),
        }
    }
}

/// Maps a row to a Perfumer; `prefix` selects aliased columns.
pub(crate) fn perfumer_from_row(row: &Row, prefix: &str) -> Result<Perfumer, AppError> {
    let col = |name: &str| format!("{prefix}{name}");

    Ok(Perfumer {
        id: row.get(&col("id"))?,
        public_id: row.get(&col("public_id"))?,
        slug: row.get(&col("slug"))?,
        name: row.get(&col("name"))?,
        nationality: row.get(&col("nationality"))?,
        image_url: row.get(&col("image_url"))?,
        birth_date: row.get(&col("birth_date"))?,
        created_at: row.get(&col("created_at"))?,
        updated_at: row.get(&col("updated_at"))?,
    })
}
