//! House repository.

use chrono::Utc;

use crate::context::Context;
use crate::db::backends::postgres::PostgresClient;
use crate::db::{Db, DbClient, Row};
use crate::di::FromContext;
use crate::error::{AppError, Resource};
use crate::models::House;
use crate::pagination::PageRequest;

const COLUMNS: &str =
    "id, public_id, slug, name, country, description, year_founded, created_at, updated_at";

/// Repository for House persistence.
#[derive(FromContext, Clone)]
pub struct HouseRepository<C: DbClient = PostgresClient> {
    db: Db<C>,
}

impl<C: DbClient> HouseRepository<C> {
    pub fn new(db: Db<C>) -> Self {
        Self { db }
    }

    /// Houses with internal id greater than `page.after_id`, in id order.
    pub async fn list(&self, page: PageRequest) -> Result<Vec<House>, AppError> {
        let rows = self
            .db
            .query(&format!(
                "SELECT {COLUMNS} FROM houses WHERE id > $1 ORDER BY id LIMIT $2"
            ))
            .bind(page.after_id)
            .bind(page.per_page)
            .fetch_all()
            .await?;

        rows.iter().map(|row| house_from_row(row, "")).collect()
    }

    /// Inserts a new house (id 0) or updates an existing one.
    ///
    /// On insert the storage id is written back; on update `updated_at` is
    /// bumped. A duplicate public id or slug yields `AlreadyExists`.
    pub async fn save(&self, house: &mut House) -> Result<(), AppError> {
        if house.id == 0 {
            self.insert(house).await
        } else {
            self.update(house).await
        }
    }

    async fn insert(&self, house: &mut House) -> Result<(), AppError> {
        let row = self
            .db
            .query(
                "INSERT INTO houses (public_id, slug, name, country, description, year_founded, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 RETURNING id",
            )
            .bind(&house.public_id)
            .bind(&house.slug)
            .bind(&house.name)
            .bind(&house.country)
            .bind(&house.description)
            .bind(house.year_founded)
            .bind(house.created_at)
            .bind(house.updated_at)
            .fetch_one()
            .await
            .map_err(|e| e.map_constraint(Some(Resource::House), None))?
            .ok_or_else(|| AppError::Internal("insert into houses returned no id".into()))?;

        house.id = row.get("id")?;
        tracing::info!(public_id = %house.public_id, slug = %house.slug, "Created house");
        Ok(())
    }

    async fn update(&self, house: &mut House) -> Result<(), AppError> {
        house.updated_at = Utc::now();

        let affected = self
            .db
            .query(
                "UPDATE houses
                 SET slug = $2, name = $3, country = $4, description = $5, year_founded = $6, updated_at = $7
                 WHERE id = $1",
            )
            .bind(house.id)
            .bind(&house.slug)
            .bind(&house.name)
            .bind(&house.country)
            .bind(&house.description)
            .bind(house.year_founded)
            .bind(house.updated_at)
            .execute()
            .await
            .map_err(|e| e.map_constraint(Some(Resource::House), None))?;

        if affected == 0 {
            return Err(AppError::not_found(Resource::House, &house.public_id));
        }
        tracing::info!(public_id = %house.public_id, "Updated house");
        Ok(())
    }

    /// Finds a house by public id.
    pub async fn find(&self, public_id: &str) -> Result<House, AppError> {
        self.find_by("public_id", public_id).await
    }

    /// Finds a house by slug.
    pub async fn find_by_slug(&self, slug: &str) -> Result<House, AppError> {
        self.find_by("slug", slug).await
    }

    async fn find_by(&self, column: &str, value: &str) -> Result<House, AppError> {
        let row = self
            .db
            .query(&format!("SELECT {COLUMNS} FROM houses WHERE {column} = $1"))
            .bind(value)
            .fetch_one()
            .await?;

        match row {
            Some(row) => house_from_row(&row, ""),
            None => Err(AppError::not_found(Resource::House, value)),
        }
    }
}

/// Maps a row to a House; `prefix` selects aliased columns (`house_name`, ...).
pub(crate) fn house_from_row(row: &Row, prefix: &str) -> Result<House, AppError> {
    let col = |name: &str| format!("{prefix}{name}");

    Ok(House {
        id: row.get(&col("id"))?,
        public_id: row.get(&col("public_id"))?,
        slug: row.get(&col("slug"))?,
        name: row.get(&col("name"))?,
        country: row.get(&col("country"))?,
        description: row.get(&col("description"))?,
        year_founded: row.get(&col("year_founded"))?,
        created_at: row.get(&col("created_at"))?,
        updated_at: row.get(&col("updated_at"))?,
    })
}
