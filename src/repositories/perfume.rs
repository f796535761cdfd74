//! Perfume repository: aggregate reads and transactional writes.
//!
//! A perfume spans three tables: the `perfumes` row (joined to its house),
//! `perfumes_perfumers` and `perfumes_notes`. Reads assemble the aggregate
//! from one parent query plus one batched query per edge table. Writes run
//! in a single transaction so the parent row and both edge sets change
//! together or not at all.

use std::collections::HashMap;

use crate::context::Context;
use crate::db::backends::postgres::PostgresClient;
use crate::db::{Db, DbClient, QueryExt, Row, SqlExecutor, Transaction};
use crate::di::FromContext;
use crate::error::{AppError, Resource};
use crate::models::{Concentration, NoteCategory, NotesByCategory, Perfume, Perfumer};
use crate::pagination::PageRequest;

use super::house::house_from_row;
use super::note::note_from_row;
use super::perfumer::perfumer_from_row;
use super::reconcile;

const PERFUME_SELECT: &str = "
    SELECT p.id, p.public_id, p.slug, p.name, p.description, p.concentration, p.image_url,
           p.year_released, p.year_discontinued, p.created_at, p.updated_at,
           h.id AS house_id, h.public_id AS house_public_id, h.slug AS house_slug,
           h.name AS house_name, h.country AS house_country, h.description AS house_description,
           h.year_founded AS house_year_founded, h.created_at AS house_created_at,
           h.updated_at AS house_updated_at
    FROM perfumes p JOIN houses h ON p.house_id = h.public_id";

const PERFUMER_EDGES: &str = "
    SELECT pp.perfume_id AS edge_perfume_id,
           pf.id, pf.public_id, pf.slug, pf.name, pf.nationality, pf.image_url,
           pf.birth_date, pf.created_at, pf.updated_at
    FROM perfumes_perfumers pp JOIN perfumers pf ON pp.perfumer_id = pf.public_id
    WHERE pp.perfume_id = ANY($1)
    ORDER BY pf.id";

const NOTE_EDGES: &str = "
    SELECT pn.perfume_id AS edge_perfume_id, pn.category AS edge_category,
           n.id, n.public_id, n.slug, n.name, n.description, n.image_url,
           n.note_group_id, n.created_at, n.updated_at
    FROM perfumes_notes pn JOIN notes n ON pn.note_id = n.public_id
    WHERE pn.perfume_id = ANY($1)
    ORDER BY n.id";

/// Repository for the Perfume aggregate.
#[derive(FromContext, Clone)]
pub struct PerfumeRepository<C: DbClient = PostgresClient> {
    db: Db<C>,
}

impl<C: DbClient> PerfumeRepository<C> {
    pub fn new(db: Db<C>) -> Self {
        Self { db }
    }

    /// One page of fully hydrated perfumes, in internal id order.
    pub async fn list(&self, page: PageRequest) -> Result<Vec<Perfume>, AppError> {
        let rows = self
            .db
            .query(&format!(
                "{PERFUME_SELECT} WHERE p.id > $1 ORDER BY p.id LIMIT $2"
            ))
            .bind(page.after_id)
            .bind(page.per_page)
            .fetch_all()
            .await?;

        self.hydrate(rows).await
    }

    /// Finds a perfume by public id.
    pub async fn find(&self, public_id: &str) -> Result<Perfume, AppError> {
        self.find_by("p.public_id", public_id).await
    }

    /// Finds a perfume by slug.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Perfume, AppError> {
        self.find_by("p.slug", slug).await
    }

    async fn find_by(&self, column: &str, value: &str) -> Result<Perfume, AppError> {
        let rows = self
            .db
            .query(&format!("{PERFUME_SELECT} WHERE {column} = $1"))
            .bind(value)
            .fetch_all()
            .await?;

        self.hydrate(rows)
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found(Resource::Perfume, value))
    }

    /// Attaches perfumers and categorized notes to parent rows.
    async fn hydrate(&self, rows: Vec<Row>) -> Result<Vec<Perfume>, AppError> {
        let mut perfumes = rows
            .iter()
            .map(perfume_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        if perfumes.is_empty() {
            return Ok(perfumes);
        }

        let ids: Vec<i64> = perfumes.iter().map(|p| p.id).collect();

        let mut perfumers: HashMap<i64, Vec<Perfumer>> = HashMap::new();
        for row in self.db.query(PERFUMER_EDGES).bind(ids.clone()).fetch_all().await? {
            let perfume_id: i64 = row.get("edge_perfume_id")?;
            perfumers
                .entry(perfume_id)
                .or_default()
                .push(perfumer_from_row(&row, "")?);
        }

        let mut notes: HashMap<i64, NotesByCategory> = HashMap::new();
        for row in self.db.query(NOTE_EDGES).bind(ids).fetch_all().await? {
            let perfume_id: i64 = row.get("edge_perfume_id")?;
            let category = parse_category(&row.get::<String>("edge_category")?)?;
            notes
                .entry(perfume_id)
                .or_default()
                .entry(category)
                .or_default()
                .push(note_from_row(&row, "")?);
        }

        for perfume in &mut perfumes {
            perfume.perfumers = perfumers.remove(&perfume.id).unwrap_or_default();
            perfume.notes = notes.remove(&perfume.id).unwrap_or_default();
        }
        Ok(perfumes)
    }

    /// Persists the aggregate atomically.
    ///
    /// A new perfume (id 0) inserts its row and every edge. An existing one
    /// is updated by public id and its edges reconciled against storage:
    /// note categories absent from `perfume.notes` keep their edges. On any
    /// failure the transaction is rolled back and nothing is written.
    pub async fn save(&self, perfume: &mut Perfume) -> Result<(), AppError> {
        let is_new = perfume.id == 0;
        let txn = self.db.begin().await?;

        let result = if is_new {
            insert_perfume(&txn, perfume).await
        } else {
            update_perfume(&txn, perfume).await
        };

        match result {
            Ok(()) => {
                txn.commit().await?;
                tracing::info!(
                    public_id = %perfume.public_id,
                    slug = %perfume.slug,
                    created = is_new,
                    "Saved perfume"
                );
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "Failed to roll back perfume write");
                }
                if is_new {
                    perfume.id = 0;
                }
                Err(e)
            }
        }
    }
}

async fn insert_perfume<E: SqlExecutor>(txn: &E, perfume: &mut Perfume) -> Result<(), AppError> {
    let row = txn
        .query(
            "INSERT INTO perfumes (public_id, slug, name, description, concentration, image_url, house_id,
                                   year_released, year_discontinued, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(&perfume.public_id)
        .bind(&perfume.slug)
        .bind(&perfume.name)
        .bind(&perfume.description)
        .bind(i32::from(perfume.concentration.code()))
        .bind(&perfume.image_url)
        .bind(&perfume.house.public_id)
        .bind(perfume.year_released)
        .bind(perfume.year_discontinued)
        .bind(perfume.created_at)
        .bind(perfume.updated_at)
        .fetch_one()
        .await
        .map_err(|e| parent_constraint(e, perfume))?
        .ok_or_else(|| AppError::Internal("insert into perfumes returned no id".into()))?;
    perfume.id = row.get("id")?;

    for (category, notes) in &perfume.notes {
        for note in notes {
            insert_note_edge(txn, perfume.id, *category, &note.public_id).await?;
        }
    }
    for perfumer in &perfume.perfumers {
        insert_perfumer_edge(txn, perfume.id, &perfumer.public_id).await?;
    }
    Ok(())
}

async fn update_perfume<E: SqlExecutor>(txn: &E, perfume: &mut Perfume) -> Result<(), AppError> {
    perfume.updated_at = chrono::Utc::now();

    let row = txn
        .query(
            "UPDATE perfumes
             SET slug = $2, name = $3, description = $4, concentration = $5, image_url = $6,
                 house_id = $7, year_released = $8, year_discontinued = $9, updated_at = $10
             WHERE public_id = $1
             RETURNING id",
        )
        .bind(&perfume.public_id)
        .bind(&perfume.slug)
        .bind(&perfume.name)
        .bind(&perfume.description)
        .bind(i32::from(perfume.concentration.code()))
        .bind(&perfume.image_url)
        .bind(&perfume.house.public_id)
        .bind(perfume.year_released)
        .bind(perfume.year_discontinued)
        .bind(perfume.updated_at)
        .fetch_one()
        .await
        .map_err(|e| parent_constraint(e, perfume))?
        .ok_or_else(|| AppError::not_found(Resource::Perfume, &perfume.public_id))?;
    perfume.id = row.get("id")?;

    let current_notes = txn
        .query("SELECT note_id, category FROM perfumes_notes WHERE perfume_id = $1")
        .bind(perfume.id)
        .fetch_all()
        .await?
        .iter()
        .map(|row| -> Result<(NoteCategory, String), AppError> {
            Ok((parse_category(&row.get::<String>("category")?)?, row.get("note_id")?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let current_perfumers = txn
        .query("SELECT perfumer_id FROM perfumes_perfumers WHERE perfume_id = $1")
        .bind(perfume.id)
        .fetch_all()
        .await?
        .iter()
        .map(|row| row.get("perfumer_id"))
        .collect::<Result<Vec<String>, AppError>>()?;

    let notes = reconcile::notes(&current_notes, &perfume.note_ids());
    for (category, note_id) in &notes.remove {
        txn.query("DELETE FROM perfumes_notes WHERE perfume_id = $1 AND note_id = $2 AND category = $3")
            .bind(perfume.id)
            .bind(note_id)
            .bind(category.as_str())
            .execute()
            .await?;
    }
    for (category, note_id) in &notes.add {
        insert_note_edge(txn, perfume.id, *category, note_id).await?;
    }

    let perfumers = reconcile::perfumers(&current_perfumers, &perfume.perfumer_ids());
    for perfumer_id in &perfumers.remove {
        txn.query("DELETE FROM perfumes_perfumers WHERE perfume_id = $1 AND perfumer_id = $2")
            .bind(perfume.id)
            .bind(perfumer_id)
            .execute()
            .await?;
    }
    for perfumer_id in &perfumers.add {
        insert_perfumer_edge(txn, perfume.id, perfumer_id).await?;
    }

    tracing::debug!(
        public_id = %perfume.public_id,
        notes_added = notes.add.len(),
        notes_removed = notes.remove.len(),
        perfumers_added = perfumers.add.len(),
        perfumers_removed = perfumers.remove.len(),
        "Reconciled perfume edges"
    );
    Ok(())
}

async fn insert_note_edge<E: SqlExecutor>(
    txn: &E,
    perfume_id: i64,
    category: NoteCategory,
    note_id: &str,
) -> Result<(), AppError> {
    txn.query(
        "INSERT INTO perfumes_notes (perfume_id, note_id, category)
         VALUES ($1, $2, $3)
         ON CONFLICT DO NOTHING",
    )
    .bind(perfume_id)
    .bind(note_id)
    .bind(category.as_str())
    .execute()
    .await
    .map_err(|e| e.map_constraint(None, Some(("notes", Resource::Note, vec![note_id.to_string()]))))?;
    Ok(())
}

async fn insert_perfumer_edge<E: SqlExecutor>(
    txn: &E,
    perfume_id: i64,
    perfumer_id: &str,
) -> Result<(), AppError> {
    txn.query(
        "INSERT INTO perfumes_perfumers (perfume_id, perfumer_id)
         VALUES ($1, $2)
         ON CONFLICT DO NOTHING",
    )
    .bind(perfume_id)
    .bind(perfumer_id)
    .execute()
    .await
    .map_err(|e| {
        e.map_constraint(
            None,
            Some(("perfumers", Resource::Perfumer, vec![perfumer_id.to_string()])),
        )
    })?;
    Ok(())
}

/// Unique → perfume exists; foreign key → unknown house.
fn parent_constraint(e: AppError, perfume: &Perfume) -> AppError {
    e.map_constraint(
        Some(Resource::Perfume),
        Some(("house_id", Resource::House, vec![perfume.house.public_id.clone()])),
    )
}

fn parse_category(value: &str) -> Result<NoteCategory, AppError> {
    value
        .parse()
        .map_err(|_| AppError::Integrity(format!("unknown note category '{}'", value)))
}

fn perfume_from_row(row: &Row) -> Result<Perfume, AppError> {
    let code: i16 = row.get("concentration")?;
    let concentration = Concentration::from_code(code)
        .ok_or_else(|| AppError::Integrity(format!("unknown concentration code {}", code)))?;

    Ok(Perfume {
        id: row.get("id")?,
        public_id: row.get("public_id")?,
        slug: row.get("slug")?,
        name: row.get("name")?,
        description: row.get("description")?,
        concentration,
        image_url: row.get("image_url")?,
        house: house_from_row(row, "house_")?,
        perfumers: Vec::new(),
        notes: NotesByCategory::new(),
        year_released: row.get("year_released")?,
        year_discontinued: row.get_opt("year_discontinued")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
