//! PostgreSQL backend implementation.
//!
//! Connection pooling via deadpool-postgres; statements run through
//! tokio-postgres' extended query protocol with typed binary parameters.
//!
//! # Example
//!
//! ```ignore
//! use perfume_db::db::backends::postgres::PostgresClient;
//! use perfume_db::db::{Db, QueryExt};
//!
//! let client = PostgresClient::connect(&config.postgres).await?;
//! let db = Db::new(client);
//!
//! let rows = db.query("SELECT * FROM houses ORDER BY id LIMIT $1")
//!     .bind(25_i64)
//!     .fetch_all()
//!     .await?;
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use futures::{stream, TryStreamExt};
use serde_json::Value as JsonValue;
use tokio_postgres::error::SqlState;
use tokio_postgres::NoTls;

use crate::config::PostgresConfig;
use crate::db::row::{Row, RowStream};
use crate::db::traits::{DbClient, SqlExecutor, Transaction};
use crate::db::value::Params;
use crate::error::{AppError, ConstraintKind};

/// PostgreSQL client.
///
/// This type is cheap to clone - the underlying connection pool is `Arc`-based.
#[derive(Clone)]
pub struct PostgresClient {
    pool: Pool,
}

impl PostgresClient {
    /// Creates a new PostgreSQL client with connection pooling.
    ///
    /// The pool is sized by `pool_size`; callers waiting longer than
    /// `pool_timeout_secs` for a free connection get an error instead of
    /// blocking indefinitely.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, AppError> {
        let pg_config: tokio_postgres::Config = config.uri.parse().map_err(|e| {
            AppError::Internal(format!("Invalid PostgreSQL connection string: {}", e))
        })?;

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);
        let pool = Pool::builder(mgr)
            .max_size(config.pool_size)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(Duration::from_secs(config.pool_timeout_secs)))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create connection pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Gets a connection from the pool.
    async fn get_connection(&self) -> Result<Object, AppError> {
        self.pool.get().await.map_err(|e| {
            AppError::Internal(format!("Failed to get connection from pool: {}", e))
        })
    }

    /// Checks that the database is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        let conn = self.get_connection().await?;
        conn.batch_execute("SELECT 1")
            .await
            .map_err(|e| classify_error(&e, "SELECT 1"))
    }

    /// Runs a script of semicolon-separated statements without parameters.
    ///
    /// Used for schema DDL; each statement commits on its own.
    pub async fn execute_batch(&self, script: &str) -> Result<(), AppError> {
        let conn = self.get_connection().await?;
        conn.batch_execute(script)
            .await
            .map_err(|e| classify_error(&e, script))
    }
}

#[async_trait]
impl SqlExecutor for PostgresClient {
    async fn query_sql(&self, sql: &str, params: Params) -> Result<RowStream<'_>, AppError> {
        let conn = self.get_connection().await?;

        // The pooled connection goes back to the pool when this call returns,
        // so auto-commit results are collected before handing them out.
        let rows: Vec<Row> = conn
            .query_raw(sql, params.iter())
            .await
            .map_err(|e| classify_error(&e, sql))?
            .map_ok(|row| parse_pg_row(&row))
            .map_err(|e| classify_error(&e, sql))
            .try_collect()
            .await?;

        Ok(Box::pin(stream::iter(rows.into_iter().map(Ok))))
    }

    async fn execute_sql(&self, sql: &str, params: Params) -> Result<u64, AppError> {
        let conn = self.get_connection().await?;
        conn.execute_raw(sql, params.iter())
            .await
            .map_err(|e| classify_error(&e, sql))
    }
}

#[async_trait]
impl DbClient for PostgresClient {
    type Tx<'a> = PostgresTransaction;

    async fn begin(&self) -> Result<Self::Tx<'_>, AppError> {
        let conn = self.get_connection().await?;

        conn.batch_execute("BEGIN")
            .await
            .map_err(|e| AppError::Internal(format!("Failed to begin transaction: {}", e)))?;

        Ok(PostgresTransaction {
            conn: Some(conn),
            finished: false,
        })
    }
}

/// PostgreSQL transaction bound to one pooled connection.
///
/// The transaction must be explicitly committed or rolled back. Dropping it
/// unfinished logs a warning and detaches the connection from the pool, so
/// the server discards the open transaction when the connection closes.
pub struct PostgresTransaction {
    conn: Option<Object>,
    finished: bool,
}

impl PostgresTransaction {
    fn conn(&self) -> Result<&Object, AppError> {
        self.conn
            .as_ref()
            .ok_or_else(|| AppError::Internal("transaction connection already released".into()))
    }

    async fn finish(&mut self, statement: &str) -> Result<(), AppError> {
        self.finished = true;
        self.conn()?.batch_execute(statement).await.map_err(|e| {
            AppError::Internal(format!("Failed to {} transaction: {}", statement.to_lowercase(), e))
        })
    }
}

#[async_trait]
impl SqlExecutor for PostgresTransaction {
    async fn query_sql(&self, sql: &str, params: Params) -> Result<RowStream<'_>, AppError> {
        let stream = self
            .conn()?
            .query_raw(sql, params.iter())
            .await
            .map_err(|e| classify_error(&e, sql))?;

        let query = sql.to_string();
        Ok(Box::pin(
            stream
                .map_ok(|row| parse_pg_row(&row))
                .map_err(move |e| classify_error(&e, &query)),
        ))
    }

    async fn execute_sql(&self, sql: &str, params: Params) -> Result<u64, AppError> {
        self.conn()?
            .execute_raw(sql, params.iter())
            .await
            .map_err(|e| classify_error(&e, sql))
    }
}

#[async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(mut self) -> Result<(), AppError> {
        self.finish("COMMIT").await
    }

    async fn rollback(mut self) -> Result<(), AppError> {
        self.finish("ROLLBACK").await
    }
}

impl Drop for PostgresTransaction {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("PostgresTransaction dropped without commit or rollback");
            if let Some(conn) = self.conn.take() {
                // Closing the detached client aborts the open transaction server-side.
                drop(Object::take(conn));
            }
        }
    }
}

/// Classifies a driver error.
///
/// Unique (23505) and foreign-key (23503) violations become
/// [`AppError::Constraint`] so repositories can map them to domain errors;
/// anything else is a generic query failure carrying the statement text.
fn classify_error(e: &tokio_postgres::Error, sql: &str) -> AppError {
    let Some(db_err) = e.as_db_error() else {
        return AppError::Query {
            message: e.to_string(),
            query: sql.to_string(),
        };
    };

    let kind = if *db_err.code() == SqlState::UNIQUE_VIOLATION {
        Some(ConstraintKind::Unique)
    } else if *db_err.code() == SqlState::FOREIGN_KEY_VIOLATION {
        Some(ConstraintKind::ForeignKey)
    } else {
        None
    };

    match kind {
        Some(kind) => AppError::Constraint {
            kind,
            constraint: db_err.constraint().map(str::to_string),
            message: db_err.message().to_string(),
        },
        None => AppError::Query {
            message: format!(
                "{}: {} ({})",
                db_err.severity(),
                db_err.message(),
                db_err.code().code()
            ),
            query: sql.to_string(),
        },
    }
}

/// Parses a PostgreSQL row into our generic Row type.
///
/// `date` columns become `YYYY-MM-DD` strings and `timestamptz` columns
/// RFC 3339 strings; both deserialize back into chrono types via [`Row::get`].
fn parse_pg_row(pg_row: &tokio_postgres::Row) -> Row {
    let mut data = HashMap::new();

    for (idx, column) in pg_row.columns().iter().enumerate() {
        let name = column.name().to_string();

        let value = match column.type_().name() {
            "int2" => pg_row
                .try_get::<_, Option<i16>>(idx)
                .ok()
                .flatten()
                .map(|v| JsonValue::Number(v.into())),
            "int4" => pg_row
                .try_get::<_, Option<i32>>(idx)
                .ok()
                .flatten()
                .map(|v| JsonValue::Number(v.into())),
            "int8" => pg_row
                .try_get::<_, Option<i64>>(idx)
                .ok()
                .flatten()
                .map(|v| JsonValue::Number(v.into())),
            "float8" => pg_row
                .try_get::<_, Option<f64>>(idx)
                .ok()
                .flatten()
                .and_then(serde_json::Number::from_f64)
                .map(JsonValue::Number),
            "bool" => pg_row
                .try_get::<_, Option<bool>>(idx)
                .ok()
                .flatten()
                .map(JsonValue::Bool),
            "date" => pg_row
                .try_get::<_, Option<NaiveDate>>(idx)
                .ok()
                .flatten()
                .map(|d| JsonValue::String(d.format("%Y-%m-%d").to_string())),
            "timestamptz" => pg_row
                .try_get::<_, Option<DateTime<Utc>>>(idx)
                .ok()
                .flatten()
                .map(|t| JsonValue::String(t.to_rfc3339())),
            "_text" => pg_row
                .try_get::<_, Option<Vec<String>>>(idx)
                .ok()
                .flatten()
                .map(|v| JsonValue::Array(v.into_iter().map(JsonValue::String).collect())),
            // text, varchar, name, bpchar and anything else readable as text
            _ => pg_row
                .try_get::<_, Option<String>>(idx)
                .ok()
                .flatten()
                .map(JsonValue::String),
        };

        data.insert(name, value.unwrap_or(JsonValue::Null));
    }

    Row::new(data)
}
