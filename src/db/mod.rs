//! Database abstraction layer for backend-agnostic SQL access.
//!
//! The abstraction is built on a small hierarchy of traits:
//!
//! - [`SqlExecutor`] - Execute parameterized statements
//! - [`Transaction`] - Transaction lifecycle (commit/rollback)
//! - [`DbClient`] - Connection management and transaction creation
//!
//! # Usage
//!
//! ```ignore
//! use perfume_db::db::{Db, DbClient, QueryExt, Transaction};
//!
//! let db = Db::new(client);
//!
//! // Auto-commit query
//! let rows = db.query("SELECT * FROM houses WHERE slug = $1")
//!     .bind("chanel")
//!     .fetch_all()
//!     .await?;
//!
//! // Explicit transaction
//! let txn = db.begin().await?;
//! txn.query("DELETE FROM perfumes_perfumers WHERE perfume_id = $1")
//!     .bind(perfume_id)
//!     .execute()
//!     .await?;
//! txn.commit().await?;
//! ```

mod query;
mod row;
mod traits;
mod value;

pub mod backends;

#[cfg(test)]
pub(crate) mod testing;

pub use query::{Query, QueryExt};
pub use row::{Row, RowStream};
pub use traits::{DbClient, SqlExecutor, Transaction};
pub use value::{Params, SqlValue};

use crate::error::AppError;

/// High-level wrapper around a [`DbClient`].
///
/// Repositories hold a `Db` and issue auto-commit queries through it, or
/// open an explicit transaction with [`begin`](Db::begin) for multi-statement
/// writes.
pub struct Db<C: DbClient> {
    client: C,
}

impl<C: DbClient> Db<C> {
    /// Creates a new wrapper around the given client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Creates a query builder for a direct (auto-commit) query.
    pub fn query(&self, sql: &str) -> Query<'_, C> {
        Query::new(&self.client, sql)
    }

    /// Begins a transaction on a dedicated connection.
    ///
    /// The caller must `commit()` or `rollback()` the returned transaction.
    pub async fn begin(&self) -> Result<C::Tx<'_>, AppError> {
        self.client.begin().await
    }
}

impl<C: DbClient + Clone> Clone for Db<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

#[async_trait::async_trait]
impl<C: DbClient> SqlExecutor for Db<C> {
    async fn query_sql(&self, sql: &str, params: Params) -> Result<RowStream<'_>, AppError> {
        self.client.query_sql(sql, params).await
    }

    async fn execute_sql(&self, sql: &str, params: Params) -> Result<u64, AppError> {
        self.client.execute_sql(sql, params).await
    }
}
