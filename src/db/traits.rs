//! Core traits for relational database access.
//!
//! - [`SqlExecutor`] - Execute parameterized statements
//! - [`Transaction`] - Transaction lifecycle management
//! - [`DbClient`] - Connection pool and transaction creation

use async_trait::async_trait;

use crate::db::row::RowStream;
use crate::db::value::Params;
use crate::error::AppError;

/// Executes parameterized SQL statements.
///
/// Implemented by clients (auto-commit, one pooled connection per call) and
/// by transactions (every statement on the transaction's connection).
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Executes a statement and returns a stream of result rows.
    ///
    /// Use this for `SELECT` and for writes with a `RETURNING` clause.
    async fn query_sql(&self, sql: &str, params: Params) -> Result<RowStream<'_>, AppError>;

    /// Executes a statement and returns the number of affected rows.
    async fn execute_sql(&self, sql: &str, params: Params) -> Result<u64, AppError>;
}

/// Transaction lifecycle management.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Commits the transaction, making all changes permanent.
    ///
    /// Consumes the transaction - it cannot be used after commit.
    async fn commit(self) -> Result<(), AppError>;

    /// Rolls back the transaction, discarding all changes.
    ///
    /// Consumes the transaction - it cannot be used after rollback.
    async fn rollback(self) -> Result<(), AppError>;
}

/// A database client that can begin transactions.
///
/// Implementations wrap a connection pool and provide auto-commit statements
/// via [`SqlExecutor`], plus explicit transactions via
/// [`begin`](DbClient::begin).
#[async_trait]
pub trait DbClient: SqlExecutor {
    /// The transaction type returned by this client.
    type Tx<'a>: Transaction + SqlExecutor
    where
        Self: 'a;

    /// Begins a new transaction.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let txn = client.begin().await?;
    /// txn.query("UPDATE houses SET name = $1 WHERE id = $2")
    ///     .bind("Chanel")
    ///     .bind(7_i64)
    ///     .execute()
    ///     .await?;
    /// txn.commit().await?;
    /// ```
    async fn begin(&self) -> Result<Self::Tx<'_>, AppError>;
}
