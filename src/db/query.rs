//! Query builder for fluent statement construction.

use futures::{StreamExt, TryStreamExt};

use crate::db::row::{Row, RowStream};
use crate::db::traits::SqlExecutor;
use crate::db::value::{Params, SqlValue};
use crate::error::AppError;

/// A builder for constructing and executing parameterized SQL.
///
/// Parameters are positional: the first [`bind`](Query::bind) fills `$1`,
/// the second `$2`, and so on.
///
/// # Example
///
/// ```ignore
/// let rows = Query::new(&client, "SELECT * FROM houses WHERE id > $1 ORDER BY id LIMIT $2")
///     .bind(0_i64)
///     .bind(25_i64)
///     .fetch_all()
///     .await?;
/// ```
pub struct Query<'a, E: SqlExecutor + ?Sized> {
    executor: &'a E,
    sql: String,
    params: Params,
}

impl<'a, E: SqlExecutor + ?Sized> Query<'a, E> {
    /// Creates a new query builder.
    pub fn new(executor: &'a E, sql: &str) -> Self {
        Self {
            executor,
            sql: sql.to_string(),
            params: Params::new(),
        }
    }

    /// Binds the next positional parameter.
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Executes the statement and returns a stream of rows.
    pub async fn stream(self) -> Result<RowStream<'a>, AppError> {
        self.executor.query_sql(&self.sql, self.params).await
    }

    /// Executes the statement and collects all rows into a vector.
    pub async fn fetch_all(self) -> Result<Vec<Row>, AppError> {
        self.stream().await?.try_collect().await
    }

    /// Executes the statement and returns the first row, if any.
    pub async fn fetch_one(self) -> Result<Option<Row>, AppError> {
        let mut stream = self.stream().await?;
        stream.next().await.transpose()
    }

    /// Executes the statement and returns the number of affected rows.
    pub async fn execute(self) -> Result<u64, AppError> {
        self.executor.execute_sql(&self.sql, self.params).await
    }
}

/// Extension trait providing a convenient `query()` method.
///
/// Implemented for every [`SqlExecutor`], so clients and transactions
/// alike can write `executor.query("...")`.
pub trait QueryExt: SqlExecutor {
    /// Creates a new query builder for this executor.
    fn query(&self, sql: &str) -> Query<'_, Self>
    where
        Self: Sized,
    {
        Query::new(self, sql)
    }
}

impl<E: SqlExecutor> QueryExt for E {}
