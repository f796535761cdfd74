//! In-memory recording client for unit tests.
//!
//! Records every statement with its parameters and answers from a list of
//! scripted responses matched by SQL substring (and optionally parameters).
//! Unmatched queries return no rows; unmatched executes report one affected row.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::db::row::{Row, RowStream};
use crate::db::traits::{DbClient, SqlExecutor, Transaction};
use crate::db::value::Params;
use crate::error::AppError;

type ParamsMatcher = Box<dyn Fn(&Params) -> bool + Send>;
type ErrorFactory = Box<dyn Fn() -> AppError + Send>;

enum Response {
    Rows(Vec<Row>),
    Fail(ErrorFactory),
}

struct Script {
    pattern: String,
    matcher: Option<ParamsMatcher>,
    response: Response,
}

#[derive(Default)]
struct State {
    scripts: Vec<Script>,
    statements: Vec<(String, Params)>,
    commits: usize,
    rollbacks: usize,
}

/// A [`DbClient`] that records statements instead of running them.
#[derive(Clone, Default)]
pub(crate) struct RecordingClient {
    state: Arc<Mutex<State>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Answers statements containing `pattern` with `rows`.
    pub fn on(&self, pattern: &str, rows: Vec<Row>) -> &Self {
        self.lock().scripts.push(Script {
            pattern: pattern.to_string(),
            matcher: None,
            response: Response::Rows(rows),
        });
        self
    }

    /// Fails statements containing `pattern` with the error built by `err`.
    pub fn fail_on(&self, pattern: &str, err: impl Fn() -> AppError + Send + 'static) -> &Self {
        self.lock().scripts.push(Script {
            pattern: pattern.to_string(),
            matcher: None,
            response: Response::Fail(Box::new(err)),
        });
        self
    }

    /// Fails statements containing `pattern` whose parameters satisfy `when`.
    pub fn fail_on_when(
        &self,
        pattern: &str,
        when: impl Fn(&Params) -> bool + Send + 'static,
        err: impl Fn() -> AppError + Send + 'static,
    ) -> &Self {
        self.lock().scripts.push(Script {
            pattern: pattern.to_string(),
            matcher: Some(Box::new(when)),
            response: Response::Fail(Box::new(err)),
        });
        self
    }

    /// All recorded statements, in execution order.
    pub fn statements(&self) -> Vec<(String, Params)> {
        self.lock().statements.clone()
    }

    /// Parameters of every recorded statement containing `pattern`.
    pub fn params_for(&self, pattern: &str) -> Vec<Params> {
        self.lock()
            .statements
            .iter()
            .filter(|(sql, _)| sql.contains(pattern))
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub fn commits(&self) -> usize {
        self.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.lock().rollbacks
    }

    fn respond(&self, sql: &str, params: Params) -> Result<Option<Vec<Row>>, AppError> {
        let mut state = self.lock();
        state.statements.push((sql.to_string(), params.clone()));

        let script = state.scripts.iter().find(|s| {
            sql.contains(&s.pattern) && s.matcher.as_ref().map_or(true, |m| m(&params))
        });

        match script.map(|s| &s.response) {
            Some(Response::Rows(rows)) => Ok(Some(rows.clone())),
            Some(Response::Fail(err)) => Err(err()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SqlExecutor for RecordingClient {
    async fn query_sql(&self, sql: &str, params: Params) -> Result<RowStream<'_>, AppError> {
        let rows = self.respond(sql, params)?.unwrap_or_default();
        Ok(Box::pin(futures::stream::iter(rows.into_iter().map(Ok))))
    }

    async fn execute_sql(&self, sql: &str, params: Params) -> Result<u64, AppError> {
        let affected = self.respond(sql, params)?.map_or(1, |rows| rows.len() as u64);
        Ok(affected)
    }
}

#[async_trait]
impl DbClient for RecordingClient {
    type Tx<'a> = RecordingTransaction;

    async fn begin(&self) -> Result<Self::Tx<'_>, AppError> {
        Ok(RecordingTransaction {
            client: self.clone(),
        })
    }
}

/// Transaction handle sharing the recording client's state.
pub(crate) struct RecordingTransaction {
    client: RecordingClient,
}

#[async_trait]
impl SqlExecutor for RecordingTransaction {
    async fn query_sql(&self, sql: &str, params: Params) -> Result<RowStream<'_>, AppError> {
        self.client.query_sql(sql, params).await
    }

    async fn execute_sql(&self, sql: &str, params: Params) -> Result<u64, AppError> {
        self.client.execute_sql(sql, params).await
    }
}

#[async_trait]
impl Transaction for RecordingTransaction {
    async fn commit(self) -> Result<(), AppError> {
        self.client.lock().commits += 1;
        Ok(())
    }

    async fn rollback(self) -> Result<(), AppError> {
        self.client.lock().rollbacks += 1;
        Ok(())
    }
}
