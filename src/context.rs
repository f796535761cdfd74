//! Application context providing dependency injection root.

use std::sync::Arc;

use crate::config::Config;
use crate::db::backends::postgres::PostgresClient;
use crate::db::Db;
use crate::di::{Context as ContextDerive, FromRef};
use crate::error::AppError;
use crate::factory::Factory;
use crate::id::NanoIdGenerator;
use crate::pagination::CursorCodec;

/// Database handle used by the running application.
pub type AppDb = Db<PostgresClient>;

/// Root application context for dependency injection.
///
/// The Context holds all shared dependencies and uses `#[derive(Context)]`
/// to generate `FromRef` implementations for each field, enabling
/// compile-time dependency resolution. It is also the axum router state,
/// so handlers resolve repositories from it per request.
#[derive(ContextDerive, Clone)]
pub struct Context {
    /// PostgreSQL connection pool.
    pub db: AppDb,
    /// Application configuration.
    pub config: Arc<Config>,
    /// Builds new entities with fresh public ids.
    pub factory: Factory,
    /// Encrypts and decrypts pagination cursors.
    pub cursors: CursorCodec,
}

impl Context {
    /// Builds the context from configuration.
    ///
    /// The pool connects lazily, so this fails only on invalid settings
    /// (connection string, id alphabet, cursor key length).
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        let client = PostgresClient::connect(&config.postgres).await?;
        let ids = NanoIdGenerator::from_config(&config.ids)?;
        let cursors = CursorCodec::new(config.pagination.encryption_key.as_bytes())?;

        Ok(Self {
            db: Db::new(client),
            config: Arc::new(config),
            factory: Factory::new(Arc::new(ids)),
            cursors,
        })
    }

    /// Resolves any dependency constructible from this context.
    ///
    /// ```ignore
    /// let houses: HouseRepository = ctx.resolve();
    /// ```
    pub fn resolve<T: FromRef<Self>>(&self) -> T {
        T::from_ref(self)
    }
}
