//! Backend implementations.
//!
//! Each backend implements the core traits from [`crate::db`]:
//!
//! - [`SqlExecutor`](crate::db::SqlExecutor) for the client and its transactions
//! - [`Transaction`](crate::db::Transaction) for the transaction struct
//! - [`DbClient`](crate::db::DbClient) for the client struct
//!
//! Backends are also responsible for classifying driver errors: unique and
//! foreign-key violations become [`AppError::Constraint`](crate::error::AppError::Constraint),
//! everything else a generic query failure.

pub mod postgres;
