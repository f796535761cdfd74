//! perfume-db - perfume catalog API
//!
//! Houses, note groups, notes, perfumers and perfumes over PostgreSQL, served
//! as a JSON API with cursor pagination.

pub mod cli;
pub mod config;
pub mod context;
pub mod db;
pub mod di;
pub mod error;
pub mod factory;
pub mod http;
pub mod id;
pub mod models;
pub mod pagination;
pub mod repositories;
pub mod validation;

// Re-export FromRef at crate root for di-macros generated code
pub use di::FromRef;
