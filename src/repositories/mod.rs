//! Data access layer over PostgreSQL.
//!
//! Each repository wraps a [`Db`](crate::db::Db) and is resolved from the
//! application context with the `FromContext` derive. Repositories are
//! generic over the client so unit tests can substitute a recording one.

mod house;
mod note;
mod note_group;
mod perfume;
mod perfumer;
pub mod reconcile;

pub use house::HouseRepository;
pub use note::NoteRepository;
pub use note_group::NoteGroupRepository;
pub use perfume::PerfumeRepository;
pub use perfumer::PerfumerRepository;

use std::collections::BTreeSet;

/// Requested ids with no match in `found`, deduplicated, in request order.
fn missing_ids<'a>(requested: &[String], found: impl Iterator<Item = &'a str>) -> Vec<String> {
    let found: BTreeSet<&str> = found.collect();
    let mut seen = BTreeSet::new();
    requested
        .iter()
        .filter(|id| !found.contains(id.as_str()) && seen.insert(id.as_str()))
        .cloned()
        .collect()
}
