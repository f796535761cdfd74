//! Domain models for the perfume catalog.

mod concentration;
pub mod format;
mod house;
mod note;
mod note_category;
mod note_group;
mod perfume;
mod perfumer;
mod slug;

pub use concentration::Concentration;
pub use format::january_first;
pub use house::House;
pub use note::Note;
pub use note_category::NoteCategory;
pub use note_group::NoteGroup;
pub use perfume::{NotesByCategory, Perfume, PerfumeDraft};
pub use perfumer::Perfumer;
pub use slug::create_slug;
