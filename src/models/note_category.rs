//! Position of a note in a perfume's pyramid.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteCategory {
    Top,
    Middle,
    Base,
    Uncategorized,
}

impl NoteCategory {
    pub fn all() -> &'static [NoteCategory] {
        &[
            NoteCategory::Top,
            NoteCategory::Middle,
            NoteCategory::Base,
            NoteCategory::Uncategorized,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteCategory::Top => "top",
            NoteCategory::Middle => "middle",
            NoteCategory::Base => "base",
            NoteCategory::Uncategorized => "uncategorized",
        }
    }
}

impl std::fmt::Display for NoteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteCategory {
    type Err = String;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        NoteCategory::all()
            .iter()
            .find(|c| c.as_str() == lower)
            .copied()
            .ok_or_else(|| format!("unknown note category: {}", s))
    }
}
