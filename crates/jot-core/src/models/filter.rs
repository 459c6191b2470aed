//! Category filtering for the note list.

use std::fmt;
use std::str::FromStr;

use super::note::{Category, Note, ParseCategoryError};

/// Active category filter on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    #[must_use]
    pub fn matches(self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => note.category.known() == Some(category),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(category) => category.as_str(),
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(value: Category) -> Self {
        Self::Only(value)
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "all" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notes visible under `filter`, in collection order.
#[must_use]
pub fn filter_notes(notes: &[Note], filter: CategoryFilter) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| filter.matches(note))
        .cloned()
        .collect()
}
