//! Note model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::time::format_relative_time;

/// Server-assigned note identifier; immutable after creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The categories a note can be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Personal,
    Work,
    Other,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Personal, Self::Work, Self::Other];

    /// Exact match on the stored value; no trimming or case folding.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == value)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Work => "work",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category '{0}' (expected personal, work, or other)")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "personal" => Ok(Self::Personal),
            "work" => Ok(Self::Work),
            "other" => Ok(Self::Other),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

/// Category as stored on a fetched note.
///
/// Values outside [`Category`] are kept verbatim so the note still renders;
/// no concrete category filter ever matches them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteCategory {
    Known(Category),
    Unrecognized(String),
}

impl NoteCategory {
    #[must_use]
    pub const fn known(&self) -> Option<Category> {
        match self {
            Self::Known(category) => Some(*category),
            Self::Unrecognized(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(category) => category.as_str(),
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl Default for NoteCategory {
    fn default() -> Self {
        Self::Known(Category::default())
    }
}

impl From<Category> for NoteCategory {
    fn from(value: Category) -> Self {
        Self::Known(value)
    }
}

impl From<String> for NoteCategory {
    fn from(value: String) -> Self {
        Category::from_wire(&value).map_or(Self::Unrecognized(value), Self::Known)
    }
}

impl From<NoteCategory> for String {
    fn from(value: NoteCategory) -> Self {
        match value {
            NoteCategory::Known(category) => category.as_str().to_string(),
            NoteCategory::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for NoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A note as returned by the remote collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: NoteCategory,
    /// Missing or unreadable timestamps decode as `None` so the rest of the list survives
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Creation time as a relative phrase, e.g. "about 2 hours ago"
    #[must_use]
    pub fn created_relative(&self, now: DateTime<Utc>) -> Option<String> {
        self.created_at
            .map(|created_at| format_relative_time(created_at, now))
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
        .map(|timestamp| timestamp.with_timezone(&Utc)))
}

/// Working copy of a note's editable fields while a create/edit form is open
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteDraft {
    /// Note being edited; `None` for a new note
    pub editing: Option<NoteId>,
    pub title: String,
    pub content: String,
    pub category: Category,
}

impl NoteDraft {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            editing: None,
            title: title.into(),
            content: content.into(),
            category,
        }
    }

    /// Draft pre-populated from an existing note, carrying its id.
    ///
    /// An unrecognized category cannot be chosen in the form and falls back
    /// to the default.
    #[must_use]
    pub fn from_note(note: &Note) -> Self {
        Self {
            editing: Some(note.id.clone()),
            title: note.title.clone(),
            content: note.content.clone(),
            category: note.category.known().unwrap_or_default(),
        }
    }

    #[must_use]
    pub const fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("Title is required"));
        }
        Ok(())
    }
}
