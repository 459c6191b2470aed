//! Data models for Jot

mod account;
mod filter;
mod note;

pub use account::UserAccount;
pub use filter::{filter_notes, CategoryFilter};
pub use note::{Category, Note, NoteCategory, NoteDraft, NoteId, ParseCategoryError};
