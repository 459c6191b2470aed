use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] jot_core::Error),
    #[error(transparent)]
    ClientConfig(#[from] jot_core::ConfigError),
    #[error(transparent)]
    Session(#[from] jot_core::SessionStoreError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    /// Message already shown (or deliberately withheld); only the exit status is left
    #[error("")]
    Silent,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Nothing to change; pass at least one field to update")]
    NothingToUpdate,
    #[error("Not signed in. Run `jot signin --email <EMAIL> --password <PASSWORD>` first.")]
    NotSignedIn,
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Action(String),
}
