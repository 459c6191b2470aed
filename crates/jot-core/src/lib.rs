//! jot-core - Core library for Jot
//!
//! This crate contains the note and account models, the remote resource
//! client, the session gate, and the dashboard/profile view-models used by
//! every Jot interface.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod time;
pub mod util;
pub mod viewmodel;

pub use client::{HttpRemoteClient, RemoteApi};
pub use config::{ClientConfig, ConfigError, SignInFailureMode};
pub use error::{Error, Result};
pub use models::{Category, CategoryFilter, Note, NoteCategory, NoteDraft, NoteId, UserAccount};
pub use routes::Route;
pub use session::{
    SessionContext, SessionGate, SessionPersistence, SessionSnapshot, SessionStoreError,
    SignUpForm,
};
pub use viewmodel::{ActionOutcome, Confirmation, NotesViewModel, ProfileViewModel};
