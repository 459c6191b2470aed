//! Remote resource client.
//!
//! [`RemoteApi`] is the port the view-models and the sign-in gate talk to;
//! [`HttpRemoteClient`] is the adapter for the real backend. Every operation
//! is one-shot: no retry, no timeout, no backoff.

#[cfg(test)]
pub(crate) mod fake;
mod http;
#[cfg(test)]
mod test_server;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Note, NoteDraft, NoteId, UserAccount};
use crate::session::SignUpForm;

pub use http::HttpRemoteClient;

pub const LIST_NOTES_FALLBACK: &str = "Failed to fetch notes.";
pub const CREATE_NOTE_FALLBACK: &str = "Unable to add your note.";
pub const UPDATE_NOTE_FALLBACK: &str = "Unable to update your note.";
pub const DELETE_NOTE_FALLBACK: &str = "Unable to delete the note.";
pub const GET_ACCOUNT_FALLBACK: &str = "Failed to fetch user information";
pub const UPDATE_ACCOUNT_FALLBACK: &str = "Failed to update user information";
pub const UPDATE_ACCOUNT_SUCCESS: &str = "User updated successfully";
pub const SIGN_IN_FALLBACK: &str = "Unable to sign in.";
pub const SIGN_UP_FALLBACK: &str = "Unable to sign up.";

#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Whole collection, in server order.
    async fn list_notes(&self) -> Result<Vec<Note>>;

    /// Fails with a validation error, without any I/O, when the title is empty.
    async fn create_note(&self, draft: &NoteDraft) -> Result<()>;

    async fn update_note(&self, id: &NoteId, draft: &NoteDraft) -> Result<()>;

    /// Deleting an id that is already gone surfaces a `404` server error.
    async fn delete_note(&self, id: &NoteId) -> Result<()>;

    async fn get_account(&self) -> Result<UserAccount>;

    /// Returns the confirmation message to display.
    async fn update_account(&self, account: &UserAccount) -> Result<String>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<()>;

    async fn sign_up(&self, form: &SignUpForm) -> Result<()>;
}
