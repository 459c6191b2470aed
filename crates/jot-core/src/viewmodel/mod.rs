//! View-models for the dashboard and profile screens.
//!
//! Both hold their state behind a `std::sync::Mutex` that is never held
//! across an `.await`, so a view-model can be shared by reference between
//! concurrent UI events. Every remote call is raced against a
//! [`Lifecycle`]; once the screen is torn down, late results are dropped.

pub mod notes;
pub mod profile;

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

pub use notes::{DashboardView, LoadState, NoteForm, NoteListView, NotesViewModel};
pub use profile::{ProfileMode, ProfileView, ProfileViewModel};

pub const LOADING_NOTES_MESSAGE: &str = "Loading notes...";
pub const EMPTY_NOTES_MESSAGE: &str = "No notes available.";

/// What a user action ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// Ignored because an identical action is still in flight, or the user declined
    Skipped,
    /// Blocked by client-side validation; nothing was sent
    Rejected(String),
    Failed(String),
    /// Failed, and the failure is deliberately not shown
    FailedSilently,
    /// The response arrived after teardown and was not applied
    Discarded,
}

impl ActionOutcome {
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Rejected(message) | Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Answers the "are you sure?" prompt before a destructive action.
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Cancellation scope of a mounted screen.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    token: CancellationToken,
}

impl Lifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive `future` unless the scope is torn down first.
    pub async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.token.cancelled() => None,
            output = future => {
                if self.token.is_cancelled() {
                    None
                } else {
                    Some(output)
                }
            }
        }
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.token.is_cancelled()
    }
}

pub(crate) fn lock_state<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

type Reset<'a, T> = Box<dyn FnOnce(&mut T) + Send + 'a>;

/// A busy or in-flight flag held across an `.await`.
///
/// Dropping the claim runs `reset` under the state lock, so an action whose
/// future is dropped part way still gives its flag back. Never drop a claim
/// while the same state is locked unless it was disarmed.
pub(crate) struct Claim<'a, T> {
    state: &'a Mutex<T>,
    reset: Option<Reset<'a, T>>,
}

impl<'a, T> Claim<'a, T> {
    pub(crate) fn new(state: &'a Mutex<T>, reset: impl FnOnce(&mut T) + Send + 'a) -> Self {
        Self {
            state,
            reset: Some(Box::new(reset)),
        }
    }

    /// The flag was already settled under the lock; skip the reset.
    pub(crate) fn disarm(&mut self) {
        self.reset = None;
    }
}

impl<T> Drop for Claim<'_, T> {
    fn drop(&mut self) {
        if let Some(reset) = self.reset.take() {
            reset(&mut lock_state(self.state));
        }
    }
}
