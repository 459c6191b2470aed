//! In-memory `RemoteApi` with a call log, scripted failures and optional
//! latency, for driving the view-models and the sign-in gate in tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::RemoteApi;
use crate::error::{Error, Result};
use crate::models::{Category, Note, NoteCategory, NoteDraft, NoteId, UserAccount};
use crate::session::SignUpForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    ListNotes,
    CreateNote,
    UpdateNote,
    DeleteNote,
    GetAccount,
    UpdateAccount,
    SignIn,
    SignUp,
}

#[derive(Default)]
struct FakeState {
    notes: Vec<Note>,
    next_id: u64,
    account: UserAccount,
    password: String,
    calls: Vec<Call>,
    failures: HashMap<Call, Error>,
    latency: Option<Duration>,
}

#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<FakeState>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        let fake = Self::new();
        {
            let mut state = fake.state.lock().unwrap();
            state.next_id = notes.len() as u64;
            state.notes = notes;
        }
        fake
    }

    pub fn with_account(self, account: UserAccount, password: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.account = account;
            state.password = password.to_string();
        }
        self
    }

    /// Every call to `call` fails with `error` until [`Self::succeed`].
    pub fn fail(&self, call: Call, error: Error) {
        self.state.lock().unwrap().failures.insert(call, error);
    }

    pub fn succeed(&self, call: Call) {
        self.state.lock().unwrap().failures.remove(&call);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().unwrap().latency = Some(latency);
    }

    /// Server-side mutation that bypasses the call log.
    pub fn insert_note(&self, note: Note) {
        self.state.lock().unwrap().notes.push(note);
    }

    pub fn notes(&self) -> Vec<Note> {
        self.state.lock().unwrap().notes.clone()
    }

    pub fn account(&self) -> UserAccount {
        self.state.lock().unwrap().account.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls().into_iter().filter(|c| *c == call).count()
    }

    /// Record the call, wait out any latency, then return the scripted failure.
    async fn enter(&self, call: Call) -> Result<()> {
        let (latency, failure) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            (state.latency, state.failures.get(&call).cloned())
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        failure.map_or(Ok(()), Err)
    }
}

pub fn note(id: &str, title: &str, category: Category) -> Note {
    Note {
        id: NoteId::new(id),
        title: title.to_string(),
        content: String::new(),
        category: NoteCategory::Known(category),
        created_at: Some(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()),
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn list_notes(&self) -> Result<Vec<Note>> {
        self.enter(Call::ListNotes).await?;
        Ok(self.notes())
    }

    async fn create_note(&self, draft: &NoteDraft) -> Result<()> {
        draft.validate()?;
        self.enter(Call::CreateNote).await?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("fake-{}", state.next_id);
        state.notes.push(Note {
            id: NoteId::new(id),
            title: draft.title.clone(),
            content: draft.content.clone(),
            category: NoteCategory::Known(draft.category),
            created_at: Some(Utc::now()),
        });
        Ok(())
    }

    async fn update_note(&self, id: &NoteId, draft: &NoteDraft) -> Result<()> {
        draft.validate()?;
        self.enter(Call::UpdateNote).await?;
        let mut state = self.state.lock().unwrap();
        let note = state
            .notes
            .iter_mut()
            .find(|note| &note.id == id)
            .ok_or_else(|| Error::server(404, "Note not found"))?;
        note.title = draft.title.clone();
        note.content = draft.content.clone();
        note.category = NoteCategory::Known(draft.category);
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        self.enter(Call::DeleteNote).await?;
        let mut state = self.state.lock().unwrap();
        let before = state.notes.len();
        state.notes.retain(|note| &note.id != id);
        if state.notes.len() == before {
            return Err(Error::server(404, "Note not found"));
        }
        Ok(())
    }

    async fn get_account(&self) -> Result<UserAccount> {
        self.enter(Call::GetAccount).await?;
        Ok(self.account())
    }

    async fn update_account(&self, account: &UserAccount) -> Result<String> {
        account.validate()?;
        self.enter(Call::UpdateAccount).await?;
        self.state.lock().unwrap().account = account.clone();
        Ok("User updated successfully".to_string())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        self.enter(Call::SignIn).await?;
        let state = self.state.lock().unwrap();
        if state.account.email == email && state.password == password {
            Ok(())
        } else {
            Err(Error::server(401, "Invalid credentials"))
        }
    }

    async fn sign_up(&self, _form: &SignUpForm) -> Result<()> {
        self.enter(Call::SignUp).await
    }
}
