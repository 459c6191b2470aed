//! `reqwest` adapter for the note and account endpoints.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{
    RemoteApi, CREATE_NOTE_FALLBACK, DELETE_NOTE_FALLBACK, GET_ACCOUNT_FALLBACK,
    LIST_NOTES_FALLBACK, SIGN_IN_FALLBACK, SIGN_UP_FALLBACK, UPDATE_ACCOUNT_FALLBACK,
    UPDATE_ACCOUNT_SUCCESS, UPDATE_NOTE_FALLBACK,
};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{Category, Note, NoteDraft, NoteId, UserAccount};
use crate::session::{SessionContext, SignUpForm};
use crate::util::{compact_text, normalize_text_option};

#[derive(Clone)]
pub struct HttpRemoteClient {
    notes_base_url: String,
    account_base_url: String,
    client: Client,
    session: SessionContext,
}

impl HttpRemoteClient {
    pub fn new(config: &ClientConfig, session: SessionContext) -> Result<Self> {
        let client = Client::builder()
            .cookie_provider(session.cookie_store())
            .build()?;

        Ok(Self {
            notes_base_url: config.notes_base_url.trim_end_matches('/').to_string(),
            account_base_url: config.account_base_url.trim_end_matches('/').to_string(),
            client,
            session,
        })
    }

    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    fn notes_url(&self, path: &str) -> String {
        format!("{}/api/v1/document/{path}", self.notes_base_url)
    }

    fn account_url(&self, path: &str) -> String {
        format!("{}/api/v1/user/{path}", self.account_base_url)
    }

    /// Send and classify: transport failure, non-success status, or success.
    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Response> {
        let response = request.send().await.map_err(|error| {
            tracing::warn!("Request failed before a response arrived: {}", error);
            Error::network(error.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.session.invalidate();
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        let message = parse_api_error(&body).unwrap_or_else(|| fallback.to_string());
        tracing::warn!(
            status = status.as_u16(),
            path = url.path(),
            "Server rejected request: {}",
            message
        );
        Err(Error::server(status.as_u16(), message))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|error| Error::network(format!("invalid response body: {error}")))
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteClient {
    async fn list_notes(&self) -> Result<Vec<Note>> {
        tracing::debug!("Fetching note collection");
        let request = self.client.get(self.notes_url("all"));
        let response = self.send(request, LIST_NOTES_FALLBACK).await?;
        let envelope = Self::decode::<NotesEnvelope>(response).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    async fn create_note(&self, draft: &NoteDraft) -> Result<()> {
        draft.validate()?;
        tracing::debug!(category = %draft.category, "Creating note");
        let request = self
            .client
            .post(self.notes_url("create"))
            .json(&NotePayload::new(None, draft));
        self.send(request, CREATE_NOTE_FALLBACK).await?;
        Ok(())
    }

    async fn update_note(&self, id: &NoteId, draft: &NoteDraft) -> Result<()> {
        draft.validate()?;
        tracing::debug!(note = %id, "Updating note");
        let request = self
            .client
            .put(self.notes_url("update"))
            .json(&NotePayload::new(Some(id), draft));
        self.send(request, UPDATE_NOTE_FALLBACK).await?;
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        tracing::debug!(note = %id, "Deleting note");
        let request = self
            .client
            .delete(self.notes_url(&format!("delete/{id}")))
            .header("Content-Type", "application/json");
        self.send(request, DELETE_NOTE_FALLBACK).await?;
        Ok(())
    }

    async fn get_account(&self) -> Result<UserAccount> {
        tracing::debug!("Fetching account");
        let request = self.client.get(self.account_url("me"));
        let response = self.send(request, GET_ACCOUNT_FALLBACK).await?;
        let envelope = Self::decode::<AccountEnvelope>(response).await?;
        envelope
            .data
            .ok_or_else(|| Error::network("account response did not include user data"))
    }

    async fn update_account(&self, account: &UserAccount) -> Result<String> {
        account.validate()?;
        tracing::debug!("Updating account");
        let request = self.client.put(self.account_url("update")).json(account);
        let response = self.send(request, UPDATE_ACCOUNT_FALLBACK).await?;
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<MessageEnvelope>(&body)
            .ok()
            .and_then(|envelope| normalize_text_option(envelope.message))
            .unwrap_or_else(|| UPDATE_ACCOUNT_SUCCESS.to_string()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        tracing::debug!("Signing in");
        let request = self
            .client
            .post(self.account_url("signin"))
            .json(&SignInPayload { email, password });
        self.send(request, SIGN_IN_FALLBACK).await?;
        Ok(())
    }

    async fn sign_up(&self, form: &SignUpForm) -> Result<()> {
        tracing::debug!("Signing up");
        let request = self.client.post(self.account_url("signup")).json(form);
        self.send(request, SIGN_UP_FALLBACK).await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    note_id: Option<&'a NoteId>,
    title: &'a str,
    content: &'a str,
    category: Category,
}

impl<'a> NotePayload<'a> {
    fn new(note_id: Option<&'a NoteId>, draft: &'a NoteDraft) -> Self {
        Self {
            note_id,
            title: &draft.title,
            content: &draft.content,
            category: draft.category,
        }
    }
}

#[derive(Serialize)]
struct SignInPayload<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct NotesEnvelope {
    #[serde(default)]
    message: Option<Vec<Note>>,
}

#[derive(Debug, Deserialize)]
struct AccountEnvelope {
    #[serde(default)]
    data: Option<UserAccount>,
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn parse_api_error(body: &str) -> Option<String> {
    let payload = serde_json::from_str::<ApiErrorBody>(body).ok()?;
    normalize_text_option(payload.message.or(payload.error)).map(|message| compact_text(&message))
}
