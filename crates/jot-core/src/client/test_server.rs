//! In-process stand-in for the note and account backend, served with axum.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::models::{Note, NoteCategory, NoteId, UserAccount};

pub const TEST_EMAIL: &str = "jane@x.com";
pub const TEST_PASSWORD: &str = "correct-horse";
const SESSION_COOKIE: &str = "token=jot-test-session";

#[derive(Default)]
struct BackendState {
    notes: Vec<Note>,
    next_id: u64,
    account: UserAccount,
    registered: Vec<String>,
    forced_status: Option<StatusCode>,
    requests: usize,
}

type SharedState = Arc<Mutex<BackendState>>;

pub struct FakeBackend {
    base_url: String,
    state: SharedState,
    server: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state: SharedState = Arc::new(Mutex::new(BackendState {
            account: UserAccount::new("Jane Doe", TEST_EMAIL),
            ..BackendState::default()
        }));

        let protected = Router::new()
            .route("/api/v1/document/all", get(list_notes))
            .route("/api/v1/document/create", post(create_note))
            .route("/api/v1/document/update", put(update_note))
            .route("/api/v1/document/delete/{id}", delete(delete_note))
            .route("/api/v1/user/me", get(get_account))
            .route("/api/v1/user/update", put(update_account))
            .route_layer(middleware::from_fn(require_session));

        let router = Router::new()
            .route("/api/v1/user/signin", post(sign_in))
            .route("/api/v1/user/signup", post(sign_up))
            .merge(protected)
            .layer(middleware::from_fn_with_state(state.clone(), observe))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{address}"),
            state,
            server,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone(), self.base_url.clone()).unwrap()
    }

    /// Answer every following request with `status` and an empty JSON body.
    pub fn fail_with_status(&self, status: StatusCode) {
        self.state.lock().unwrap().forced_status = Some(status);
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    pub fn registered_names(&self) -> Vec<String> {
        self.state.lock().unwrap().registered.clone()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn observe(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let forced = {
        let mut guard = state.lock().unwrap();
        guard.requests += 1;
        guard.forced_status
    };
    match forced {
        Some(status) => (status, Json(json!({}))).into_response(),
        None => next.run(request).await,
    }
}

async fn require_session(request: Request, next: Next) -> Response {
    let has_session = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookies| cookies.split(';').any(|c| c.trim() == SESSION_COOKIE));
    if has_session {
        next.run(request).await
    } else {
        message(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn list_notes(State(state): State<SharedState>) -> Response {
    let notes = state.lock().unwrap().notes.clone();
    Json(json!({ "message": notes })).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteBody {
    note_id: Option<String>,
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    category: String,
}

async fn create_note(State(state): State<SharedState>, Json(body): Json<NoteBody>) -> Response {
    let mut guard = state.lock().unwrap();
    guard.next_id += 1;
    let note = Note {
        id: NoteId::new(format!("n{:04}", guard.next_id)),
        title: body.title,
        content: body.content,
        category: NoteCategory::from(body.category),
        created_at: Some(Utc::now()),
    };
    guard.notes.push(note);
    message(StatusCode::CREATED, "Note created")
}

async fn update_note(State(state): State<SharedState>, Json(body): Json<NoteBody>) -> Response {
    let mut guard = state.lock().unwrap();
    let target = body.note_id.unwrap_or_default();
    let Some(note) = guard.notes.iter_mut().find(|note| note.id.as_str() == target) else {
        return message(StatusCode::NOT_FOUND, "Note not found");
    };
    note.title = body.title;
    note.content = body.content;
    note.category = NoteCategory::from(body.category);
    message(StatusCode::OK, "Note updated")
}

async fn delete_note(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let mut guard = state.lock().unwrap();
    let before = guard.notes.len();
    guard.notes.retain(|note| note.id.as_str() != id);
    if guard.notes.len() == before {
        message(StatusCode::NOT_FOUND, "Note not found")
    } else {
        message(StatusCode::OK, "Note deleted")
    }
}

async fn get_account(State(state): State<SharedState>) -> Response {
    let account = state.lock().unwrap().account.clone();
    Json(json!({ "data": account })).into_response()
}

async fn update_account(
    State(state): State<SharedState>,
    Json(account): Json<UserAccount>,
) -> Response {
    state.lock().unwrap().account = account;
    message(StatusCode::OK, "Profile updated")
}

#[derive(Deserialize)]
struct SignInBody {
    email: String,
    password: String,
}

async fn sign_in(State(state): State<SharedState>, Json(body): Json<SignInBody>) -> Response {
    let known = state.lock().unwrap().account.email.clone();
    if body.email != known || body.password != TEST_PASSWORD {
        return message(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let mut headers = HeaderMap::new();
    if let Ok(value) = format!("{SESSION_COOKIE}; Path=/; HttpOnly").parse() {
        headers.insert(header::SET_COOKIE, value);
    }
    (headers, Json(json!({ "message": "Signed in" }))).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpBody {
    full_name: String,
    email: String,
    password: String,
}

async fn sign_up(State(state): State<SharedState>, Json(body): Json<SignUpBody>) -> Response {
    if body.email.is_empty() || body.password.is_empty() {
        return message(StatusCode::BAD_REQUEST, "All fields are required");
    }
    state.lock().unwrap().registered.push(body.full_name);
    message(StatusCode::CREATED, "User registered")
}
