use std::env;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use jot_core::viewmodel::NoteListView;
use jot_core::{ActionOutcome, ClientConfig, HttpRemoteClient, Note};
use serde::Serialize;

use crate::auth::SessionStore;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub created_at: Option<String>,
    pub relative_time: Option<String>,
}

/// Backend client and stored session for the selected profile.
pub struct Connection {
    pub profile_name: String,
    pub config: ClientConfig,
    pub store: SessionStore,
    pub client: Arc<HttpRemoteClient>,
}

impl Connection {
    pub fn open(profile: Option<&str>) -> Result<Self, CliError> {
        let profiles = CliProfilesConfig::load()?;
        let profile_name = profiles.resolve_profile_name(profile);
        let config = profiles
            .profile(&profile_name)
            .cloned()
            .unwrap_or_default()
            .client_config(|name| env::var(name).ok())?;
        let store = SessionStore::new(&profile_name);
        let session = store.restore();
        tracing::debug!(
            profile = %profile_name,
            notes = %config.notes_base_url,
            account = %config.account_base_url,
            "Opening connection"
        );
        let client = Arc::new(HttpRemoteClient::new(&config, session)?);

        Ok(Self {
            profile_name,
            config,
            store,
            client,
        })
    }

    pub fn require_session(&self) -> Result<(), CliError> {
        if self.client.session().is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotSignedIn)
        }
    }

    /// Store the session as it stands now and turn `outcome` into a result.
    ///
    /// A request answered with `401` has already invalidated the session, so
    /// the stored copy is cleared and the user is asked to sign in again.
    pub fn finish(&self, outcome: ActionOutcome) -> Result<(), CliError> {
        self.client.session().sync_to(&self.store)?;
        if matches!(outcome, ActionOutcome::Failed(_)) && !self.client.session().is_authenticated()
        {
            return Err(CliError::NotSignedIn);
        }
        outcome_result(outcome)
    }
}

pub fn outcome_result(outcome: ActionOutcome) -> Result<(), CliError> {
    match outcome {
        ActionOutcome::Completed | ActionOutcome::Skipped => Ok(()),
        ActionOutcome::Rejected(message) | ActionOutcome::Failed(message) => {
            Err(CliError::Action(message))
        }
        ActionOutcome::FailedSilently => Err(CliError::Silent),
        ActionOutcome::Discarded => Err(CliError::Action("Request was cancelled".to_string())),
    }
}

pub fn format_note_lines(notes: &[Note], now: DateTime<Utc>) -> Vec<String> {
    notes
        .iter()
        .map(|note| {
            let id = note.id.to_string();
            let short_id = id.chars().take(13).collect::<String>();
            let title = truncate(&note.title, 30);
            let preview = note_preview(note, 40);
            let relative_time = note.created_relative(now).unwrap_or_default();
            let category = note.category.as_str();

            if preview.is_empty() {
                format!("{short_id:<13}  {category:<8}  {title:<30}  {relative_time}")
            } else {
                format!("{short_id:<13}  {category:<8}  {title:<30}  {relative_time:<20}  {preview}")
            }
        })
        .collect()
}

/// Lines for the dashboard list, or its placeholder.
pub fn format_list_view(list: &NoteListView, now: DateTime<Utc>) -> Vec<String> {
    match list {
        NoteListView::Notes(notes) => format_note_lines(notes, now),
        other => other
            .placeholder()
            .map(|text| vec![text.to_string()])
            .unwrap_or_default(),
    }
}

pub fn note_to_list_item(note: &Note, now: DateTime<Utc>) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        category: note.category.to_string(),
        created_at: note.created_at.map(|created_at| created_at.to_rfc3339()),
        relative_time: note.created_relative(now),
    }
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, max_chars)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = text.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Note body from the flag, else from piped stdin, else empty.
pub fn resolve_note_content(content: Option<String>) -> Result<String, CliError> {
    if let Some(content) = content {
        return Ok(content);
    }
    Ok(read_piped_stdin()?.unwrap_or_default())
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Ask `prompt` on stderr and read a yes/no answer; anything but yes declines.
pub fn confirm_on_terminal(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    if io::stderr().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_affirmative(&answer),
        Err(error) => {
            tracing::warn!("Failed to read confirmation: {}", error);
            false
        }
    }
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(CliError::EditorFailed("empty EDITOR command".into()));
    };

    let status = Command::new(program).args(parts).arg(file_path).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        )))
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("jot-note-{}-{now}.md", std::process::id()))
}
