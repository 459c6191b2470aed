use std::io::{self, IsTerminal};
use std::sync::Arc;

use jot_core::{Category, NoteId, NotesViewModel};

use crate::commands::common::{
    capture_editor_input_with_initial, normalize_note_identifier, read_piped_stdin, Connection,
};
use crate::error::CliError;

pub async fn run_edit(
    profile: Option<&str>,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    category: Option<Category>,
) -> Result<(), CliError> {
    let id = NoteId::new(normalize_note_identifier(id)?);
    let connection = Connection::open(profile)?;
    connection.require_session()?;

    let dashboard = NotesViewModel::new(Arc::clone(&connection.client));
    connection.finish(dashboard.mount().await)?;
    if !dashboard.open_edit(&id) {
        return Err(CliError::NoteNotFound(id.to_string()));
    }

    let content = if title.is_none() && content.is_none() && category.is_none() {
        let current = dashboard
            .form()
            .map(|form| form.draft.content)
            .unwrap_or_default();
        let edited = if io::stdin().is_terminal() {
            capture_editor_input_with_initial(&current)?
        } else {
            read_piped_stdin()?
        };
        Some(edited.ok_or(CliError::NothingToUpdate)?)
    } else {
        content
    };

    dashboard.edit_draft(|draft| {
        if let Some(title) = title {
            draft.title = title;
        }
        if let Some(content) = content {
            draft.content = content;
        }
        if let Some(category) = category {
            draft.category = category;
        }
    });
    connection.finish(dashboard.submit().await)?;

    println!("{id}");
    Ok(())
}
