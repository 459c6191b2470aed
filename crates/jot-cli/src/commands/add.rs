use std::collections::HashSet;
use std::sync::Arc;

use jot_core::{Category, NotesViewModel};

use crate::commands::common::{resolve_note_content, Connection};
use crate::error::CliError;

pub async fn run_add(
    profile: Option<&str>,
    title: &str,
    content: Option<String>,
    category: Category,
) -> Result<(), CliError> {
    let content = resolve_note_content(content)?;
    let connection = Connection::open(profile)?;
    connection.require_session()?;

    let dashboard = NotesViewModel::new(Arc::clone(&connection.client));
    connection.finish(dashboard.mount().await)?;
    let existing = dashboard
        .notes()
        .into_iter()
        .map(|note| note.id)
        .collect::<HashSet<_>>();

    dashboard.open_add();
    dashboard.edit_draft(|draft| {
        draft.title = title.to_string();
        draft.content = content;
        draft.category = category;
    });
    connection.finish(dashboard.submit().await)?;

    match dashboard
        .notes()
        .into_iter()
        .find(|note| !existing.contains(&note.id))
    {
        Some(note) => println!("{}", note.id),
        None => println!("Note added"),
    }
    Ok(())
}
