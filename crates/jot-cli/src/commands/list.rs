use std::sync::Arc;

use chrono::Utc;
use jot_core::{CategoryFilter, NotesViewModel};

use crate::commands::common::{format_list_view, note_to_list_item, Connection, NoteListItem};
use crate::error::CliError;

pub async fn run_list(
    profile: Option<&str>,
    filter: CategoryFilter,
    as_json: bool,
) -> Result<(), CliError> {
    let connection = Connection::open(profile)?;
    connection.require_session()?;
    print_dashboard(&connection, filter, as_json).await
}

pub async fn print_dashboard(
    connection: &Connection,
    filter: CategoryFilter,
    as_json: bool,
) -> Result<(), CliError> {
    let dashboard = NotesViewModel::new(Arc::clone(&connection.client));
    dashboard.set_filter(filter);
    connection.finish(dashboard.mount().await)?;

    let now = Utc::now();
    if as_json {
        let json_items = dashboard
            .visible_notes()
            .iter()
            .map(|note| note_to_list_item(note, now))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_list_view(&dashboard.view().list, now) {
            println!("{line}");
        }
    }

    Ok(())
}
