use std::sync::Arc;

use jot_core::{ActionOutcome, NoteId, NotesViewModel};

use crate::commands::common::{confirm_on_terminal, normalize_note_identifier, Connection};
use crate::error::CliError;

pub async fn run_delete(profile: Option<&str>, id: &str, assume_yes: bool) -> Result<(), CliError> {
    let id = NoteId::new(normalize_note_identifier(id)?);
    let connection = Connection::open(profile)?;
    connection.require_session()?;

    let dashboard = NotesViewModel::new(Arc::clone(&connection.client));
    let outcome = if assume_yes {
        dashboard.delete(&id, &|_: &str| true).await
    } else {
        dashboard.delete(&id, &confirm_on_terminal).await
    };

    if outcome == ActionOutcome::Skipped {
        println!("Cancelled");
        return Ok(());
    }
    connection.finish(outcome)?;
    println!("{id}");
    Ok(())
}
