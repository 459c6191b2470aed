use std::sync::Arc;

use jot_core::viewmodel::ProfileView;
use jot_core::ProfileViewModel;

use crate::cli::ProfileCommands;
use crate::commands::common::Connection;
use crate::error::CliError;

pub async fn run_profile(command: ProfileCommands, profile: Option<&str>) -> Result<(), CliError> {
    let connection = Connection::open(profile)?;
    connection.require_session()?;
    let account = ProfileViewModel::new(Arc::clone(&connection.client));
    connection.finish(account.mount().await)?;

    match command {
        ProfileCommands::Show => {}
        ProfileCommands::Edit { full_name, email } => {
            if full_name.is_none() && email.is_none() {
                return Err(CliError::NothingToUpdate);
            }
            account.begin_edit();
            if let Some(full_name) = full_name {
                account.set_full_name(full_name.trim());
            }
            if let Some(email) = email {
                account.set_email(email.trim());
            }
            connection.finish(account.save().await)?;
        }
    }

    for line in format_profile(&account.view()) {
        println!("{line}");
    }
    Ok(())
}

pub fn format_profile(view: &ProfileView) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(success) = &view.success {
        lines.push(success.clone());
    }
    lines.push(format!("Full Name: {}", view.account.full_name));
    lines.push(format!("Email: {}", view.account.email));
    lines
}
