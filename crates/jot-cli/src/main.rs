//! Jot CLI - Command-line client for a remote notes service
//!
//! Sign in once per profile, then list, add, edit and delete notes from the
//! terminal.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::{run_signin, run_signout, run_signup};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::profile::run_profile;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(()) => {}
        Err(CliError::Silent) => std::process::exit(1),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "jot=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Signin { email, password } => run_signin(profile, &email, &password).await?,
        Commands::Signup {
            full_name,
            email,
            password,
        } => run_signup(profile, &full_name, &email, &password).await?,
        Commands::Signout => run_signout(profile)?,
        Commands::List { category, json } => run_list(profile, category.into(), json).await?,
        Commands::Add {
            title,
            content,
            category,
        } => run_add(profile, &title, content, category.into()).await?,
        Commands::Edit {
            id,
            title,
            content,
            category,
        } => run_edit(profile, &id, title, content, category.map(Into::into)).await?,
        Commands::Delete { id, yes } => run_delete(profile, &id, yes).await?,
        Commands::Profile { command } => run_profile(command, profile).await?,
        Commands::Config { command } => run_config(command, profile)?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
