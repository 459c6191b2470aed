use std::sync::Arc;

use jot_core::{ActionOutcome, CategoryFilter, Route, SessionGate, SignUpForm};

use crate::commands::common::{outcome_result, Connection};
use crate::commands::list::print_dashboard;
use crate::error::CliError;

pub async fn run_signin(
    profile: Option<&str>,
    email: &str,
    password: &str,
) -> Result<(), CliError> {
    let connection = Connection::open(profile)?;
    let gate = SessionGate::new(
        Arc::clone(&connection.client),
        connection.client.session().clone(),
        connection.config.sign_in_failure,
    )
    .with_persistence(Arc::new(connection.store.clone()));

    let outcome = gate.sign_in(email, password).await;
    if outcome != ActionOutcome::Completed {
        return outcome_result(outcome);
    }

    println!(
        "Signed in profile '{}' as {}",
        connection.profile_name,
        email.trim()
    );
    match gate.route() {
        Route::Dashboard => print_dashboard(&connection, CategoryFilter::All, false).await,
        route => {
            tracing::debug!(%route, "Sign-in settled away from the dashboard");
            Ok(())
        }
    }
}

pub async fn run_signup(
    profile: Option<&str>,
    full_name: &str,
    email: &str,
    password: &str,
) -> Result<(), CliError> {
    let connection = Connection::open(profile)?;
    let gate = SessionGate::new(
        Arc::clone(&connection.client),
        connection.client.session().clone(),
        connection.config.sign_in_failure,
    );

    let form = SignUpForm::new(full_name.trim(), email.trim(), password);
    outcome_result(gate.sign_up(&form).await)?;
    println!("Account created for {}. Run `jot signin` to continue.", form.email);
    Ok(())
}

pub fn run_signout(profile: Option<&str>) -> Result<(), CliError> {
    let connection = Connection::open(profile)?;
    let gate = SessionGate::new(
        Arc::clone(&connection.client),
        connection.client.session().clone(),
        connection.config.sign_in_failure,
    )
    .with_persistence(Arc::new(connection.store.clone()));

    gate.sign_out();
    println!("Signed out profile '{}'", connection.profile_name);
    Ok(())
}
