use std::env;

use jot_core::config::{normalize_base_url, ACCOUNT_URL_VAR, NOTES_URL_VAR};
use jot_core::util::normalize_text_option;
use jot_core::SignInFailureMode;

use crate::auth::SessionStore;
use crate::cli::ConfigCommands;
use crate::config_profiles::{default_config_path, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            notes_api_url,
            account_api_url,
            sign_in_failure,
            no_activate,
        } => run_config_init(
            global_profile,
            notes_api_url,
            account_api_url,
            sign_in_failure.map(SignInFailureMode::from),
            no_activate,
        ),
        ConfigCommands::Show => run_config_show(global_profile),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    notes_api_url: Option<String>,
    account_api_url: Option<String>,
    sign_in_failure: Option<SignInFailureMode>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load()?;
    let profile_name = config.resolve_profile_name(profile_name);

    let notes_api_url = normalize_text_option(notes_api_url)
        .map(|url| normalize_base_url(url, NOTES_URL_VAR))
        .transpose()?;
    let account_api_url = normalize_text_option(account_api_url)
        .map(|url| normalize_base_url(url, ACCOUNT_URL_VAR))
        .transpose()?;

    let profile = config.profile_mut_or_default(&profile_name);
    if let Some(value) = notes_api_url {
        profile.notes_api_url = Some(value);
    }
    if let Some(value) = account_api_url {
        profile.account_api_url = Some(value);
    }
    if let Some(mode) = sign_in_failure {
        profile.sign_in_failure = Some(mode);
    }

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save()?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );
    Ok(())
}

pub fn run_config_show(profile_name: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load()?;
    let profile_name = config.resolve_profile_name(profile_name);
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();
    let effective = profile.client_config(|name| env::var(name).ok())?;
    let signed_in = SessionStore::new(&profile_name).restore().is_authenticated();

    println!("Config file: {}", default_config_path()?.display());
    println!("Profile: {profile_name}");
    println!("Notes API: {}", effective.notes_base_url);
    println!("Account API: {}", effective.account_base_url);
    println!("Sign-in failure: {}", effective.sign_in_failure);
    println!(
        "Session: {}",
        if signed_in { "signed in" } else { "signed out" }
    );
    Ok(())
}
