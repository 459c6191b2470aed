//! Client configuration.
//!
//! The note collection and the user account live behind two independently
//! configurable base addresses.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_NOTES_BASE_URL: &str = "https://noteapplicationbackend.onrender.com";
pub const DEFAULT_ACCOUNT_BASE_URL: &str = "http://localhost:8000";

pub const NOTES_URL_VAR: &str = "JOT_NOTES_API_URL";
pub const ACCOUNT_URL_VAR: &str = "JOT_ACCOUNT_API_URL";
pub const SIGN_IN_FAILURE_VAR: &str = "JOT_SIGN_IN_FAILURE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How a rejected sign-in is reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInFailureMode {
    /// Stay on the sign-in screen without any message
    #[default]
    Silent,
    /// Show a generic message that does not reveal which field was wrong
    Generic,
}

impl SignInFailureMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for SignInFailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignInFailureMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "generic" => Ok(Self::Generic),
            other => Err(ConfigError::Invalid(format!(
                "{SIGN_IN_FAILURE_VAR} must be 'silent' or 'generic', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub notes_base_url: String,
    pub account_base_url: String,
    pub sign_in_failure: SignInFailureMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            notes_base_url: DEFAULT_NOTES_BASE_URL.to_string(),
            account_base_url: DEFAULT_ACCOUNT_BASE_URL.to_string(),
            sign_in_failure: SignInFailureMode::default(),
        }
    }
}

impl ClientConfig {
    /// Build a config with explicit base URLs, validating both.
    pub fn new(
        notes_base_url: impl Into<String>,
        account_base_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            notes_base_url: normalize_base_url(notes_base_url.into(), NOTES_URL_VAR)?,
            account_base_url: normalize_base_url(account_base_url.into(), ACCOUNT_URL_VAR)?,
            sign_in_failure: SignInFailureMode::default(),
        })
    }

    #[must_use]
    pub fn with_sign_in_failure(mut self, mode: SignInFailureMode) -> Self {
        self.sign_in_failure = mode;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    /// Resolve each value from `lookup`, falling back to the built-in default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::default().overlay(lookup)
    }

    /// Replace the values that `lookup` provides, keeping the rest.
    pub fn overlay(self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let notes_base_url = match normalize_text_option(lookup(NOTES_URL_VAR)) {
            Some(url) => normalize_base_url(url, NOTES_URL_VAR)?,
            None => self.notes_base_url,
        };
        let account_base_url = match normalize_text_option(lookup(ACCOUNT_URL_VAR)) {
            Some(url) => normalize_base_url(url, ACCOUNT_URL_VAR)?,
            None => self.account_base_url,
        };
        let sign_in_failure = match normalize_text_option(lookup(SIGN_IN_FAILURE_VAR)) {
            Some(mode) => mode.parse()?,
            None => self.sign_in_failure,
        };

        Ok(Self {
            notes_base_url,
            account_base_url,
            sign_in_failure,
        })
    }
}

pub fn normalize_base_url(raw: String, name: &str) -> Result<String, ConfigError> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| ConfigError::Invalid(format!("{name} must not be empty")))?;
    if !is_http_url(&url) {
        return Err(ConfigError::Invalid(format!(
            "{name} must start with http:// or https://"
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}
