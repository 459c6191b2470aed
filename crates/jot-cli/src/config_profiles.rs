//! Persistent CLI profile configuration.
//!
//! A profile names a pair of backends (notes and account) and how sign-in
//! failures are reported. Environment variables override the active profile.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use jot_core::config::{ACCOUNT_URL_VAR, NOTES_URL_VAR, SIGN_IN_FAILURE_VAR};
use jot_core::util::normalize_text_option;
use jot_core::{ClientConfig, SignInFailureMode};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "cli-config.json";
pub const PROFILE_ENV_VAR: &str = "JOT_PROFILE";
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, CliProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfile {
    #[serde(default)]
    pub notes_api_url: Option<String>,
    #[serde(default)]
    pub account_api_url: Option<String>,
    #[serde(default)]
    pub sign_in_failure: Option<SignInFailureMode>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("jot").join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

pub fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    normalize_text_option(value.map(str::to_string))
}

impl CliProfilesConfig {
    pub fn load() -> Result<Self, CliError> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|error| {
            CliError::Config(format!("Failed to read config at {}: {}", path.display(), error))
        })?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            CliError::Config(format!("Failed to parse config at {}: {}", path.display(), error))
        })?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, CliError> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                CliError::Config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                ))
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)?;
        std::fs::write(path, serialized).map_err(|error| {
            CliError::Config(format!("Failed to write config at {}: {}", path.display(), error))
        })
    }

    /// Explicit name, then `JOT_PROFILE`, then the active profile, then `default`.
    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        normalize_profile_name(explicit)
            .or_else(|| normalize_profile_name(std::env::var(PROFILE_ENV_VAR).ok().as_deref()))
            .or_else(|| normalize_profile_name(self.active_profile.as_deref()))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }

    pub fn profile(&self, name: &str) -> Option<&CliProfile> {
        self.profiles.get(name)
    }

    pub fn profile_mut_or_default(&mut self, name: &str) -> &mut CliProfile {
        self.profiles.entry(name.to_string()).or_default()
    }

    fn normalize(&mut self) {
        self.active_profile = normalize_profile_name(self.active_profile.as_deref());
        for profile in self.profiles.values_mut() {
            profile.normalize();
        }
    }
}

impl CliProfile {
    /// Client config from this profile, with `lookup` (the environment) layered on top.
    pub fn client_config(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ClientConfig, CliError> {
        let from_profile = |name: &str| match name {
            NOTES_URL_VAR => self.notes_api_url.clone(),
            ACCOUNT_URL_VAR => self.account_api_url.clone(),
            SIGN_IN_FAILURE_VAR => self.sign_in_failure.map(|mode| mode.as_str().to_string()),
            _ => None,
        };
        let config = ClientConfig::default()
            .overlay(from_profile)?
            .overlay(lookup)?;
        Ok(config)
    }

    fn normalize(&mut self) {
        self.notes_api_url = normalize_text_option(self.notes_api_url.take());
        self.account_api_url = normalize_text_option(self.account_api_url.take());
    }
}
