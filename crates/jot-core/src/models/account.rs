//! User account model

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::util::is_valid_email;

/// The signed-in user's editable account fields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
}

impl UserAccount {
    #[must_use]
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(Error::validation("Full name is required"));
        }
        if self.email.trim().is_empty() {
            return Err(Error::validation("Email is required"));
        }
        if !is_valid_email(&self.email) {
            return Err(Error::validation(format!(
                "'{}' is not a valid email address",
                self.email.trim()
            )));
        }
        Ok(())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
