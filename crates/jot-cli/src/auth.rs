//! Session cookie persistence in the OS keychain, one entry per profile.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use jot_core::session::SessionStoreResult;
use jot_core::{SessionContext, SessionPersistence, SessionSnapshot, SessionStoreError};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "jot-cli";

#[derive(Debug, Clone)]
pub struct SessionStore {
    username: String,
}

impl SessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            username: format!("session:{profile_name}"),
        }
    }

    /// Rebuild the profile's session; a missing or unreadable entry starts signed out.
    pub fn restore(&self) -> SessionContext {
        match self.load_session() {
            Ok(Some(snapshot)) => SessionContext::restore(snapshot),
            Ok(None) => SessionContext::new(),
            Err(error) => {
                tracing::warn!("Ignoring stored session: {}", error);
                SessionContext::new()
            }
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> SessionStoreResult<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| SessionStoreError::SecureStorage(error.to_string()))
    }
}

impl SessionPersistence for SessionStore {
    #[cfg(not(test))]
    fn load_session(&self) -> SessionStoreResult<Option<SessionSnapshot>> {
        let entry = self.entry()?;
        match entry.get_password() {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(SessionStoreError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load_session(&self) -> SessionStoreResult<Option<SessionSnapshot>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| SessionStoreError::SecureStorage(error.to_string()))?;
        match guard.get(&self.username) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    #[cfg(not(test))]
    fn save_session(&self, snapshot: &SessionSnapshot) -> SessionStoreResult<()> {
        let raw = serde_json::to_string(snapshot)?;
        self.entry()?
            .set_password(&raw)
            .map_err(|error| SessionStoreError::SecureStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save_session(&self, snapshot: &SessionSnapshot) -> SessionStoreResult<()> {
        let raw = serde_json::to_string(snapshot)?;
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| SessionStoreError::SecureStorage(error.to_string()))?;
        guard.insert(self.username.clone(), raw);
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_session(&self) -> SessionStoreResult<()> {
        let entry = self.entry()?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(SessionStoreError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear_session(&self) -> SessionStoreResult<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| SessionStoreError::SecureStorage(error.to_string()))?;
        guard.remove(&self.username);
        Ok(())
    }
}
