//! Session credential handling.
//!
//! The backend keeps the session in a cookie. [`SessionContext`] owns that
//! cookie jar explicitly: it is handed to the HTTP client at construction,
//! established by the sign-in gate, and invalidated at sign-out or when any
//! request comes back `401`.

mod gate;

use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cookie_store::{Cookie, RawCookie};
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gate::{GateState, SessionGate, SignUpForm, INVALID_CREDENTIALS_MESSAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Serializable copy of the session cookies with their domain, path and expiry.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    cookies: Vec<Cookie<'static>>,
}

impl SessionSnapshot {
    /// `true` when no cookie in the snapshot is still live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.iter().all(Cookie::is_expired)
    }

    /// Value of the live cookie called `name`, if any.
    #[must_use]
    pub fn cookie_value(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|cookie| !cookie.is_expired() && cookie.name() == name)
            .map(|cookie| cookie.value())
    }
}

impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .cookies
            .iter()
            .map(|cookie| cookie.name())
            .collect::<Vec<_>>();
        formatter
            .debug_struct("SessionSnapshot")
            .field("cookies", &names)
            .field("values", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
    #[error("Failed to parse stored session: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SessionStoreResult<T> = Result<T, SessionStoreError>;

/// Durable storage for a session between process runs
pub trait SessionPersistence: Send + Sync {
    fn load_session(&self) -> SessionStoreResult<Option<SessionSnapshot>>;
    fn save_session(&self, snapshot: &SessionSnapshot) -> SessionStoreResult<()>;
    fn clear_session(&self) -> SessionStoreResult<()>;
}

/// Cookie jar shared with the HTTP client
#[derive(Default)]
pub struct SessionCookies {
    jar: Mutex<cookie_store::CookieStore>,
}

impl SessionCookies {
    fn from_jar(jar: cookie_store::CookieStore) -> Self {
        Self {
            jar: Mutex::new(jar),
        }
    }

    fn with_jar<T>(&self, f: impl FnOnce(&mut cookie_store::CookieStore) -> T) -> T {
        let mut guard = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn live_cookies(&self) -> Vec<Cookie<'static>> {
        self.with_jar(|jar| jar.iter_unexpired().cloned().collect())
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies = cookie_headers.filter_map(|header| {
            let raw = header.to_str().ok()?;
            match RawCookie::parse(raw) {
                Ok(cookie) => Some(cookie.into_owned()),
                Err(error) => {
                    tracing::debug!("Ignoring malformed Set-Cookie header from {}: {}", url, error);
                    None
                }
            }
        });
        self.with_jar(|jar| jar.store_response_cookies(cookies, url));
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self.with_jar(|jar| {
            jar.get_request_values(url)
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ")
        });
        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}

/// The explicit session a client runs under.
///
/// Cloning is cheap; clones share the same cookies and state.
#[derive(Clone, Default)]
pub struct SessionContext {
    cookies: Arc<SessionCookies>,
    authenticated: Arc<AtomicBool>,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a session from a persisted snapshot.
    ///
    /// Cookies that expired while stored are dropped; any live cookie left
    /// means authenticated.
    #[must_use]
    pub fn restore(snapshot: SessionSnapshot) -> Self {
        let jar = cookie_store::CookieStore::from_cookies(
            snapshot.cookies.into_iter().map(Ok::<_, Infallible>),
            false,
        )
        .unwrap_or_else(|never| match never {});
        let authenticated = jar.iter_unexpired().next().is_some();
        Self {
            cookies: Arc::new(SessionCookies::from_jar(jar)),
            authenticated: Arc::new(AtomicBool::new(authenticated)),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.authenticated.load(Ordering::SeqCst) {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub fn establish(&self) {
        self.authenticated.store(true, Ordering::SeqCst);
        tracing::info!("Session established");
    }

    pub fn invalidate(&self) {
        self.cookies.with_jar(cookie_store::CookieStore::clear);
        if self.authenticated.swap(false, Ordering::SeqCst) {
            tracing::info!("Session invalidated");
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            cookies: self.cookies.live_cookies(),
        }
    }

    /// Save the session when authenticated, otherwise clear any stored copy.
    pub fn sync_to(&self, store: &dyn SessionPersistence) -> SessionStoreResult<()> {
        if self.is_authenticated() {
            store.save_session(&self.snapshot())
        } else {
            store.clear_session()
        }
    }

    pub(crate) fn cookie_store(&self) -> Arc<SessionCookies> {
        Arc::clone(&self.cookies)
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SessionContext")
            .field("state", &self.state())
            .field("cookies", &"[REDACTED]")
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemorySessionStore;
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    fn set_cookie(session: &SessionContext, target: &str, raw: &'static str) {
        let header = HeaderValue::from_static(raw);
        let mut headers = std::iter::once(&header);
        session.cookie_store().set_cookies(&mut headers, &url(target));
    }

    #[test]
    fn stores_and_replays_cookies_per_host() {
        let session = SessionContext::new();
        set_cookie(
            &session,
            "http://localhost:8000/api/v1/user/signin",
            "token=abc123; Path=/; HttpOnly",
        );

        let header = session
            .cookie_store()
            .cookies(&url("http://localhost:8000/api/v1/user/me"))
            .unwrap();
        assert_eq!(header.to_str().unwrap(), "token=abc123");
        assert!(session
            .cookie_store()
            .cookies(&url("https://notes.example.com/api"))
            .is_none());
    }

    #[test]
    fn max_age_zero_removes_cookie() {
        let session = SessionContext::new();
        set_cookie(&session, "http://localhost/", "token=abc; Path=/");
        set_cookie(&session, "http://localhost/", "token=; Max-Age=0; Path=/");
        assert!(session.snapshot().is_empty());
    }

    #[test]
    fn past_expires_clears_cookie() {
        let session = SessionContext::new();
        set_cookie(&session, "http://localhost/", "token=abc; Path=/");
        set_cookie(
            &session,
            "http://localhost/",
            "token=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        );

        assert!(session
            .cookie_store()
            .cookies(&url("http://localhost/api/v1/user/me"))
            .is_none());
        let snapshot = session.snapshot();
        assert!(snapshot.is_empty());
        assert!(!SessionContext::restore(snapshot).is_authenticated());
    }

    #[test]
    fn cookies_follow_path_and_secure_attributes() {
        let session = SessionContext::new();
        set_cookie(&session, "https://localhost/", "token=abc; Path=/api; Secure");

        assert!(session
            .cookie_store()
            .cookies(&url("http://localhost/api/v1/user/me"))
            .is_none());
        assert!(session
            .cookie_store()
            .cookies(&url("https://localhost/other"))
            .is_none());
        let header = session
            .cookie_store()
            .cookies(&url("https://localhost/api/v1/user/me"))
            .unwrap();
        assert_eq!(header.to_str().unwrap(), "token=abc");
    }

    #[test]
    fn invalidate_clears_cookies_and_state() {
        let session = SessionContext::new();
        set_cookie(&session, "http://localhost/", "token=abc");
        session.establish();
        assert!(session.is_authenticated());

        session.invalidate();
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(session.snapshot().is_empty());
    }

    #[test]
    fn restore_round_trips_through_persistence() {
        let store = MemorySessionStore::default();
        let session = SessionContext::new();
        set_cookie(&session, "http://localhost/", "token=abc");
        session.establish();
        session.sync_to(&store).unwrap();

        let restored = SessionContext::restore(store.load_session().unwrap().unwrap());
        assert!(restored.is_authenticated());
        assert_eq!(restored.snapshot(), session.snapshot());
        assert_eq!(restored.snapshot().cookie_value("token"), Some("abc"));

        restored.invalidate();
        restored.sync_to(&store).unwrap();
        assert!(store.load_session().unwrap().is_none());
    }

    #[test]
    fn debug_output_redacts_cookie_values() {
        let session = SessionContext::new();
        set_cookie(&session, "http://localhost/", "token=secret-cookie");
        let rendered = format!("{:?} {:?}", session, session.snapshot());
        assert!(!rendered.contains("secret-cookie"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
