//! Sign-in and sign-up flow.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::{SessionContext, SessionPersistence};
use crate::client::RemoteApi;
use crate::config::SignInFailureMode;
use crate::error::{Error, Result};
use crate::routes::Route;
use crate::util::is_valid_email;
use crate::viewmodel::{lock_state, ActionOutcome, Claim, Lifecycle};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

/// Registration fields, serialized as the sign-up request body
#[derive(Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl SignUpForm {
    #[must_use]
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(Error::validation("Full name is required"));
        }
        validate_credentials(&self.email, &self.password)
    }
}

impl fmt::Debug for SignUpForm {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SignUpForm")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(Error::validation("Email is required"));
    }
    if !is_valid_email(email) {
        return Err(Error::validation(format!(
            "'{}' is not a valid email address",
            email.trim()
        )));
    }
    if password.is_empty() {
        return Err(Error::validation("Password is required"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Submitting,
    Authenticated,
    /// Sign-up succeeded; the user still has to sign in
    Registered,
    Failed,
}

struct GateInner {
    state: GateState,
    message: Option<String>,
    route: Route,
}

pub struct SessionGate<R: RemoteApi> {
    api: Arc<R>,
    session: SessionContext,
    failure_mode: SignInFailureMode,
    persistence: Option<Arc<dyn SessionPersistence>>,
    inner: Mutex<GateInner>,
    lifecycle: Lifecycle,
}

impl<R: RemoteApi> SessionGate<R> {
    /// `session` must be the same context the `api` client sends with.
    pub fn new(api: Arc<R>, session: SessionContext, failure_mode: SignInFailureMode) -> Self {
        let route = if session.is_authenticated() {
            Route::Dashboard
        } else {
            Route::SignIn
        };
        Self {
            api,
            session,
            failure_mode,
            persistence: None,
            inner: Mutex::new(GateInner {
                state: GateState::Idle,
                message: None,
                route,
            }),
            lifecycle: Lifecycle::new(),
        }
    }

    #[must_use]
    pub fn with_persistence(mut self, persistence: Arc<dyn SessionPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn state(&self) -> GateState {
        lock_state(&self.inner).state
    }

    pub fn message(&self) -> Option<String> {
        lock_state(&self.inner).message.clone()
    }

    /// Current screen; screens behind the session fall back to sign-in once it is gone.
    pub fn route(&self) -> Route {
        let route = lock_state(&self.inner).route;
        if route.requires_session() && !self.session.is_authenticated() {
            Route::SignIn
        } else {
            route
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn navigate(&self, route: Route) {
        let mut inner = lock_state(&self.inner);
        inner.route = route;
        inner.message = None;
    }

    /// Claim the submitting slot; `None` when a submission is already running.
    ///
    /// A submission abandoned before it settles returns the gate to idle.
    fn begin_submit(&self) -> Option<Claim<'_, GateInner>> {
        {
            let mut inner = lock_state(&self.inner);
            if inner.state == GateState::Submitting {
                return None;
            }
            inner.state = GateState::Submitting;
            inner.message = None;
        }
        Some(Claim::new(&self.inner, |inner: &mut GateInner| {
            if inner.state == GateState::Submitting {
                inner.state = GateState::Idle;
            }
        }))
    }

    fn reject(&self, error: &Error) -> ActionOutcome {
        let message = error.user_message();
        let mut inner = lock_state(&self.inner);
        inner.state = GateState::Failed;
        inner.message = Some(message.clone());
        ActionOutcome::Rejected(message)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ActionOutcome {
        if lock_state(&self.inner).state == GateState::Submitting {
            return ActionOutcome::Skipped;
        }
        if let Err(error) = validate_credentials(email, password) {
            return self.reject(&error);
        }
        let Some(_submitting) = self.begin_submit() else {
            return ActionOutcome::Skipped;
        };

        let Some(result) = self.lifecycle.run(self.api.sign_in(email.trim(), password)).await
        else {
            return ActionOutcome::Discarded;
        };

        match result {
            Ok(()) => {
                self.session.establish();
                self.persist();
                let mut inner = lock_state(&self.inner);
                inner.state = GateState::Authenticated;
                inner.route = Route::Dashboard;
                ActionOutcome::Completed
            }
            Err(error) => {
                tracing::warn!("Sign-in failed: {}", error);
                let mut inner = lock_state(&self.inner);
                inner.state = GateState::Failed;
                inner.route = Route::SignIn;
                match self.failure_mode {
                    SignInFailureMode::Silent => {
                        inner.message = None;
                        ActionOutcome::FailedSilently
                    }
                    SignInFailureMode::Generic => {
                        let message = match error {
                            Error::Network(_) => error.user_message(),
                            _ => INVALID_CREDENTIALS_MESSAGE.to_string(),
                        };
                        inner.message = Some(message.clone());
                        ActionOutcome::Failed(message)
                    }
                }
            }
        }
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> ActionOutcome {
        if lock_state(&self.inner).state == GateState::Submitting {
            return ActionOutcome::Skipped;
        }
        if let Err(error) = form.validate() {
            return self.reject(&error);
        }
        let Some(_submitting) = self.begin_submit() else {
            return ActionOutcome::Skipped;
        };

        let Some(result) = self.lifecycle.run(self.api.sign_up(form)).await else {
            return ActionOutcome::Discarded;
        };

        let mut inner = lock_state(&self.inner);
        match result {
            Ok(()) => {
                tracing::info!("Account registered");
                inner.state = GateState::Registered;
                inner.route = Route::SignIn;
                ActionOutcome::Completed
            }
            Err(error) => {
                tracing::warn!("Sign-up failed: {}", error);
                let message = error.user_message();
                inner.state = GateState::Failed;
                inner.route = Route::SignUp;
                inner.message = Some(message.clone());
                ActionOutcome::Failed(message)
            }
        }
    }

    /// Drop the session locally; the backend is not contacted.
    pub fn sign_out(&self) {
        self.session.invalidate();
        self.persist();
        let mut inner = lock_state(&self.inner);
        inner.state = GateState::Idle;
        inner.message = None;
        inner.route = Route::SignIn;
    }

    pub fn teardown(&self) {
        self.lifecycle.teardown();
    }

    fn persist(&self) {
        let Some(store) = &self.persistence else {
            return;
        };
        if let Err(error) = self.session.sync_to(store.as_ref()) {
            tracing::warn!("Failed to persist session: {}", error);
        }
    }
}

impl<R: RemoteApi> Drop for SessionGate<R> {
    fn drop(&mut self) {
        self.lifecycle.teardown();
    }
}
