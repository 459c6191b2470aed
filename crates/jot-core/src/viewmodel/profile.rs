//! Account screen: view the signed-in user's fields and edit them in place.

use std::sync::{Arc, Mutex};

use crate::client::RemoteApi;
use crate::models::UserAccount;

use super::{lock_state, ActionOutcome, Claim, Lifecycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileMode {
    Loading,
    Viewing,
    Editing,
    /// The account could not be fetched; there is no retry
    LoadFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub mode: ProfileMode,
    /// The committed account, or the draft while editing
    pub account: UserAccount,
    pub error: Option<String>,
    pub success: Option<String>,
    pub busy: bool,
}

impl ProfileView {
    #[must_use]
    pub const fn heading(&self) -> &'static str {
        match self.mode {
            ProfileMode::Editing => "Edit Profile",
            _ => "Profile",
        }
    }
}

struct ProfileState {
    mounted: bool,
    mode: ProfileMode,
    account: UserAccount,
    draft: UserAccount,
    error: Option<String>,
    success: Option<String>,
    busy: bool,
}

pub struct ProfileViewModel<R: RemoteApi> {
    api: Arc<R>,
    state: Mutex<ProfileState>,
    lifecycle: Lifecycle,
}

impl<R: RemoteApi> ProfileViewModel<R> {
    pub fn new(api: Arc<R>) -> Self {
        Self {
            api,
            state: Mutex::new(ProfileState {
                mounted: false,
                mode: ProfileMode::Loading,
                account: UserAccount::default(),
                draft: UserAccount::default(),
                error: None,
                success: None,
                busy: false,
            }),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Fetch the account once.
    pub async fn mount(&self) -> ActionOutcome {
        {
            let mut state = lock_state(&self.state);
            if state.mounted {
                return ActionOutcome::Skipped;
            }
            state.mounted = true;
        }
        // A fetch that never finished may be mounted again.
        let mut mounting = Claim::new(&self.state, |state: &mut ProfileState| {
            state.mounted = false;
        });

        let Some(result) = self.lifecycle.run(self.api.get_account()).await else {
            return ActionOutcome::Discarded;
        };
        mounting.disarm();

        let mut state = lock_state(&self.state);
        match result {
            Ok(account) => {
                state.account = account;
                state.mode = ProfileMode::Viewing;
                ActionOutcome::Completed
            }
            Err(error) => {
                tracing::warn!("Failed to load account: {}", error);
                let message = error.user_message();
                state.mode = ProfileMode::LoadFailed;
                state.error = Some(message.clone());
                ActionOutcome::Failed(message)
            }
        }
    }

    pub fn mode(&self) -> ProfileMode {
        lock_state(&self.state).mode
    }

    pub fn account(&self) -> UserAccount {
        lock_state(&self.state).account.clone()
    }

    pub fn begin_edit(&self) -> bool {
        let mut state = lock_state(&self.state);
        if state.mode != ProfileMode::Viewing {
            return false;
        }
        state.draft = state.account.clone();
        state.mode = ProfileMode::Editing;
        true
    }

    pub fn set_full_name(&self, full_name: impl Into<String>) -> bool {
        let full_name = full_name.into();
        self.edit(|draft| draft.full_name = full_name)
    }

    pub fn set_email(&self, email: impl Into<String>) -> bool {
        let email = email.into();
        self.edit(|draft| draft.email = email)
    }

    fn edit(&self, apply: impl FnOnce(&mut UserAccount)) -> bool {
        let mut state = lock_state(&self.state);
        if state.mode != ProfileMode::Editing {
            return false;
        }
        apply(&mut state.draft);
        true
    }

    /// Leave edit mode, dropping the draft and any messages.
    pub fn cancel(&self) {
        let mut state = lock_state(&self.state);
        if state.mode == ProfileMode::Editing {
            state.mode = ProfileMode::Viewing;
        }
        state.draft = state.account.clone();
        state.error = None;
        state.success = None;
    }

    pub async fn save(&self) -> ActionOutcome {
        let draft = {
            let mut state = lock_state(&self.state);
            if state.mode != ProfileMode::Editing || state.busy {
                return ActionOutcome::Skipped;
            }
            state.success = None;
            if let Err(error) = state.draft.validate() {
                let message = error.user_message();
                state.error = Some(message.clone());
                return ActionOutcome::Rejected(message);
            }
            state.busy = true;
            state.error = None;
            state.draft.clone()
        };
        let _busy = Claim::new(&self.state, |state: &mut ProfileState| state.busy = false);

        let Some(result) = self.lifecycle.run(self.api.update_account(&draft)).await else {
            return ActionOutcome::Discarded;
        };

        let mut state = lock_state(&self.state);
        match result {
            Ok(message) => {
                tracing::info!("Account updated");
                state.account = draft;
                state.success = Some(message);
                state.mode = ProfileMode::Viewing;
                ActionOutcome::Completed
            }
            Err(error) => {
                tracing::warn!("Failed to update account: {}", error);
                let message = error.user_message();
                state.error = Some(message.clone());
                ActionOutcome::Failed(message)
            }
        }
    }

    pub fn view(&self) -> ProfileView {
        let state = lock_state(&self.state);
        let account = if state.mode == ProfileMode::Editing {
            state.draft.clone()
        } else {
            state.account.clone()
        };
        ProfileView {
            mode: state.mode,
            account,
            error: state.error.clone(),
            success: state.success.clone(),
            busy: state.busy,
        }
    }

    pub fn teardown(&self) {
        self.lifecycle.teardown();
    }
}

impl<R: RemoteApi> Drop for ProfileViewModel<R> {
    fn drop(&mut self) {
        self.lifecycle.teardown();
    }
}
