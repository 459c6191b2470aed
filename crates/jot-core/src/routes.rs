//! Navigable screens of the client.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    SignIn,
    SignUp,
    Dashboard,
    Profile,
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Self::SignIn => "/",
            Self::SignUp => "/signup",
            Self::Dashboard => "/dashboard",
            Self::Profile => "/profile",
        }
    }

    /// Screens whose data calls only succeed under an authenticated session
    pub const fn requires_session(self) -> bool {
        matches!(self, Self::Dashboard | Self::Profile)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
