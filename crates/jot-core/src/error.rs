//! Error types for jot-core

use thiserror::Error;

/// Result type alias using jot-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of a remote operation, classified the way the UI reports them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Client-side required-field or format violation; never reaches the network
    #[error("{0}")]
    Validation(String),

    /// The request could not be sent or its response could not be read
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status with the server's message (or a fallback)
    #[error("{message} ({status})")]
    Server { status: u16, message: String },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Text shown inline next to the form or list that triggered the call.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Server { message, .. } => message.clone(),
            Self::Network(_) => self.to_string(),
        }
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }

    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Server { status: 401, .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}
