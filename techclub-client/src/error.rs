//! Client error types

/// Errors returned by [`crate::api::ApiClient`] and [`crate::dashboard::ReviewBoard`]
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport or decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error body
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// Status changes need the review passphrase
    #[error("Password required for status change")]
    PasswordRequired,

    /// The application is not on the board
    #[error("Application {0} is not loaded")]
    UnknownApplication(i32),
}

impl ClientError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Client result alias
pub type ClientResult<T> = Result<T, ClientError>;
