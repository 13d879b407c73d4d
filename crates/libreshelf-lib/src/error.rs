use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Authentication failed. Please log in.")]
    Auth,
    #[error("request failed with status {status}: {detail}")]
    Http { status: u16, detail: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Validation(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("Login success but profile failed.")]
    ProfileUnavailable,
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Missing token, or a token the server refused.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth | Error::Http { status: 401, .. })
    }

    /// Text suitable for an inline error region or an alert.
    pub fn user_message(&self) -> String {
        match self {
            Error::Http { detail, .. } => detail.clone(),
            Error::Network(_) => "An error occurred. Please check your connection.".to_string(),
            Error::Decode(_) => "The server returned an unexpected response.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}
