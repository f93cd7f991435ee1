use thiserror::Error;

/// Everything a request can fail with. The `Display` text of each variant
/// is the user-facing message the notification queue receives.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure; no response arrived.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered outside the success range. `message` follows
    /// the extraction rules in [`client`](super::client): `detail`, then
    /// `message`, then a generic fallback for JSON bodies; a formatted
    /// status line otherwise.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Token renewal failed; the session has been cleared.
    #[error("session expired")]
    SessionExpired,

    /// A payload could not be encoded or decoded as JSON.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The access token is not representable as an HTTP header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Session state could not be persisted.
    #[error("session storage: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
