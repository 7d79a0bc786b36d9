use thiserror::Error;

/// Failures at the HTTP collaborator boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-success HTTP status. The message is the response body verbatim,
    /// or `HTTP <status>` when the body was empty.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Transport failure (connect, timeout, TLS, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response arrived but did not decode into the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Builds the status-error the way the backend contract reads: body text
    /// wins, `HTTP <status>` fills in for an empty body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        let message = if trimmed.is_empty() {
            format!("HTTP {}", status)
        } else {
            trimmed.to_string()
        };
        FetchError::Status { status, message }
    }
}

/// A create/update form failed a local check; nothing was sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must be a YYYY-MM-DD date")]
    InvalidDate(&'static str),
}

/// Umbrella for user-initiated operations: local validation runs first, the
/// network only sees drafts that passed it.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
