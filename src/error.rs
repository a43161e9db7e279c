use thiserror::Error;

/// Failures that can occur while talking to, or interpreting, the two
/// upstream services.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The upstream call completed but returned a non-success status.
    /// Handlers encode this as an HTTP 200 body, matching the relay's
    /// established wire contract.
    #[error("upstream returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    /// The request itself failed (connect, TLS, body decode).
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A collaborator name has no entry in the static email table. This
    /// signals a configuration gap and is deliberately not masked.
    #[error("no email mapping for collaborator {0:?}")]
    UnknownCollaborator(String),

    /// The upstream response did not have the expected shape.
    #[error("unexpected upstream shape: {0}")]
    MalformedUpstream(String),
}
