//! # Client Error Taxonomy
//!
//! Every failure surfaced by the console falls into one of four buckets:
//! a declined wallet signature, a rejected session, a server-side
//! validation rejection, or an opaque transport problem. Server failures
//! are classified by HTTP status code only, never by sniffing message
//! text.

use thiserror::Error;

/// Decoded shape of a 400 response body.
///
/// The backend reports validation failures either as a field-error list
/// (`{"errors": [...]}`), a single message (`{"message": "..."}`), or an
/// empty/undecodable body. Modeled as a tagged union so callers pattern
/// match instead of probing for properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    FieldErrors(Vec<String>),
    SingleMessage(String),
    Empty,
}

#[derive(Error, Debug)]
pub enum ClientError {
    /// The wallet (or its operator) declined to produce a signature.
    /// Terminal for the attempt; the caller must re-trigger connection.
    #[error("wallet signature rejected: {reason}")]
    SigningRejected { reason: String },

    /// The server reported the session as missing or expired (HTTP 401).
    /// Always resolved by a forced sign-out, never retried automatically.
    #[error("session rejected by server")]
    Unauthorized,

    /// A well-formed request refused by business rules (HTTP 400).
    #[error("request rejected by server validation")]
    ValidationRejected(ErrorBody),

    /// A draw or status action was issued without an event identifier.
    /// Caught client-side; no network call is made.
    #[error("an airdrop event id is required")]
    MissingEventId,

    /// Network failure, undecodable response, or an unexpected status.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}
