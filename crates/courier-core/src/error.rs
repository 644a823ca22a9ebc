use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds the core surfaces to its caller. The core never
/// recovers from these locally; the HTTP layer maps each kind to a
/// status code.
#[derive(Debug, Error)]
pub enum Error {
    /// Duplicate username at registration.
    #[error("username already taken: {0}")]
    Conflict(String),

    /// Unknown username or message id.
    #[error("no such {0}")]
    NotFound(String),

    /// Missing, malformed or expired token.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Authenticated, but not allowed to touch this resource.
    #[error("forbidden")]
    Forbidden,

    /// Malformed input, e.g. a self-addressed message.
    #[error("{0}")]
    Validation(String),

    /// Backing store failure. Infrastructure, not a domain outcome.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
}
