/// Errors raised by auth capabilities.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid or expired session token")]
    InvalidToken,

    #[error("failed to create session token: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),

    #[error("session store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("role lookup failed: {0}")]
    RoleLookup(#[source] anyhow::Error),

    #[error("unknown user: {0}")]
    UnknownUser(String),
}
