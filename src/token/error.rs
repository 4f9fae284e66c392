use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid signing key")]
    InvalidKey,
    #[error("invalid token ttl")]
    InvalidTtl,
    #[error("failed to encode token")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    /// Short, stable label used in logs and metrics fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::InvalidKey => "invalid_key",
            Self::InvalidTtl => "invalid_ttl",
            Self::Encode(_) => "encode",
        }
    }
}
