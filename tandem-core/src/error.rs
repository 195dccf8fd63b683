use thiserror::Error;

/// A shared token or link could not be turned back into a descriptor.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token is empty")]
    Empty,

    #[error("token is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token does not hold a connection descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid link: {0}")]
    Url(#[from] url::ParseError),

    #[error("link has no `{0}` query parameter")]
    MissingParam(&'static str),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid link base: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomCodeError {
    #[error("room code must be {expected} characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("room code contains invalid character {0:?}")]
    Character(char),
}
