use crate::session::ConnectionState;
use tandem_core::{DecodeError, EncodeError, TransferId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("room not found")]
    RoomNotFound,

    #[error("room is full")]
    RoomFull,

    #[error("relay unreachable: {0}")]
    Unreachable(String),

    #[error("relay protocol error: {0}")]
    Protocol(String),
}

#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("invalid session description: {0}")]
    InvalidDescription(String),

    #[error("connection cannot take this description now: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("capture device unavailable: {0}")]
    Unavailable(String),

    #[error("capture permission denied")]
    PermissionDenied,

    #[error("failed to attach track: {0}")]
    Attach(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel `{0}` is not open")]
    NotOpen(&'static str),

    #[error("send on `{label}` failed: {reason}")]
    Send { label: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("transfer {id} failed: {source}")]
    Channel {
        id: TransferId,
        #[source]
        source: ChannelError,
    },
}

/// Everything a `SessionHandle` call can fail with.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error(transparent)]
    Signaling(#[from] SignalingError),

    #[error(transparent)]
    Description(#[from] DescriptionError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("not possible while {0}")]
    Busy(ConnectionState),

    #[error("failed to set up connection: {0}")]
    Setup(String),

    #[error("session has shut down")]
    Closed,
}

impl From<webrtc::Error> for PeerError {
    fn from(e: webrtc::Error) -> Self {
        Self::Setup(e.to_string())
    }
}
