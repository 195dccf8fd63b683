use crate::error::ChannelError;
use async_trait::async_trait;
use bytes::Bytes;
use tandem_core::{ChannelFrame, FileFrame};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;

pub const CHAT_LABEL: &str = "chat";
pub const FILES_LABEL: &str = "files";

/// The two logical channels carried by one connection, told apart by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    Chat,
    Files,
}

impl ChannelRole {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            CHAT_LABEL => Some(Self::Chat),
            FILES_LABEL => Some(Self::Files),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Chat => CHAT_LABEL,
            Self::Files => FILES_LABEL,
        }
    }
}

/// A message-oriented pipe with an observable send buffer.
#[async_trait]
pub trait DataPipe: Send + Sync {
    fn role(&self) -> ChannelRole;

    fn is_open(&self) -> bool;

    async fn buffered_amount(&self) -> usize;

    async fn send_text(&self, text: String) -> Result<(), ChannelError>;

    async fn send_binary(&self, data: Bytes) -> Result<(), ChannelError>;
}

fn send_error(role: ChannelRole, e: webrtc::Error) -> ChannelError {
    ChannelError::Send {
        label: role.label(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl DataPipe for RTCDataChannel {
    fn role(&self) -> ChannelRole {
        ChannelRole::from_label(self.label()).unwrap_or(ChannelRole::Chat)
    }

    fn is_open(&self) -> bool {
        self.ready_state() == RTCDataChannelState::Open
    }

    async fn buffered_amount(&self) -> usize {
        RTCDataChannel::buffered_amount(self).await
    }

    async fn send_text(&self, text: String) -> Result<(), ChannelError> {
        if !self.is_open() {
            return Err(ChannelError::NotOpen(DataPipe::role(self).label()));
        }
        RTCDataChannel::send_text(self, text)
            .await
            .map(|_| ())
            .map_err(|e| send_error(DataPipe::role(self), e))
    }

    async fn send_binary(&self, data: Bytes) -> Result<(), ChannelError> {
        if !self.is_open() {
            return Err(ChannelError::NotOpen(DataPipe::role(self).label()));
        }
        self.send(&data)
            .await
            .map(|_| ())
            .map_err(|e| send_error(DataPipe::role(self), e))
    }
}

pub async fn send_chat_frame<P>(pipe: &P, frame: &ChannelFrame) -> Result<(), ChannelError>
where
    P: DataPipe + ?Sized,
{
    let text = frame.encode().map_err(|e| ChannelError::Send {
        label: CHAT_LABEL,
        reason: e.to_string(),
    })?;
    pipe.send_text(text).await
}

pub async fn send_file_frame<P>(pipe: &P, frame: &FileFrame) -> Result<(), ChannelError>
where
    P: DataPipe + ?Sized,
{
    let text = serde_json::to_string(frame).map_err(|e| ChannelError::Send {
        label: FILES_LABEL,
        reason: e.to_string(),
    })?;
    pipe.send_text(text).await
}
