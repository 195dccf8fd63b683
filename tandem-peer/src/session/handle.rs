use crate::error::PeerError;
use crate::history::ChatMessage;
use crate::media::MediaSource;
use crate::negotiation::Role;
use crate::session::command::SessionCommand;
use crate::session::{ConnectionState, SessionNotice};
use crate::signaling::ShareableDescriptor;
use crate::transfer::FileTransferRecord;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tandem_core::{RoomCode, RoomRole, TransferId};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Point-in-time view of a session for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: ConnectionState,
    pub role: Option<Role>,
    pub room: Option<(RoomCode, RoomRole)>,
    /// Whether a connection object is currently held.
    pub has_connection: bool,
    pub chat_open: bool,
    pub files_open: bool,
    pub messages: Vec<ChatMessage>,
    pub transfers: Vec<FileTransferRecord>,
}

/// Cheap to clone; every clone talks to the same session task.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    state: watch::Receiver<ConnectionState>,
    notices: broadcast::Sender<SessionNotice>,
}

impl SessionHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<SessionCommand>,
        state: watch::Receiver<ConnectionState>,
        notices: broadcast::Sender<SessionNotice>,
    ) -> Self {
        Self {
            commands,
            state,
            notices,
        }
    }

    /// Starts hosting without a relay. The returned token or link goes to the other person.
    pub async fn host_manual(&self) -> Result<ShareableDescriptor, PeerError> {
        self.request(|reply| SessionCommand::HostManual { reply })
            .await
    }

    /// Completes a manual host with the answer token or link pasted back by the guest.
    pub async fn accept_answer(&self, input: impl Into<String>) -> Result<(), PeerError> {
        let input = input.into();
        self.request(|reply| SessionCommand::AcceptAnswer { input, reply })
            .await
    }

    /// Joins from an offer token or link and returns the answer to send back.
    pub async fn join_manual(
        &self,
        input: impl Into<String>,
    ) -> Result<ShareableDescriptor, PeerError> {
        let input = input.into();
        self.request(|reply| SessionCommand::JoinManual { input, reply })
            .await
    }

    pub async fn host_room(&self) -> Result<RoomCode, PeerError> {
        self.request(|reply| SessionCommand::HostRoom { reply })
            .await
    }

    pub async fn join_room(&self, code: impl Into<String>) -> Result<(), PeerError> {
        let code = code.into();
        self.request(|reply| SessionCommand::JoinRoom { code, reply })
            .await
    }

    pub async fn send_chat(&self, text: impl Into<String>) -> Result<(), PeerError> {
        let text = text.into();
        self.request(|reply| SessionCommand::SendChat { text, reply })
            .await
    }

    /// Queues a file for sending; progress arrives as `TransferUpdated` notices.
    pub async fn send_file(
        &self,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: Bytes,
    ) -> Result<TransferId, PeerError> {
        let name = name.into();
        let mime_type = mime_type.into();
        self.request(|reply| SessionCommand::SendFile {
            name,
            mime_type,
            data,
            reply,
        })
        .await
    }

    pub async fn attach_media(&self, source: Arc<dyn MediaSource>) -> Result<(), PeerError> {
        self.request(|reply| SessionCommand::AttachMedia { source, reply })
            .await
    }

    pub async fn disconnect(&self) -> Result<(), PeerError> {
        let (reply, rx) = oneshot::channel();
        self.post(SessionCommand::Disconnect { reply }).await?;
        rx.await.map_err(|_| PeerError::Closed)
    }

    /// Disconnects and forgets chat history and transfers.
    pub async fn start_new_session(&self) -> Result<(), PeerError> {
        let (reply, rx) = oneshot::channel();
        self.post(SessionCommand::StartNewSession { reply }).await?;
        rx.await.map_err(|_| PeerError::Closed)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, PeerError> {
        let (reply, rx) = oneshot::channel();
        self.post(SessionCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| PeerError::Closed)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn notices(&self) -> broadcast::Receiver<SessionNotice> {
        self.notices.subscribe()
    }

    /// Returns false if `limit` passes first.
    pub async fn wait_for_state(&self, target: ConnectionState, limit: Duration) -> bool {
        let mut rx = self.state.clone();
        matches!(
            tokio::time::timeout(limit, rx.wait_for(|state| *state == target)).await,
            Ok(Ok(_))
        )
    }

    async fn request<T, F>(&self, make: F) -> Result<T, PeerError>
    where
        F: FnOnce(oneshot::Sender<Result<T, PeerError>>) -> SessionCommand,
    {
        let (reply, rx) = oneshot::channel();
        self.post(make(reply)).await?;
        rx.await.map_err(|_| PeerError::Closed)?
    }

    async fn post(&self, command: SessionCommand) -> Result<(), PeerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PeerError::Closed)
    }
}
