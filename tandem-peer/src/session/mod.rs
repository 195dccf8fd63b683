//! The session actor: one task owns the connection, its channels, history and transfers.
//! Callers talk to it through a [`SessionHandle`].

mod command;
mod event;
mod handle;
mod state;

mod chat_impl;
mod create_pc_impl;
mod host_impl;
mod join_impl;
mod link_event_impl;
mod media_impl;
mod relay_event_impl;
mod teardown_impl;
mod transfer_impl;

pub use event::SessionNotice;
pub use handle::*;
pub use state::*;

use crate::channel::DataPipe;
use crate::config::PeerConfig;
use crate::error::{PeerError, SignalingError};
use crate::history::SessionHistory;
use crate::ice::IceCoordinator;
use crate::media::MediaSource;
use crate::negotiation::NegotiationEngine;
use crate::signaling::{RelayClient, RelayStream};
use crate::transfer::{OutgoingFile, TransferBook};
use command::SessionCommand;
use event::{EventSink, Tagged};
use std::fmt::Display;
use std::sync::Arc;
use tandem_core::{RoomCode, RoomRole};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use webrtc::data_channel::RTCDataChannel;
use webrtc::peer_connection::RTCPeerConnection;

const COMMAND_CAPACITY: usize = 32;
const NOTICE_CAPACITY: usize = 256;

/// Relay room a link is using to negotiate. Dropped once the peers are connected.
pub(crate) struct RoomSession {
    client: RelayClient,
    code: RoomCode,
    role: RoomRole,
    stream: Option<RelayStream>,
}

impl RoomSession {
    /// Closes the event stream and leaves the room in the background.
    fn release(mut self) {
        if let Some(stream) = self.stream.take() {
            stream.close();
        }
        info!("Leaving room {} as {}", self.code, self.role);
        tokio::spawn(async move {
            self.client.leave(&self.code, self.role).await;
        });
    }
}

/// Serial sender for the `files` channel; one file at a time.
pub(crate) struct FileSender {
    queue: mpsc::UnboundedSender<OutgoingFile>,
    worker: JoinHandle<()>,
}

/// Everything tied to one peer connection. Replaced wholesale on every new attempt.
pub(crate) struct PeerLink {
    epoch: u64,
    pc: Arc<RTCPeerConnection>,
    engine: NegotiationEngine<RTCPeerConnection>,
    ice: IceCoordinator,
    chat: Option<Arc<RTCDataChannel>>,
    files: Option<Arc<RTCDataChannel>>,
    /// Encoded chat frames waiting for the chat channel to open.
    pending_chat: Vec<String>,
    room: Option<RoomSession>,
    media: Vec<Arc<dyn MediaSource>>,
    file_sender: Option<FileSender>,
}

impl PeerLink {
    fn chat_open(&self) -> bool {
        self.chat.as_ref().is_some_and(|dc| dc.is_open())
    }

    fn files_open(&self) -> bool {
        self.files.as_ref().is_some_and(|dc| dc.is_open())
    }
}

pub struct Session {
    config: PeerConfig,
    commands: mpsc::Receiver<SessionCommand>,
    events_tx: mpsc::UnboundedSender<Tagged>,
    events_rx: mpsc::UnboundedReceiver<Tagged>,
    state: watch::Sender<ConnectionState>,
    notices: broadcast::Sender<SessionNotice>,
    epoch: u64,
    link: Option<PeerLink>,
    history: SessionHistory,
    transfers: TransferBook,
}

impl Session {
    /// Starts the session task and returns a handle to it. The task ends once every handle is dropped.
    pub fn spawn(config: PeerConfig) -> SessionHandle {
        let (command_tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        let session = Session {
            config,
            commands,
            events_tx,
            events_rx,
            state,
            notices: notices.clone(),
            epoch: 0,
            link: None,
            history: SessionHistory::default(),
            transfers: TransferBook::new(),
        };
        tokio::spawn(session.run());

        SessionHandle::new(command_tx, state_rx, notices)
    }

    async fn run(mut self) {
        info!("Session loop started");

        loop {
            tokio::select! {
                cmd = self.commands.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All handles dropped. Shutting down session.");
                            break;
                        }
                    }
                }

                Some(tagged) = self.events_rx.recv() => {
                    if self.is_current(tagged.epoch) {
                        self.handle_link_event(tagged.event).await;
                    } else {
                        debug!("Dropping event from stale connection {}", tagged.epoch);
                    }
                }
            }
        }

        self.teardown().await;
        info!("Session loop finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::HostManual { reply } => {
                let _ = reply.send(self.host_manual().await);
            }
            SessionCommand::AcceptAnswer { input, reply } => {
                let _ = reply.send(self.accept_answer(&input).await);
            }
            SessionCommand::JoinManual { input, reply } => {
                let _ = reply.send(self.join_manual(&input).await);
            }
            SessionCommand::HostRoom { reply } => {
                let _ = reply.send(self.host_room().await);
            }
            SessionCommand::JoinRoom { code, reply } => {
                let _ = reply.send(self.join_room(&code).await);
            }
            SessionCommand::SendChat { text, reply } => {
                let _ = reply.send(self.send_chat(text).await);
            }
            SessionCommand::SendFile {
                name,
                mime_type,
                data,
                reply,
            } => {
                let _ = reply.send(self.send_file(name, mime_type, data));
            }
            SessionCommand::AttachMedia { source, reply } => {
                let _ = reply.send(self.attach_media(source).await);
            }
            SessionCommand::Disconnect { reply } => {
                self.disconnect().await;
                let _ = reply.send(());
            }
            SessionCommand::StartNewSession { reply } => {
                self.start_new_session().await;
                let _ = reply.send(());
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let link = self.link.as_ref();
        SessionSnapshot {
            state: self.current_state(),
            role: link.and_then(|l| l.engine.role()),
            room: link
                .and_then(|l| l.room.as_ref())
                .map(|room| (room.code.clone(), room.role)),
            has_connection: link.is_some(),
            chat_open: link.is_some_and(PeerLink::chat_open),
            files_open: link.is_some_and(PeerLink::files_open),
            messages: self.history.messages().to_vec(),
            transfers: self.transfers.records().to_vec(),
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.link.as_ref().is_some_and(|link| link.epoch == epoch)
    }

    fn current_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Applies a lifecycle event. Returns false if the machine did not move.
    fn transition(&mut self, event: LifecycleEvent) -> bool {
        let current = self.current_state();
        match current.next(event) {
            Some(next) if next != current => {
                info!("Connection state: {} -> {}", current, next);
                self.state.send_replace(next);
                true
            }
            _ => false,
        }
    }

    /// New connection attempts are only allowed from `Disconnected`.
    fn ensure_idle(&self) -> Result<(), PeerError> {
        match self.current_state() {
            ConnectionState::Disconnected => Ok(()),
            busy => Err(PeerError::Busy(busy)),
        }
    }

    fn relay_client(&self) -> Result<RelayClient, PeerError> {
        let url = self
            .config
            .relay_url
            .as_deref()
            .ok_or_else(|| SignalingError::Unreachable("no relay configured".into()))?;
        Ok(RelayClient::new(url)?)
    }

    fn link_mut(&mut self) -> Result<&mut PeerLink, PeerError> {
        self.link
            .as_mut()
            .ok_or_else(|| PeerError::Setup("no active connection".into()))
    }

    fn sink(&self, epoch: u64) -> EventSink {
        EventSink::new(epoch, self.events_tx.clone())
    }

    fn notify(&self, notice: SessionNotice) {
        let _ = self.notices.send(notice);
    }

    fn report(&self, context: &str, e: &dyn Display) {
        error!("{}: {}", context, e);
        self.notify(SessionNotice::Error(format!("{context}: {e}")));
    }

    /// A connection attempt failed part way: surface it and fall back to `Disconnected`.
    async fn abandon<T>(&mut self, context: &str, e: PeerError) -> Result<T, PeerError> {
        self.report(context, &e);
        self.teardown().await;
        self.transition(LifecycleEvent::TransportLost);
        Err(e)
    }
}
