use crate::channel::ChannelRole;
use crate::error::TransferError;
use crate::history::ChatMessage;
use crate::signaling::RelayEvent;
use crate::transfer::{TransferDirection, TransferStatus};
use bytes::Bytes;
use std::sync::Arc;
use tandem_core::{CandidateRecord, TransferId};
use tokio::sync::mpsc;
use webrtc::data_channel::RTCDataChannel;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Raised by connection callbacks, relay streams and transfer workers; handled by the session loop.
pub(crate) enum LinkEvent {
    PeerState(RTCPeerConnectionState),
    LocalCandidate(CandidateRecord),
    IncomingChannel(ChannelRole, Arc<RTCDataChannel>),
    ChannelOpened(ChannelRole),
    ChannelClosed(ChannelRole),
    ChatText(String),
    FileText(String),
    FileData(Bytes),
    NegotiationNeeded,
    RemoteTrack { id: String, kind: String },
    Relay(RelayEvent),
    ChunkSent { id: TransferId, sent: u32 },
    SendFinished {
        id: TransferId,
        result: Result<(), TransferError>,
    },
}

pub(crate) struct Tagged {
    pub epoch: u64,
    pub event: LinkEvent,
}

/// Stamps events with the epoch of the link that produced them.
#[derive(Clone)]
pub(crate) struct EventSink {
    epoch: u64,
    tx: mpsc::UnboundedSender<Tagged>,
}

impl EventSink {
    pub fn new(epoch: u64, tx: mpsc::UnboundedSender<Tagged>) -> Self {
        Self { epoch, tx }
    }

    pub fn emit(&self, event: LinkEvent) {
        let _ = self.tx.send(Tagged {
            epoch: self.epoch,
            event,
        });
    }
}

/// Things the user interface may want to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    ChatReceived(ChatMessage),
    TransferUpdated {
        id: TransferId,
        direction: TransferDirection,
        status: TransferStatus,
        progress: u8,
    },
    RemoteTrack {
        id: String,
        kind: String,
    },
    PeerJoined,
    PeerLeft,
    Error(String),
}
