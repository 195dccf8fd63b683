use crate::channel::{ChannelRole, DataPipe};
use crate::ice::CandidateRoute;
use crate::session::event::LinkEvent;
use crate::session::{ConnectionState, LifecycleEvent, Session, SessionNotice};
use std::sync::Arc;
use tandem_core::{CandidateRecord, ChannelFrame, SignalEnvelope};
use tracing::{debug, info, warn};
use webrtc::data_channel::RTCDataChannel;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

impl Session {
    pub(super) async fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::PeerState(state) => self.on_peer_state(state).await,
            LinkEvent::LocalCandidate(candidate) => self.on_local_candidate(candidate).await,
            LinkEvent::IncomingChannel(role, dc) => self.on_incoming_channel(role, dc).await,
            LinkEvent::ChannelOpened(role) => {
                info!("Data channel `{}` open", role.label());
                if role == ChannelRole::Chat {
                    self.flush_pending_chat().await;
                }
            }
            LinkEvent::ChannelClosed(role) => {
                info!("Data channel `{}` closed", role.label());
            }
            LinkEvent::ChatText(text) => self.on_chat_text(text).await,
            LinkEvent::FileText(text) => self.on_file_text(&text),
            LinkEvent::FileData(data) => self.on_file_data(data),
            LinkEvent::NegotiationNeeded => self.on_negotiation_needed().await,
            LinkEvent::RemoteTrack { id, kind } => {
                info!("Remote {} track {}", kind, id);
                self.notify(SessionNotice::RemoteTrack { id, kind });
            }
            LinkEvent::Relay(event) => self.handle_relay_event(event).await,
            LinkEvent::ChunkSent { id, sent } => self.on_chunk_sent(id, sent),
            LinkEvent::SendFinished { id, result } => self.on_send_finished(id, result),
        }
    }

    async fn on_peer_state(&mut self, state: RTCPeerConnectionState) {
        match state {
            RTCPeerConnectionState::Connected => {
                if !self.transition(LifecycleEvent::TransportConnected) {
                    return;
                }
                // Signaling is done; the room is no longer needed.
                if let Some(room) = self.link.as_mut().and_then(|link| link.room.take()) {
                    room.release();
                }
            }
            RTCPeerConnectionState::Disconnected
            | RTCPeerConnectionState::Failed
            | RTCPeerConnectionState::Closed => {
                warn!("Transport {}; tearing down", state);
                self.teardown().await;
                self.transition(LifecycleEvent::TransportLost);
            }
            _ => debug!("Transport {}", state),
        }
    }

    /// Connected links trickle over chat, room links through the relay.
    /// Manual links already ship their candidates inside the descriptor.
    async fn on_local_candidate(&mut self, candidate: CandidateRecord) {
        let connected = self.current_state() == ConnectionState::Connected;
        let Some(link) = self.link.as_ref() else {
            return;
        };

        match link.ice.route_local(connected) {
            CandidateRoute::Channel => {
                if let Err(e) = self.send_frame(ChannelFrame::Candidate { candidate }).await {
                    warn!("Candidate not delivered: {}", e);
                }
            }
            CandidateRoute::Descriptor => debug!("Candidate kept for the descriptor"),
            CandidateRoute::Relay => {
                let Some(room) = link.room.as_ref() else {
                    debug!("No room left to relay a candidate through");
                    return;
                };
                let client = room.client.clone();
                let code = room.code.clone();
                let role = room.role;
                tokio::spawn(async move {
                    if let Err(e) = client
                        .send(&code, role, &SignalEnvelope::Candidate(candidate))
                        .await
                    {
                        warn!("Candidate not relayed: {}", e);
                    }
                });
            }
        }
    }

    async fn on_incoming_channel(&mut self, role: ChannelRole, dc: Arc<RTCDataChannel>) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        let open = dc.is_open();
        match role {
            ChannelRole::Chat => link.chat = Some(dc),
            ChannelRole::Files => link.files = Some(dc),
        }
        if open && role == ChannelRole::Chat {
            self.flush_pending_chat().await;
        }
    }

    /// Renegotiation on an established link; the first negotiation is driven explicitly.
    async fn on_negotiation_needed(&mut self) {
        if self.current_state() != ConnectionState::Connected {
            debug!("Negotiation needed before connect; handled by the initial exchange");
            return;
        }
        self.renegotiate().await;
    }

    /// Sends a fresh offer over the chat channel, unless one is already waiting for its answer.
    pub(super) async fn renegotiate(&mut self) {
        let Some(link) = self.link.as_mut() else {
            return;
        };

        let offer = link.engine.renegotiate().await;
        let result = match offer {
            Ok(Some(sdp)) => {
                info!("Renegotiating over the chat channel");
                self.send_frame(ChannelFrame::Offer { sdp }).await
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            self.report("Renegotiation failed", &e);
        }
    }
}
