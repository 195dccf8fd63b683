use crate::error::PeerError;
use crate::session::{ConnectionState, PeerLink, Session, SessionNotice};
use crate::signaling::{RelayEvent, RelayReaction, react};
use tandem_core::{CandidateRecord, SignalEnvelope};
use tracing::{debug, info, warn};

impl Session {
    pub(super) async fn handle_relay_event(&mut self, event: RelayEvent) {
        let Some(role) = self
            .link
            .as_ref()
            .and_then(|link| link.room.as_ref())
            .map(|room| room.role)
        else {
            debug!("Relay event with no room attached: {:?}", event);
            return;
        };

        let envelope = match event {
            RelayEvent::Connected(role) => {
                debug!("Relay stream open as {}", role);
                return;
            }
            RelayEvent::Closed => {
                if self.current_state() != ConnectionState::Connected {
                    warn!("Relay stream closed before the peers connected");
                }
                if let Some(room) = self.link.as_mut().and_then(|link| link.room.as_mut()) {
                    room.stream = None;
                }
                return;
            }
            RelayEvent::Envelope(envelope) => envelope,
        };

        let result = match react(role, envelope) {
            RelayReaction::SendOffer => {
                self.notify(SessionNotice::PeerJoined);
                self.offer_through_relay().await
            }
            RelayReaction::AnswerOffer(sdp) => self.answer_through_relay(&sdp).await,
            RelayReaction::ApplyAnswer(sdp) => self.apply_relayed_answer(&sdp).await,
            RelayReaction::ApplyCandidate(candidate) => {
                self.apply_relayed_candidate(candidate).await;
                Ok(())
            }
            RelayReaction::PeerLeft => {
                info!("Peer left the room");
                self.notify(SessionNotice::PeerLeft);
                Ok(())
            }
            RelayReaction::Nothing => Ok(()),
        };

        if let Err(e) = result {
            let _ = self.abandon::<()>("Relay negotiation failed", e).await;
        }
    }

    async fn offer_through_relay(&mut self) -> Result<(), PeerError> {
        let link = self.link_mut()?;
        let sdp = link.engine.create_offer().await?;
        Self::relay_send(link, SignalEnvelope::offer(sdp)).await
    }

    async fn answer_through_relay(&mut self, offer: &str) -> Result<(), PeerError> {
        let link = self.link_mut()?;
        let answer = link.engine.accept_offer(offer).await?;
        Self::relay_send(link, SignalEnvelope::answer(answer)).await?;
        self.release_remote_candidates().await;
        Ok(())
    }

    async fn apply_relayed_answer(&mut self, answer: &str) -> Result<(), PeerError> {
        let link = self.link_mut()?;
        link.engine.accept_answer(answer).await?;
        self.release_remote_candidates().await;
        Ok(())
    }

    async fn apply_relayed_candidate(&mut self, candidate: CandidateRecord) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        if let Some(candidate) = link.ice.accept_remote(candidate) {
            if let Err(e) = link.engine.apply_candidate(candidate).await {
                warn!("Remote candidate rejected: {}", e);
            }
        }
    }

    /// Candidates that raced ahead of the remote description.
    async fn release_remote_candidates(&mut self) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        for candidate in link.ice.mark_remote_ready() {
            if let Err(e) = link.engine.apply_candidate(candidate).await {
                warn!("Buffered candidate rejected: {}", e);
            }
        }
    }

    async fn relay_send(
        link: &PeerLink,
        envelope: SignalEnvelope,
    ) -> Result<(), PeerError> {
        let Some(room) = link.room.as_ref() else {
            return Err(PeerError::Setup("room already released".into()));
        };
        room.client.send(&room.code, room.role, &envelope).await?;
        Ok(())
    }
}
