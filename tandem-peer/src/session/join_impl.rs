use crate::error::{PeerError, SignalingError};
use crate::ice::DeliveryStrategy;
use crate::session::event::LinkEvent;
use crate::session::{LifecycleEvent, RoomSession, Session};
use crate::signaling::{RelayClient, RelayEvent, ShareableDescriptor, package, unpack};
use tandem_core::{ConnectionDescriptor, DescriptorKind, RoomCode, RoomRole};
use tracing::{info, warn};

impl Session {
    /// The offer is decoded before anything is created, so garbage input leaves the session idle.
    pub(super) async fn join_manual(&mut self, input: &str) -> Result<ShareableDescriptor, PeerError> {
        self.ensure_idle()?;
        let offer = unpack(input, DescriptorKind::Offer)?;
        self.transition(LifecycleEvent::Join);

        match self.answer_manual_offer(offer).await {
            Ok(shareable) => Ok(shareable),
            Err(e) => self.abandon("Joining failed", e).await,
        }
    }

    async fn answer_manual_offer(
        &mut self,
        offer: ConnectionDescriptor,
    ) -> Result<ShareableDescriptor, PeerError> {
        self.open_link(DeliveryStrategy::Bundle, false).await?;
        let link = self.link_mut()?;

        let answer = link
            .engine
            .accept_offer(&offer.session_description)
            .await?;

        let mut remote = link.ice.mark_remote_ready();
        remote.extend(offer.candidates);
        for candidate in remote {
            if let Err(e) = link.engine.apply_candidate(candidate).await {
                warn!("Remote candidate rejected: {}", e);
            }
        }

        let candidates = link.ice.gathered().await;
        let sdp = link
            .pc
            .local_description()
            .await
            .map(|desc| desc.sdp)
            .unwrap_or(answer);
        info!("Answer ready with {} candidates", candidates.len());

        let descriptor = ConnectionDescriptor::answer(sdp).with_candidates(candidates);
        Ok(package(&descriptor, &self.config.link_base)?)
    }

    pub(super) async fn join_room(&mut self, raw_code: &str) -> Result<(), PeerError> {
        self.ensure_idle()?;
        let code = RoomCode::parse(raw_code).map_err(|e| {
            warn!("Rejecting room code {:?}: {}", raw_code, e);
            SignalingError::RoomNotFound
        })?;
        let client = self.relay_client()?;
        self.transition(LifecycleEvent::Join);

        match self.enter_room(client, code).await {
            Ok(()) => Ok(()),
            Err(e) => self.abandon("Joining room failed", e).await,
        }
    }

    /// The guest only listens; the host's offer arrives through the event stream.
    async fn enter_room(&mut self, client: RelayClient, code: RoomCode) -> Result<(), PeerError> {
        client.join_room(&code).await?;
        self.open_link(DeliveryStrategy::Trickle, false).await?;
        let sink = self.sink(self.epoch);

        let link = self.link_mut()?;
        link.room = Some(RoomSession {
            client: client.clone(),
            code: code.clone(),
            role: RoomRole::Guest,
            stream: None,
        });

        let stream = client
            .subscribe(&code, RoomRole::Guest, move |event: RelayEvent| {
                sink.emit(LinkEvent::Relay(event))
            })
            .await?;
        if let Some(room) = link.room.as_mut() {
            room.stream = Some(stream);
        }

        info!("Joined room {}", code);
        Ok(())
    }
}
