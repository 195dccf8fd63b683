use crate::error::PeerError;
use crate::ice::DeliveryStrategy;
use crate::session::event::LinkEvent;
use crate::session::{ConnectionState, LifecycleEvent, RoomSession, Session};
use crate::signaling::{RelayClient, RelayEvent, ShareableDescriptor, package, unpack};
use tandem_core::{ConnectionDescriptor, DescriptorKind, RoomCode, RoomRole};
use tracing::{info, warn};

impl Session {
    pub(super) async fn host_manual(&mut self) -> Result<ShareableDescriptor, PeerError> {
        self.ensure_idle()?;
        self.transition(LifecycleEvent::Host);

        match self.prepare_manual_offer().await {
            Ok(shareable) => {
                self.transition(LifecycleEvent::DescriptorReady);
                Ok(shareable)
            }
            Err(e) => self.abandon("Hosting failed", e).await,
        }
    }

    async fn prepare_manual_offer(&mut self) -> Result<ShareableDescriptor, PeerError> {
        self.open_link(DeliveryStrategy::Bundle, true).await?;
        let link = self.link_mut()?;

        let offer = link.engine.create_offer().await?;
        let candidates = link.ice.gathered().await;
        let sdp = link
            .pc
            .local_description()
            .await
            .map(|desc| desc.sdp)
            .unwrap_or(offer);
        info!("Offer ready with {} candidates", candidates.len());

        let descriptor = ConnectionDescriptor::offer(sdp).with_candidates(candidates);
        Ok(package(&descriptor, &self.config.link_base)?)
    }

    /// A bad answer leaves the host waiting so the user can paste again.
    pub(super) async fn accept_answer(&mut self, input: &str) -> Result<(), PeerError> {
        let state = self.current_state();
        if state != ConnectionState::Waiting {
            return Err(PeerError::Busy(state));
        }
        let link = self.link_mut()?;
        if link.room.is_some() {
            return Err(PeerError::Busy(state));
        }

        let descriptor = unpack(input, DescriptorKind::Answer)?;
        link.engine
            .accept_answer(&descriptor.session_description)
            .await?;

        let mut remote = link.ice.mark_remote_ready();
        remote.extend(descriptor.candidates);
        info!("Answer applied; adding {} remote candidates", remote.len());
        for candidate in remote {
            if let Err(e) = link.engine.apply_candidate(candidate).await {
                warn!("Remote candidate rejected: {}", e);
            }
        }
        Ok(())
    }

    pub(super) async fn host_room(&mut self) -> Result<RoomCode, PeerError> {
        self.ensure_idle()?;
        let client = self.relay_client()?;
        self.transition(LifecycleEvent::Host);

        match self.open_room(client).await {
            Ok(code) => {
                self.transition(LifecycleEvent::DescriptorReady);
                Ok(code)
            }
            Err(e) => self.abandon("Hosting room failed", e).await,
        }
    }

    /// The offer itself is made once the relay reports that a guest joined.
    async fn open_room(&mut self, client: RelayClient) -> Result<RoomCode, PeerError> {
        self.open_link(DeliveryStrategy::Trickle, true).await?;
        let code = client.create_room().await?;
        let sink = self.sink(self.epoch);

        let link = self.link_mut()?;
        link.room = Some(RoomSession {
            client: client.clone(),
            code: code.clone(),
            role: RoomRole::Host,
            stream: None,
        });

        let stream = client
            .subscribe(&code, RoomRole::Host, move |event: RelayEvent| {
                sink.emit(LinkEvent::Relay(event))
            })
            .await?;
        if let Some(room) = link.room.as_mut() {
            room.stream = Some(stream);
        }

        info!("Hosting room {}", code);
        Ok(code)
    }
}
