use crate::error::DescriptionError;
use async_trait::async_trait;
use tandem_core::{CandidateRecord, DescriptorKind};
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::signaling_state::RTCSignalingState;

/// The slice of a peer connection the negotiation engine drives.
#[async_trait]
pub trait NegotiationTarget: Send + Sync {
    fn is_stable(&self) -> bool;

    fn is_closed(&self) -> bool;

    /// Creates an offer, installs it as the local description and returns its SDP.
    async fn make_offer(&self) -> Result<String, DescriptionError>;

    /// Creates an offer without installing it; signaling stays stable until `install_offer`.
    async fn draft_offer(&self) -> Result<String, DescriptionError>;

    /// Installs the most recent draft as the local description.
    async fn install_offer(&self, sdp: &str) -> Result<(), DescriptionError>;

    /// Creates an answer, installs it as the local description and returns its SDP.
    async fn make_answer(&self) -> Result<String, DescriptionError>;

    async fn apply_remote(&self, kind: DescriptorKind, sdp: &str) -> Result<(), DescriptionError>;

    async fn add_remote_candidate(&self, candidate: CandidateRecord)
    -> Result<(), DescriptionError>;
}

fn map_rtc_error(e: webrtc::Error) -> DescriptionError {
    match e {
        webrtc::Error::ErrConnectionClosed => DescriptionError::InvalidState(e.to_string()),
        other => DescriptionError::InvalidDescription(other.to_string()),
    }
}

fn ensure_open(pc: &RTCPeerConnection) -> Result<(), DescriptionError> {
    if NegotiationTarget::is_closed(pc) {
        Err(DescriptionError::InvalidState("connection is closed".into()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl NegotiationTarget for RTCPeerConnection {
    fn is_stable(&self) -> bool {
        self.signaling_state() == RTCSignalingState::Stable
    }

    fn is_closed(&self) -> bool {
        self.connection_state() == RTCPeerConnectionState::Closed
    }

    async fn make_offer(&self) -> Result<String, DescriptionError> {
        ensure_open(self)?;
        let offer = self.create_offer(None).await.map_err(map_rtc_error)?;
        let sdp = offer.sdp.clone();
        self.set_local_description(offer)
            .await
            .map_err(map_rtc_error)?;
        Ok(self
            .local_description()
            .await
            .map(|desc| desc.sdp)
            .unwrap_or(sdp))
    }

    async fn draft_offer(&self) -> Result<String, DescriptionError> {
        ensure_open(self)?;
        let offer = self.create_offer(None).await.map_err(map_rtc_error)?;
        Ok(offer.sdp)
    }

    async fn install_offer(&self, sdp: &str) -> Result<(), DescriptionError> {
        ensure_open(self)?;
        let offer = RTCSessionDescription::offer(sdp.to_owned())
            .map_err(|e| DescriptionError::InvalidDescription(e.to_string()))?;
        self.set_local_description(offer)
            .await
            .map_err(map_rtc_error)
    }

    async fn make_answer(&self) -> Result<String, DescriptionError> {
        ensure_open(self)?;
        let answer = self.create_answer(None).await.map_err(map_rtc_error)?;
        let sdp = answer.sdp.clone();
        self.set_local_description(answer)
            .await
            .map_err(map_rtc_error)?;
        Ok(self
            .local_description()
            .await
            .map(|desc| desc.sdp)
            .unwrap_or(sdp))
    }

    async fn apply_remote(&self, kind: DescriptorKind, sdp: &str) -> Result<(), DescriptionError> {
        ensure_open(self)?;
        let description = match kind {
            DescriptorKind::Offer => RTCSessionDescription::offer(sdp.to_owned()),
            DescriptorKind::Answer => RTCSessionDescription::answer(sdp.to_owned()),
        }
        .map_err(|e| DescriptionError::InvalidDescription(e.to_string()))?;

        self.set_remote_description(description)
            .await
            .map_err(map_rtc_error)
    }

    async fn add_remote_candidate(
        &self,
        candidate: CandidateRecord,
    ) -> Result<(), DescriptionError> {
        ensure_open(self)?;
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.add_ice_candidate(init).await.map_err(map_rtc_error)
    }
}
