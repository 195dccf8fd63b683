use crate::model::descriptor::CandidateRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdpPayload {
    pub sdp: String,
}

/// Envelope pushed through a relay room: `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SignalEnvelope {
    PeerJoined,
    Offer(SdpPayload),
    Answer(SdpPayload),
    Candidate(CandidateRecord),
    PeerLeft,
}

impl SignalEnvelope {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self::Offer(SdpPayload { sdp: sdp.into() })
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self::Answer(SdpPayload { sdp: sdp.into() })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PeerJoined => "peer_joined",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Candidate(_) => "candidate",
            Self::PeerLeft => "peer_left",
        }
    }
}
