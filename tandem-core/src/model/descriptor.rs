use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    Offer,
    Answer,
}

/// One discovered network path. Field names follow `RTCIceCandidateInit` JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        rename = "sdpMLineIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

/// Everything one side must hand over to the other for a negotiation round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDescriptor {
    pub kind: DescriptorKind,
    pub session_description: String,
    #[serde(default)]
    pub candidates: Vec<CandidateRecord>,
}

impl ConnectionDescriptor {
    pub fn new(kind: DescriptorKind, session_description: impl Into<String>) -> Self {
        Self {
            kind,
            session_description: session_description.into(),
            candidates: Vec::new(),
        }
    }

    pub fn offer(session_description: impl Into<String>) -> Self {
        Self::new(DescriptorKind::Offer, session_description)
    }

    pub fn answer(session_description: impl Into<String>) -> Self {
        Self::new(DescriptorKind::Answer, session_description)
    }

    pub fn with_candidates(mut self, candidates: Vec<CandidateRecord>) -> Self {
        self.candidates = candidates;
        self
    }
}
