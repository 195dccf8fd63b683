use tandem_core::{CandidateRecord, RoomRole, SignalEnvelope};

/// What a peer does with an envelope pushed by the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayReaction {
    SendOffer,
    AnswerOffer(String),
    ApplyAnswer(String),
    ApplyCandidate(CandidateRecord),
    PeerLeft,
    Nothing,
}

pub fn react(role: RoomRole, envelope: SignalEnvelope) -> RelayReaction {
    match (role, envelope) {
        (RoomRole::Host, SignalEnvelope::PeerJoined) => RelayReaction::SendOffer,
        (RoomRole::Guest, SignalEnvelope::Offer(payload)) => RelayReaction::AnswerOffer(payload.sdp),
        (RoomRole::Host, SignalEnvelope::Answer(payload)) => RelayReaction::ApplyAnswer(payload.sdp),
        (_, SignalEnvelope::Candidate(candidate)) => RelayReaction::ApplyCandidate(candidate),
        (_, SignalEnvelope::PeerLeft) => RelayReaction::PeerLeft,
        _ => RelayReaction::Nothing,
    }
}
