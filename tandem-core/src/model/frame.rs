use crate::model::descriptor::CandidateRecord;
use crate::model::ids::{MessageId, TransferId};
use serde::{Deserialize, Serialize};

/// Frames on the `chat` channel. Every frame carries an explicit `frame` tag so user
/// text can never be mistaken for a renegotiation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum ChannelFrame {
    Text {
        id: MessageId,
        text: String,
        timestamp: u64,
    },
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    Candidate {
        candidate: CandidateRecord,
    },
}

/// Result of reading one chat-channel payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundChat {
    Frame(ChannelFrame),
    /// Payload that is not a tagged frame, kept verbatim as chat text.
    Literal(String),
}

impl ChannelFrame {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> InboundChat {
        match serde_json::from_str::<ChannelFrame>(raw) {
            Ok(frame) => InboundChat::Frame(frame),
            Err(_) => InboundChat::Literal(raw.to_owned()),
        }
    }

    pub fn is_control(&self) -> bool {
        !matches!(self, Self::Text { .. })
    }
}

/// Control frames on the `files` channel. Chunk bytes travel as separate binary messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FileFrame {
    #[serde(rename = "file-meta", rename_all = "camelCase")]
    Meta {
        id: TransferId,
        name: String,
        #[serde(rename = "type")]
        mime_type: String,
        size: u64,
        total_chunks: u32,
    },
    #[serde(rename = "file-chunk", rename_all = "camelCase")]
    Chunk {
        id: TransferId,
        chunk_index: u32,
        total_chunks: u32,
    },
    #[serde(rename = "file-complete")]
    Complete { id: TransferId },
}

impl FileFrame {
    pub fn id(&self) -> TransferId {
        match self {
            Self::Meta { id, .. } | Self::Chunk { id, .. } | Self::Complete { id } => *id,
        }
    }
}
