mod descriptor;
mod frame;
mod ids;
mod room;
mod signaling;

pub use descriptor::{CandidateRecord, ConnectionDescriptor, DescriptorKind};
pub use frame::{ChannelFrame, FileFrame, InboundChat};
pub use ids::{MessageId, TransferId};
pub use room::{
    ConnectedAck, CreateRoomResponse, ErrorBody, JoinRoomResponse, ROOM_CODE_LEN, RoleQuery,
    RoomCode, RoomRole,
};
pub use signaling::{IceServerConfig, SdpPayload, SignalEnvelope};
