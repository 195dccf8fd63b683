use crate::error::PeerError;
use crate::media::MediaSource;
use crate::session::SessionSnapshot;
use crate::signaling::ShareableDescriptor;
use bytes::Bytes;
use std::sync::Arc;
use tandem_core::{RoomCode, TransferId};
use tokio::sync::oneshot;

type Reply<T> = oneshot::Sender<Result<T, PeerError>>;

pub(crate) enum SessionCommand {
    HostManual {
        reply: Reply<ShareableDescriptor>,
    },
    AcceptAnswer {
        input: String,
        reply: Reply<()>,
    },
    JoinManual {
        input: String,
        reply: Reply<ShareableDescriptor>,
    },
    HostRoom {
        reply: Reply<RoomCode>,
    },
    JoinRoom {
        code: String,
        reply: Reply<()>,
    },
    SendChat {
        text: String,
        reply: Reply<()>,
    },
    SendFile {
        name: String,
        mime_type: String,
        data: Bytes,
        reply: Reply<TransferId>,
    },
    AttachMedia {
        source: Arc<dyn MediaSource>,
        reply: Reply<()>,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
    StartNewSession {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}
