use crate::signaling::RelayError;
use tandem_core::{RoomRole, SignalEnvelope};
use tokio::sync::{mpsc, oneshot};

/// Commands delivered to a room actor by the HTTP layer.
#[derive(Debug)]
pub enum RoomCommand {
    /// A second peer asks to take the guest slot.
    Join {
        reply: oneshot::Sender<Result<(), RelayError>>,
    },

    /// Open (or replace) the push stream of one role; queued envelopes are flushed into it.
    Subscribe {
        role: RoomRole,
        reply: oneshot::Sender<mpsc::UnboundedReceiver<SignalEnvelope>>,
    },

    /// Route an envelope to the role opposite to `from`.
    Signal {
        from: RoomRole,
        envelope: SignalEnvelope,
    },

    /// The role is gone; the other side learns about it through `peer_left`.
    Leave { role: RoomRole },
}
