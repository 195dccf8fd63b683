use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Creating,
    Waiting,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Creating => "creating",
            Self::Waiting => "waiting",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        })
    }
}

/// Inputs of the lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// User starts hosting.
    Host,
    /// The local descriptor (or room) is ready and the remote side is awaited.
    DescriptorReady,
    /// User joins, or a remote offer arrives on an idle session.
    Join,
    TransportConnected,
    /// Transport reported disconnected, failed or closed.
    TransportLost,
    UserDisconnect,
}

impl ConnectionState {
    /// `None` means the event does not move the machine from this state.
    pub fn next(self, event: LifecycleEvent) -> Option<Self> {
        use ConnectionState::*;
        use LifecycleEvent::*;

        match (self, event) {
            (_, TransportLost | UserDisconnect) => Some(Disconnected),
            (Disconnected, Host) => Some(Creating),
            (Creating, DescriptorReady) => Some(Waiting),
            (Disconnected, Join) => Some(Connecting),
            (Waiting | Connecting, TransportConnected) => Some(Connected),
            _ => None,
        }
    }
}
