use crate::config::RelayConfig;
use crate::room::RoomManager;
use crate::signaling::RelayError;
use tandem_core::RoomCode;

/// Shared state behind every HTTP handler.
#[derive(Clone)]
pub struct RelayService {
    pub(crate) rooms: RoomManager,
}

impl RelayService {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            rooms: RoomManager::new(config),
        }
    }

    /// Path segments are user input; anything that is not a well-formed code names no room.
    pub(crate) fn resolve(&self, raw: &str) -> Result<RoomCode, RelayError> {
        RoomCode::parse(raw).map_err(|_| RelayError::RoomNotFound)
    }
}
