use crate::config::RelayConfig;
use crate::room::{Room, RoomCommand};
use crate::signaling::RelayError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tandem_core::{RoomCode, RoomRole, SignalEnvelope};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Registry of live rooms. Each room runs as its own task; the map only holds senders.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomCode, mpsc::Sender<RoomCommand>>>,
    config: RelayConfig,
}

impl RoomManager {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn create_room(&self) -> RoomCode {
        loop {
            let code = RoomCode::generate();
            let Entry::Vacant(slot) = self.rooms.entry(code.clone()) else {
                continue;
            };

            info!("Creating new room: {}", code);
            let (tx, rx) = mpsc::channel(self.config.command_capacity);
            slot.insert(tx.clone());

            let room = Room::new(code.clone(), rx, self.config.room_ttl);
            let rooms = self.rooms.clone();
            let room_code = code.clone();
            tokio::spawn(async move {
                room.run().await;
                rooms.remove_if(&room_code, |_, sender| sender.same_channel(&tx));
            });
            debug!("{} rooms open", self.room_count());

            return code;
        }
    }

    pub async fn join(&self, code: &RoomCode) -> Result<(), RelayError> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(code, RoomCommand::Join { reply }).await?;
        rx.await.map_err(|_| RelayError::RoomNotFound)?
    }

    pub async fn subscribe(
        &self,
        code: &RoomCode,
        role: RoomRole,
    ) -> Result<mpsc::UnboundedReceiver<SignalEnvelope>, RelayError> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(code, RoomCommand::Subscribe { role, reply })
            .await?;
        rx.await.map_err(|_| RelayError::RoomNotFound)
    }

    pub async fn signal(
        &self,
        code: &RoomCode,
        from: RoomRole,
        envelope: SignalEnvelope,
    ) -> Result<(), RelayError> {
        self.dispatch(code, RoomCommand::Signal { from, envelope })
            .await
    }

    /// Never fails: a room that is already gone has nothing left to leave.
    pub async fn leave(&self, code: &RoomCode, role: RoomRole) {
        if let Err(e) = self.dispatch(code, RoomCommand::Leave { role }).await {
            warn!("Leave for {} in room {} ignored: {}", role, code, e);
        }
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    async fn dispatch(&self, code: &RoomCode, cmd: RoomCommand) -> Result<(), RelayError> {
        let sender = self
            .rooms
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or(RelayError::RoomNotFound)?;

        sender.send(cmd).await.map_err(|_| RelayError::RoomNotFound)
    }
}
