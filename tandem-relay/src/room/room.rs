use crate::room::room_command::RoomCommand;
use crate::signaling::RelayError;
use std::collections::VecDeque;
use std::time::Duration;
use tandem_core::{RoomCode, RoomRole, SignalEnvelope};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Default)]
struct RoleSlot {
    present: bool,
    subscriber: Option<mpsc::UnboundedSender<SignalEnvelope>>,
    backlog: VecDeque<SignalEnvelope>,
}

impl RoleSlot {
    fn deliver(&mut self, envelope: SignalEnvelope) {
        if let Some(tx) = &self.subscriber {
            match tx.send(envelope) {
                Ok(()) => return,
                Err(mpsc::error::SendError(envelope)) => {
                    self.subscriber = None;
                    self.backlog.push_back(envelope);
                }
            }
        } else {
            self.backlog.push_back(envelope);
        }
    }

    fn vacate(&mut self) {
        self.present = false;
        self.subscriber = None;
        self.backlog.clear();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum RoomFlow {
    Continue,
    Close,
}

/// A two-seat rendezvous. The room owns its slots; nobody else touches them.
pub struct Room {
    code: RoomCode,
    host: RoleSlot,
    guest: RoleSlot,
    command_rx: mpsc::Receiver<RoomCommand>,
    expires_at: Instant,
}

impl Room {
    pub fn new(code: RoomCode, command_rx: mpsc::Receiver<RoomCommand>, ttl: Duration) -> Self {
        Self {
            code,
            host: RoleSlot {
                present: true,
                ..RoleSlot::default()
            },
            guest: RoleSlot::default(),
            command_rx,
            expires_at: Instant::now() + ttl,
        }
    }

    pub async fn run(mut self) {
        info!(room = %self.code, "Room event loop started");

        let expiry = tokio::time::sleep_until(self.expires_at);
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => {
                            if self.handle_command(c) == RoomFlow::Close {
                                info!(room = %self.code, "Both peers left. Closing room.");
                                break;
                            }
                        }
                        None => {
                            info!(room = %self.code, "Command channel closed. Shutting down room.");
                            break;
                        }
                    }
                }

                _ = &mut expiry => {
                    info!(room = %self.code, "Room expired");
                    break;
                }
            }
        }

        info!(room = %self.code, "Room event loop finished");
    }

    fn handle_command(&mut self, cmd: RoomCommand) -> RoomFlow {
        match cmd {
            RoomCommand::Join { reply } => {
                let result = if self.guest.present {
                    warn!(room = %self.code, "Join rejected: room is full");
                    Err(RelayError::RoomFull)
                } else {
                    info!(room = %self.code, "Guest joined");
                    self.guest.present = true;
                    self.host.deliver(SignalEnvelope::PeerJoined);
                    Ok(())
                };
                let _ = reply.send(result);
            }

            RoomCommand::Subscribe { role, reply } => {
                let (tx, rx) = mpsc::unbounded_channel();
                let slot = self.slot_mut(role);
                let flushed = slot.backlog.len();
                for envelope in slot.backlog.drain(..) {
                    let _ = tx.send(envelope);
                }
                slot.subscriber = Some(tx);
                debug!(room = %self.code, %role, flushed, "Event stream subscribed");
                let _ = reply.send(rx);
            }

            RoomCommand::Signal { from, envelope } => {
                debug!(room = %self.code, %from, kind = envelope.kind(), "Routing signal");
                self.slot_mut(from.other()).deliver(envelope);
            }

            RoomCommand::Leave { role } => {
                info!(room = %self.code, %role, "Peer left");
                self.slot_mut(role).vacate();

                let other = self.slot_mut(role.other());
                if other.present {
                    other.deliver(SignalEnvelope::PeerLeft);
                }

                if !self.host.present && !self.guest.present {
                    return RoomFlow::Close;
                }
            }
        }

        RoomFlow::Continue
    }

    fn slot_mut(&mut self, role: RoomRole) -> &mut RoleSlot {
        match role {
            RoomRole::Host => &mut self.host,
            RoomRole::Guest => &mut self.guest,
        }
    }
}
