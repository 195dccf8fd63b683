use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0:8787";
pub const DEFAULT_ROOM_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: SocketAddr,
    /// How long a room may live before it is dropped, whatever its occupancy.
    pub room_ttl: Duration,
    pub command_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8787)),
            room_ttl: DEFAULT_ROOM_TTL,
            command_capacity: 100,
        }
    }
}
