//! Peer side of tandem: negotiates one direct connection, by hand-carried token or
//! through a relay room, and then carries chat, files and media over it.

mod channel;
mod config;
mod error;
mod history;
mod ice;
mod media;
mod negotiation;
mod session;
mod signaling;
mod transfer;

pub use channel::*;
pub use config::*;
pub use error::*;
pub use history::*;
pub use ice::*;
pub use media::*;
pub use negotiation::*;
pub use session::*;
pub use signaling::*;
pub use transfer::*;
