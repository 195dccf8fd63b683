//! Chunked file transfer over the `files` channel.

mod book;
mod record;
mod sender;

pub use book::*;
pub use record::*;
pub use sender::*;
