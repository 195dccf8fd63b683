//! Integration tests for tandem-relay over real HTTP.
//!
//! - `room_tests` - creating, joining and leaving rooms
//! - `signal_tests` - event streams and envelope routing

pub mod room_tests;
pub mod signal_tests;

use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}
