pub mod lan;
pub mod local_relay;
pub mod waits;
