pub mod event_reader;
pub mod relay_harness;

pub use event_reader::*;
pub use relay_harness::*;
