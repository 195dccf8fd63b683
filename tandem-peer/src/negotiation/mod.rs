mod engine;
mod perfect;
mod target;

pub use engine::*;
pub use perfect::*;
pub use target::*;
