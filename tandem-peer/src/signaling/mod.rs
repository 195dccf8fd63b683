mod manual;
mod reaction;
mod relay_client;

pub use manual::*;
pub use reaction::*;
pub use relay_client::*;
