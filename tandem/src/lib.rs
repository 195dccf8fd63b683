pub use tandem_core::model::{RoomCode, RoomRole};

pub mod model {
    pub use tandem_core::model::*;
}

pub mod codec {
    pub use tandem_core::codec::*;
    pub use tandem_core::error::*;
}

#[cfg(feature = "peer")]
pub mod peer {
    pub use tandem_peer::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use tandem_relay::*;
}
