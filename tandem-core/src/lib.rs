pub mod codec;
pub mod error;
pub mod model;

pub use codec::{decode_input, decode_link, decode_token, encode_link, encode_token, LINK_PARAM};
pub use error::{DecodeError, EncodeError, RoomCodeError};
pub use model::*;
