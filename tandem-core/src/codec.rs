//! Manual signaling: a descriptor becomes a base64url token, optionally wrapped in a link.
//!
//! The token is the whole negotiation state for one round; there is no session id and
//! nothing expires.

use crate::error::{DecodeError, EncodeError};
use crate::model::ConnectionDescriptor;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use url::Url;

/// Query parameter that carries the token in a share link.
pub const LINK_PARAM: &str = "d";

pub fn encode_token(descriptor: &ConnectionDescriptor) -> Result<String, EncodeError> {
    let json = serde_json::to_vec(descriptor)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_token(token: &str) -> Result<ConnectionDescriptor, DecodeError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }
    let json = URL_SAFE_NO_PAD.decode(token)?;
    Ok(serde_json::from_slice(&json)?)
}

pub fn encode_link(base: &str, descriptor: &ConnectionDescriptor) -> Result<Url, EncodeError> {
    let token = encode_token(descriptor)?;
    let mut link = Url::parse(base)?;
    link.query_pairs_mut().append_pair(LINK_PARAM, &token);
    Ok(link)
}

pub fn decode_link(link: &str) -> Result<ConnectionDescriptor, DecodeError> {
    let link = Url::parse(link.trim())?;
    let token = link
        .query_pairs()
        .find(|(key, _)| key == LINK_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or(DecodeError::MissingParam(LINK_PARAM))?;
    decode_token(&token)
}

/// Accepts whatever the user pasted: a bare token or a share link.
pub fn decode_input(input: &str) -> Result<ConnectionDescriptor, DecodeError> {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") {
        decode_link(input)
    } else {
        decode_token(input)
    }
}
