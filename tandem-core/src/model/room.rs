use crate::error::RoomCodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const ROOM_CODE_LEN: usize = 6;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Bytes at or above this are redrawn so every symbol is equally likely.
const UNBIASED_LIMIT: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

/// UUID v4 bytes that hold the version and variant bits.
const FIXED_UUID_BYTES: [usize; 2] = [6, 8];

/// Short, human-copyable identifier of a relay room, e.g. `AB12C3`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    pub fn generate() -> Self {
        let random = std::iter::repeat_with(|| Uuid::new_v4().into_bytes()).flat_map(|bytes| {
            bytes
                .into_iter()
                .enumerate()
                .filter(|(index, _)| !FIXED_UUID_BYTES.contains(index))
                .map(|(_, byte)| byte)
        });
        Self(encode_unbiased(random))
    }

    /// Accepts user input in any case and with surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, RoomCodeError> {
        let code = raw.trim().to_ascii_uppercase();
        let actual = code.chars().count();
        if actual != ROOM_CODE_LEN {
            return Err(RoomCodeError::Length {
                expected: ROOM_CODE_LEN,
                actual,
            });
        }
        if let Some(bad) = code.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(RoomCodeError::Character(bad));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn encode_unbiased(bytes: impl Iterator<Item = u8>) -> String {
    bytes
        .filter(|b| *b < UNBIASED_LIMIT)
        .take(ROOM_CODE_LEN)
        .map(|b| ALPHABET[b as usize % ALPHABET.len()] as char)
        .collect()
}

impl FromStr for RoomCode {
    type Err = RoomCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = RoomCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side of a room a peer occupies. The host created the room and makes the offer.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomRole {
    Host,
    Guest,
}

impl RoomRole {
    pub fn other(self) -> Self {
        match self {
            Self::Host => Self::Guest,
            Self::Guest => Self::Host,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Guest => "guest",
        }
    }
}

impl fmt::Display for RoomRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room: RoomCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub room: RoomCode,
}

/// Query string carried by every role-tagged relay request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleQuery {
    pub role: RoomRole,
}

/// Data of the named `connected` event that opens every relay event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedAck {
    pub role: RoomRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
