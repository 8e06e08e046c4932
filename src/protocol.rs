use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::result::Result as StdResult;

use crate::error::{Error, Result};
use crate::MESSAGE_LENGTH;

/// The action a `Message` requests or reports. Serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Error = 0,
    Insert = 1,
    Remove = 2,
    Query = 3,
    Ack = 4,
}

impl Action {
    /// Returns the action with wire code `code`.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Action::Error),
            1 => Some(Action::Insert),
            2 => Some(Action::Remove),
            3 => Some(Action::Query),
            4 => Some(Action::Ack),
            _ => None,
        }
    }

    /// Returns the wire code of the action.
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::Error
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> StdResult<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> StdResult<Self, D::Error> {
        let code = u32::deserialize(deserializer)?;
        Action::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("unknown action code {}", code)))
    }
}

/// The request and response envelope exchanged between clients and nodes.
///
/// The zero-valued `Message` (action `Error`, empty key and value) is what a node answers with on
/// any failure. It carries no error code, so a missing key and an unreachable peer look the same.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub action: Action,
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Message {
    pub fn new(action: Action, key: &str, value: &str) -> Self {
        Message {
            action,
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Constructs an `Ack` for `key` carrying `value`.
    pub fn ack(key: &str, value: &str) -> Self {
        Message::new(Action::Ack, key, value)
    }

    /// Returns `true` if this is the zero-valued error message.
    pub fn is_error(&self) -> bool {
        self.action == Action::Error
    }

    /// Serializes the message.
    pub fn pack(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Error::Encode)
    }

    /// Deserializes a message from `buffer`.
    pub fn unpack(buffer: &[u8]) -> Result<Self> {
        serde_json::from_slice(buffer).map_err(Error::Decode)
    }

    /// Writes the whole encoded message to `stream` in one call.
    pub fn send<W: Write>(&self, stream: &mut W) -> Result<()> {
        let payload = self.pack()?;
        stream.write_all(&payload)?;
        stream.flush()?;
        Ok(())
    }

    /// Performs one bounded read from `stream` and decodes exactly the bytes read. A message longer
    /// than `MESSAGE_LENGTH` is truncated and fails to decode.
    pub fn receive<R: Read>(stream: &mut R) -> Result<Self> {
        let mut buffer = [0u8; MESSAGE_LENGTH];
        let len = stream.read(&mut buffer)?;
        Message::unpack(&buffer[..len])
    }

    /// Opens a connection to `addr`, sends the message and waits for the reply.
    pub fn exchange(&self, addr: &str) -> Result<Message> {
        let mut stream = TcpStream::connect(addr).map_err(|source| Error::Connection {
            addr: addr.to_string(),
            source,
        })?;
        self.send(&mut stream)?;
        Message::receive(&mut stream)
    }
}
