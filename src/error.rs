use std::io;
use thiserror::Error;

/// A `Result` carrying the crate's `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the storage backends, the routing table loader and the wire protocol.
///
/// None of these cross the wire: a node collapses every per-request failure into the
/// zero-valued `Message`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to load routing table: {0}.")]
    ConfigLoad(String),
    #[error("Key {0:?} is already stored.")]
    DuplicateKey(String),
    #[error("No free slot left for key {0:?}.")]
    TableFull(String),
    #[error("Key {0:?} not found.")]
    NotFound(String),
    #[error("Connection with {addr} failed: {source}.")]
    Connection {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("Unable to decode message: {0}.")]
    Decode(#[source] serde_json::Error),
    #[error("Unable to encode message: {0}.")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
