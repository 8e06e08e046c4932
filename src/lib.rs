#[macro_use]
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate thiserror;

mod error;
mod key;
mod node;
mod protocol;
mod routing;
mod storage;

pub use self::error::{Error, Result};
pub use self::key::{bucket, hash};
pub use self::node::node_data::NodeData;
pub use self::node::Node;
pub use self::protocol::{Action, Message};
pub use self::routing::RoutingTable;
pub use self::storage::linked::LinkedTable;
pub use self::storage::open::OpenTable;
pub use self::storage::{HashTable, StorageKind};

/// The maximum length of a message in bytes. Anything longer is truncated by the receiver.
const MESSAGE_LENGTH: usize = 1024;

/// The routing table a node loads when no other path is given.
pub const DEFAULT_ROUTING_TABLE: &str = "./routing_table.in";
