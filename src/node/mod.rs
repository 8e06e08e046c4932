pub mod node_data;

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::key;
use crate::node::node_data::NodeData;
use crate::protocol::{Action, Message};
use crate::routing::RoutingTable;
use crate::storage::{HashTable, StorageKind};

/// A node of the distributed hash table.
///
/// A node stores the keys whose bucket falls in its own range and forwards every other request to
/// the node owning the bucket. A single lock serializes all requests, including the round trip of a
/// forwarded one, so a node serves one request at a time even though every connection gets its
/// own thread.
#[derive(Clone)]
pub struct Node {
    node_data: Arc<NodeData>,
    routing_table: Arc<RoutingTable>,
    storage: Arc<Mutex<Box<dyn HashTable>>>,
    request_handler: Arc<Mutex<Option<JoinHandle<()>>>>,
    is_active: Arc<AtomicBool>,
}

impl Node {
    /// Constructs the node with id `id` from `routing_table` and starts listening on the address
    /// the table assigns to it.
    pub fn new(id: u64, routing_table: RoutingTable, storage_kind: StorageKind) -> Result<Self> {
        let addr = match routing_table.get(id) {
            Some(node_data) => node_data.addr.clone(),
            None => return Err(Error::ConfigLoad(format!("node {} is not in the routing table", id))),
        };
        let listener = TcpListener::bind(&addr).map_err(|source| Error::Connection { addr, source })?;
        Node::with_listener(id, routing_table, storage_kind, listener)
    }

    /// Constructs the node with id `id` on an already bound `listener`. The node's address becomes
    /// the listener's local address.
    pub fn with_listener(
        id: u64,
        routing_table: RoutingTable,
        storage_kind: StorageKind,
        listener: TcpListener,
    ) -> Result<Self> {
        if routing_table.size() == 0 {
            return Err(Error::ConfigLoad("table size must be positive".to_string()));
        }
        let mut node_data = match routing_table.get(id) {
            Some(node_data) => node_data.clone(),
            None => return Err(Error::ConfigLoad(format!("node {} is not in the routing table", id))),
        };
        node_data.addr = listener.local_addr()?.to_string();

        // probing stops at the end of the local range while the table spans every bucket
        let storage = storage_kind.build(routing_table.size(), node_data.range_end);

        let node = Node {
            node_data: Arc::new(node_data),
            routing_table: Arc::new(routing_table),
            storage: Arc::new(Mutex::new(storage)),
            request_handler: Arc::new(Mutex::new(None)),
            is_active: Arc::new(AtomicBool::new(true)),
        };

        let handle = node.start_request_handler(listener);
        *node.lock_request_handler() = Some(handle);
        info!(
            "{} - Started node {} owning [{}, {}] with {} storage",
            node.node_data.addr,
            node.node_data.id,
            node.node_data.range_start,
            node.node_data.range_end,
            storage_kind,
        );
        Ok(node)
    }

    /// Starts a thread that accepts connections and spawns one thread per connection.
    fn start_request_handler(&self, listener: TcpListener) -> JoinHandle<()> {
        let node = self.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                if !node.is_active.load(Ordering::Acquire) {
                    break;
                }
                match stream {
                    Ok(stream) => {
                        let node = node.clone();
                        thread::spawn(move || node.handle_connection(stream));
                    },
                    Err(err) => warn!("{} - Unable to accept connection: {}", node.node_data.addr, err),
                }
            }
            info!("{} - Killed request handler", node.node_data.addr);
        })
    }

    /// Serves a single request on `stream`. The connection is closed once the response is written.
    fn handle_connection(&self, mut stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown peer".to_string());

        let request = match Message::receive(&mut stream) {
            Ok(request) => request,
            Err(err) => {
                warn!("{} - Unable to receive message from {}: {}", self.node_data.addr, peer, err);
                return;
            },
        };
        info!("{} - Receiving request from {} {:?}", self.node_data.addr, peer, request);

        let response = self.handle(&request);
        if let Err(err) = response.send(&mut stream) {
            warn!("{} - Unable to send response to {}: {}", self.node_data.addr, peer, err);
        }
    }

    /// Dispatches `request` by its action. `Error` and `Ack` requests are not dispatched and get
    /// the zero-valued message back.
    pub fn handle(&self, request: &Message) -> Message {
        match request.action {
            Action::Insert => self.insert(request),
            Action::Query => self.query(request),
            Action::Remove => self.remove(request),
            Action::Error | Action::Ack => {
                debug!("{} - Ignoring {:?} request", self.node_data.addr, request.action);
                Message::default()
            },
        }
    }

    /// Stores the request's key and value if the key's bucket is local, otherwise redirects.
    pub fn insert(&self, request: &Message) -> Message {
        let mut storage = self.lock_storage();
        let bucket = self.bucket(&request.key);
        if !self.node_data.contains(bucket) {
            return self.forward(request, bucket);
        }

        match storage.insert(&request.key, &request.value) {
            Ok(()) => Message::ack(&request.key, &request.value),
            Err(err) => self.fail(err),
        }
    }

    /// Looks up the request's key if its bucket is local, otherwise redirects.
    pub fn query(&self, request: &Message) -> Message {
        let storage = self.lock_storage();
        let bucket = self.bucket(&request.key);
        if !self.node_data.contains(bucket) {
            return self.forward(request, bucket);
        }

        match storage.search(&request.key) {
            Ok(value) => Message::ack(&request.key, &value),
            Err(err) => self.fail(err),
        }
    }

    /// Deletes the request's key if its bucket is local, otherwise redirects.
    pub fn remove(&self, request: &Message) -> Message {
        let mut storage = self.lock_storage();
        let bucket = self.bucket(&request.key);
        if !self.node_data.contains(bucket) {
            return self.forward(request, bucket);
        }

        match storage.delete(&request.key) {
            Ok(()) => Message::ack(&request.key, ""),
            Err(err) => self.fail(err),
        }
    }

    /// Forwards `request` to the node owning its key's bucket and returns that node's response.
    pub fn redirect(&self, request: &Message) -> Message {
        let _storage = self.lock_storage();
        let bucket = self.bucket(&request.key);
        self.forward(request, bucket)
    }

    /// Sends `request` to the first node in the routing table whose range contains `bucket`. Must
    /// be called with the storage lock held.
    ///
    /// A node that cannot be reached ends the redirect, while a node that accepts the connection
    /// but sends no valid response is skipped in favor of the next candidate.
    fn forward(&self, request: &Message, bucket: usize) -> Message {
        for dest in self.routing_table.owners(bucket) {
            if dest.id == self.node_data.id {
                warn!("{} - Not redirecting bucket {} to self", self.node_data.addr, bucket);
                continue;
            }

            info!(
                "{} - Redirecting {:?} for bucket {} to {:?}",
                self.node_data.addr, request.action, bucket, dest
            );
            let mut stream = match TcpStream::connect(&dest.addr) {
                Ok(stream) => stream,
                Err(source) => {
                    return self.fail(Error::Connection {
                        addr: dest.addr.clone(),
                        source,
                    })
                },
            };

            if let Err(err) = request.send(&mut stream) {
                warn!("{} - Unable to redirect to {}: {}", self.node_data.addr, dest.addr, err);
                continue;
            }
            match Message::receive(&mut stream) {
                Ok(response) => return response,
                Err(err) => {
                    warn!("{} - No response from {}: {}", self.node_data.addr, dest.addr, err)
                },
            }
        }

        warn!("{} - No node owns bucket {}", self.node_data.addr, bucket);
        Message::default()
    }

    fn fail(&self, err: Error) -> Message {
        warn!("{} - {}", self.node_data.addr, err);
        Message::default()
    }

    fn bucket(&self, key: &str) -> usize {
        key::bucket(key, self.routing_table.size())
    }

    fn lock_storage(&self) -> MutexGuard<Box<dyn HashTable>> {
        match self.storage.lock() {
            Ok(storage) => storage,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_request_handler(&self) -> MutexGuard<Option<JoinHandle<()>>> {
        match self.request_handler.lock() {
            Ok(handle) => handle,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Returns the `NodeData` associated with the node.
    pub fn node_data(&self) -> NodeData {
        (*self.node_data).clone()
    }

    /// Stops accepting connections. Requests already being served run to completion.
    pub fn kill(&self) {
        self.is_active.store(false, Ordering::Release);
        // wake the request handler blocked in accept
        if let Err(err) = TcpStream::connect(&self.node_data.addr) {
            warn!("{} - Unable to wake request handler: {}", self.node_data.addr, err);
        }
    }

    /// Blocks until the request handler exits, which only happens after `kill`.
    pub fn join(&self) {
        let handle = self.lock_request_handler().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("{} - Request handler panicked", self.node_data.addr);
            }
        }
    }
}
