extern crate range_dht;

use range_dht::{Action, Message, Node, RoutingTable, StorageKind};

fn main() {
    let routing_table: RoutingTable = "100\n0 127.0.0.1:8900 0 49\n1 127.0.0.1:8901 50 99\n"
        .parse()
        .unwrap();
    let a = Node::new(0, routing_table.clone(), StorageKind::Open).unwrap();
    let b = Node::new(1, routing_table, StorageKind::Open).unwrap();

    // "alice" hashes to bucket 10, so node 0 stores it
    let insert = Message::new(Action::Insert, "alice", "in wonderland");
    assert_eq!(insert.exchange("127.0.0.1:8900").unwrap().action, Action::Ack);

    // node 1 redirects the query to node 0
    let query = Message::new(Action::Query, "alice", "");
    assert_eq!(query.exchange("127.0.0.1:8901").unwrap().value, "in wonderland");

    a.kill();
    b.kill();
    a.join();
    b.join();
}
