#[macro_use]
extern crate log;
extern crate clap;
extern crate range_dht;
extern crate simplelog;

use clap::Parser;
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};
use std::process;

use range_dht::{Node, RoutingTable, StorageKind, DEFAULT_ROUTING_TABLE};

/// A node of a range-partitioned distributed hash table.
#[derive(Parser)]
#[command(name = "range-dht")]
struct Cli {
    /// Id of this node in the routing table
    #[arg(short, long)]
    id: u64,

    /// Path to the routing table
    #[arg(short, long, default_value = DEFAULT_ROUTING_TABLE)]
    routing_table: String,

    /// Storage backend: `open` or `linked`
    #[arg(short, long, default_value_t = StorageKind::Open)]
    storage: StorageKind,

    /// Log level
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = CombinedLogger::init(vec![TermLogger::new(
        cli.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]) {
        eprintln!("Unable to initialize logger: {}", err);
    }

    let routing_table = match RoutingTable::load(&cli.routing_table) {
        Ok(routing_table) => routing_table,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        },
    };

    let node = match Node::new(cli.id, routing_table, cli.storage) {
        Ok(node) => node,
        Err(err) => {
            error!("Unable to start node {}: {}", cli.id, err);
            process::exit(1);
        },
    };

    // runs until the process is interrupted or terminated
    node.join();
}
