use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::node::node_data::NodeData;

/// Control characters stripped from each line of a routing source.
const CONTROL_CHARS: &[char] = &['\r', '\x07', '\x08'];

/// A node's static routing table.
///
/// The table holds the global table size and the ordered list of every node in the cluster. It is
/// loaded once at startup and never changes, so it is shared between threads without locking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingTable {
    size: usize,
    nodes: Vec<NodeData>,
}

impl RoutingTable {
    /// Constructs a `RoutingTable` from its parts without validating the ranges.
    pub fn new(size: usize, nodes: Vec<NodeData>) -> Self {
        RoutingTable { size, nodes }
    }

    /// Loads and validates a routing table from the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|err| {
            Error::ConfigLoad(format!("could not read {}: {}", path.display(), err))
        })?;
        data.parse()
    }

    /// Checks that the ranges are well formed, pairwise disjoint and cover `[0, size)`, and that no
    /// id is repeated.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::ConfigLoad("table size must be positive".to_string()));
        }

        let mut sorted: Vec<&NodeData> = self.nodes.iter().collect();
        sorted.sort_by_key(|node_data| node_data.range_start);

        let mut next = 0;
        for (i, node_data) in sorted.iter().enumerate() {
            if node_data.range_start > node_data.range_end || node_data.range_end >= self.size {
                return Err(Error::ConfigLoad(format!("invalid range for node {:?}", node_data)));
            }
            if self.nodes.iter().filter(|other| other.id == node_data.id).count() > 1 {
                return Err(Error::ConfigLoad(format!("node id {} is repeated", node_data.id)));
            }
            if i > 0 && sorted[i - 1].overlaps(node_data) {
                return Err(Error::ConfigLoad(format!(
                    "ranges of {:?} and {:?} overlap",
                    sorted[i - 1], node_data
                )));
            }
            if node_data.range_start != next {
                return Err(Error::ConfigLoad(format!("bucket {} is not owned by any node", next)));
            }
            next = node_data.range_end + 1;
        }

        if next != self.size {
            return Err(Error::ConfigLoad(format!("bucket {} is not owned by any node", next)));
        }
        Ok(())
    }

    /// Returns the global table size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns every node in the order they were loaded.
    pub fn nodes(&self) -> &[NodeData] {
        self.nodes.as_slice()
    }

    /// Returns the node with `id`.
    pub fn get(&self, id: u64) -> Option<&NodeData> {
        self.nodes.iter().find(|node_data| node_data.id == id)
    }

    /// Returns, in table order, the nodes whose range contains `bucket`.
    pub fn owners(&self, bucket: usize) -> impl Iterator<Item = &NodeData> {
        self.nodes.iter().filter(move |node_data| node_data.contains(bucket))
    }
}

fn parse_column<T: FromStr>(line: usize, name: &str, column: &str) -> Result<T> {
    column.parse().map_err(|_| {
        Error::ConfigLoad(format!("line {}: invalid {} {:?}", line, name, column))
    })
}

impl FromStr for RoutingTable {
    type Err = Error;

    /// Parses a routing source: the table size on the first line, then one
    /// `<node-id> <address> <range-start> <range-end>` line per node.
    fn from_str(data: &str) -> Result<Self> {
        let mut lines = data
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.replace(CONTROL_CHARS, "")))
            .filter(|(_, line)| !line.trim().is_empty());

        let size = match lines.next() {
            Some((i, line)) => parse_column(i, "table size", line.trim())?,
            None => return Err(Error::ConfigLoad("routing source is empty".to_string())),
        };

        let mut nodes = Vec::new();
        for (i, line) in lines {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() != 4 {
                return Err(Error::ConfigLoad(format!(
                    "line {}: expected `<node-id> <address> <range-start> <range-end>`, got {:?}",
                    i, line
                )));
            }
            nodes.push(NodeData {
                id: parse_column(i, "node id", columns[0])?,
                addr: columns[1].to_string(),
                range_start: parse_column(i, "range start", columns[2])?,
                range_end: parse_column(i, "range end", columns[3])?,
            });
        }

        let table = RoutingTable::new(size, nodes);
        table.validate()?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::RoutingTable;
    use crate::error::Error;
    use crate::node::node_data::NodeData;

    const SOURCE: &str = "100\r\n0 127.0.0.1:8900 0 49\r\n1 127.0.0.1:8901 50 99\r\n";

    fn assert_config_error(source: &str) {
        match source.parse::<RoutingTable>() {
            Err(Error::ConfigLoad(_)) => {},
            other => panic!("expected config error for {:?}, got {:?}", source, other),
        }
    }

    #[test]
    fn test_parse() {
        let table: RoutingTable = SOURCE.parse().unwrap();
        assert_eq!(table.size(), 100);
        assert_eq!(
            table.nodes(),
            &[
                NodeData::new(0, "127.0.0.1:8900", 0, 49),
                NodeData::new(1, "127.0.0.1:8901", 50, 99),
            ]
        );
        assert_eq!(table.get(1).map(|node_data| node_data.range_start), Some(50));
        assert!(table.get(2).is_none());
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let table: RoutingTable = "\n4\n\n7 host:1 0 3\n\n".parse().unwrap();
        assert_eq!(table.nodes(), &[NodeData::new(7, "host:1", 0, 3)]);
    }

    #[test]
    fn test_parse_malformed() {
        assert_config_error("");
        assert_config_error("ten\n0 a 0 9\n");
        assert_config_error("10\n0 a 0\n");
        assert_config_error("10\nx a 0 9\n");
        assert_config_error("10\n0 a 0 nine\n");
        assert_config_error("10\n0 a 0 9 extra\n");
    }

    #[test]
    fn test_validate_coverage() {
        assert_config_error("0\n");
        assert_config_error("10\n0 a 0 4\n");
        assert_config_error("10\n0 a 1 9\n");
        assert_config_error("10\n0 a 0 3\n1 b 5 9\n");
        assert_config_error("10\n0 a 0 5\n1 b 5 9\n");
        assert_config_error("10\n0 a 0 10\n");
        assert_config_error("10\n0 a 5 4\n1 b 0 9\n");
        assert_config_error("10\n0 a 0 4\n0 b 5 9\n");
        assert!("10\n1 b 5 9\n0 a 0 4\n".parse::<RoutingTable>().is_ok());
    }

    #[test]
    fn test_every_bucket_has_one_owner() {
        for size in 1..40 {
            for parts in 1..=size.min(6) {
                let step = size / parts;
                let nodes: Vec<NodeData> = (0..parts)
                    .map(|i| {
                        let end = if i == parts - 1 { size - 1 } else { (i + 1) * step - 1 };
                        NodeData::new(i as u64, "addr", i * step, end)
                    })
                    .collect();
                let table = RoutingTable::new(size, nodes);
                table.validate().unwrap();
                for bucket in 0..size {
                    assert_eq!(table.owners(bucket).count(), 1);
                }
                assert!(table.owners(size).next().is_none());
            }
        }
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            RoutingTable::load("/nonexistent/routing_table.in"),
            Err(Error::ConfigLoad(_))
        ));
    }
}
