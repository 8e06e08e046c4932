use std::fmt::{Debug, Formatter, Result};

/// A peer descriptor: a node's id, address, and the closed range of buckets it owns.
#[derive(PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub struct NodeData {
    pub id: u64,
    pub addr: String,
    pub range_start: usize,
    pub range_end: usize,
}

impl NodeData {
    pub fn new(id: u64, addr: &str, range_start: usize, range_end: usize) -> Self {
        NodeData {
            id,
            addr: addr.to_string(),
            range_start,
            range_end,
        }
    }

    /// Returns `true` if `bucket` falls in `[range_start, range_end]`.
    pub fn contains(&self, bucket: usize) -> bool {
        self.range_start <= bucket && bucket <= self.range_end
    }

    /// Returns `true` if the ranges of `self` and `other` share a bucket.
    pub fn overlaps(&self, other: &NodeData) -> bool {
        self.range_start <= other.range_end && other.range_start <= self.range_end
    }
}

impl Debug for NodeData {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "{} - {} [{}, {}]",
            self.id, self.addr, self.range_start, self.range_end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::NodeData;

    #[test]
    fn test_contains_is_closed() {
        let node_data = NodeData::new(0, "localhost:8900", 10, 19);
        assert!(!node_data.contains(9));
        assert!(node_data.contains(10));
        assert!(node_data.contains(19));
        assert!(!node_data.contains(20));
    }

    #[test]
    fn test_overlaps() {
        let a = NodeData::new(0, "a", 0, 49);
        assert!(a.overlaps(&NodeData::new(1, "b", 49, 99)));
        assert!(!a.overlaps(&NodeData::new(1, "b", 50, 99)));
        assert!(NodeData::new(1, "b", 50, 99).overlaps(&NodeData::new(2, "c", 60, 60)));
    }
}
