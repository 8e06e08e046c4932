/// Returns the raw digest of `key`: the sum of its character codes.
///
/// Every node must compute the same digest for the same key since routing depends on it, so the
/// digest is never reduced here. Consumers reduce it against their own modulus with `bucket`.
pub fn hash(key: &str) -> u64 {
    key.chars().map(|c| u64::from(u32::from(c))).sum()
}

/// Returns the bucket of `key` in a table of `size` slots.
///
/// `size` must be non-zero.
pub fn bucket(key: &str, size: usize) -> usize {
    (hash(key) % size as u64) as usize
}
