use serde::{Deserialize, Serialize};

/// Interleaved latitude/longitude hash. Only the low `precision_bits` bits
/// are used; the remaining high bits stay zero.
pub type HashValue = u64;

/// Partition (hash) key: the top `partition_bits` bits of a [`HashValue`].
pub type PartitionKey = u64;

/// One contiguous scan unit: an inclusive hash interval inside a single
/// partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashKeyRange {
    pub hash_key: PartitionKey,
    pub range_key_from: HashValue,
    pub range_key_to: HashValue,
}

impl HashKeyRange {
    pub fn new(hash_key: PartitionKey, range_key_from: HashValue, range_key_to: HashValue) -> Self {
        debug_assert!(range_key_from <= range_key_to);
        Self {
            hash_key,
            range_key_from,
            range_key_to,
        }
    }

    /// Check if `hash` falls inside the inclusive interval.
    pub fn contains(&self, hash: HashValue) -> bool {
        (self.range_key_from..=self.range_key_to).contains(&hash)
    }
}

/// Sort key of a stored row: hash first so rows scan in spatial order, then
/// the identifier so two records at the same spot stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub hash: HashValue,
    pub identifier: String,
}

impl SortKey {
    pub fn new(hash: HashValue, identifier: impl Into<String>) -> Self {
        Self {
            hash,
            identifier: identifier.into(),
        }
    }
}
