//! Operation key → partition selection
//!
//! A partitioner must be a pure function of the key and the partition list:
//! primitives such as locks rely on every client routing a key to the same
//! partition.

use crate::common::{hrw_select, shard_key, Error};
use crate::partition::partition::PartitionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub trait Partitioner: Send + Sync {
    /// Owning partition for `key`, `None` only when `partitions` is empty.
    fn partition(&self, key: &[u8], partitions: &[PartitionId]) -> Option<PartitionId>;
}

/// BLAKE3(key) modulo the number of partitions
#[derive(Debug, Clone, Copy, Default)]
pub struct HashPartitioner;

impl Partitioner for HashPartitioner {
    fn partition(&self, key: &[u8], partitions: &[PartitionId]) -> Option<PartitionId> {
        if partitions.is_empty() {
            return None;
        }
        let idx = shard_key(key, partitions.len() as u64) as usize;
        partitions.get(idx).copied()
    }
}

/// Highest random weight over partition ids.
///
/// Removing a partition only moves the keys it owned.
#[derive(Debug, Clone, Copy, Default)]
pub struct RendezvousPartitioner;

impl Partitioner for RendezvousPartitioner {
    fn partition(&self, key: &[u8], partitions: &[PartitionId]) -> Option<PartitionId> {
        let names: Vec<String> = partitions.iter().map(PartitionId::to_string).collect();
        hrw_select(key, names.as_slice()).map(|idx| partitions[idx])
    }
}

/// Partitioner selected by configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionerKind {
    #[default]
    Hash,
    Rendezvous,
}

impl PartitionerKind {
    pub fn build(&self) -> Arc<dyn Partitioner> {
        match self {
            PartitionerKind::Hash => Arc::new(HashPartitioner),
            PartitionerKind::Rendezvous => Arc::new(RendezvousPartitioner),
        }
    }
}

impl fmt::Display for PartitionerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionerKind::Hash => write!(f, "hash"),
            PartitionerKind::Rendezvous => write!(f, "rendezvous"),
        }
    }
}

impl FromStr for PartitionerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hash" => Ok(PartitionerKind::Hash),
            "rendezvous" => Ok(PartitionerKind::Rendezvous),
            other => Err(Error::InvalidConfig(format!("unknown partitioner: {}", other))),
        }
    }
}
