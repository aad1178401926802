//! Partitioned primitive routing
//!
//! - Partitions, groups and group lookup
//! - Partitioners (hash, rendezvous)
//! - Router building one service client per partition
//! - Protocol registry

pub mod client;
pub mod group;
pub mod partition;
pub mod partitioner;
pub mod protocol;
pub mod router;
pub mod service;

pub use client::{PrimitiveClient, ServiceClient, ServiceId};
pub use group::{LocalPartitionGroup, PartitionGroup, PrimitiveMetadata};
pub use partition::{LocalPartitionClient, Partition, PartitionClient, PartitionId};
pub use partitioner::{HashPartitioner, Partitioner, PartitionerKind, RendezvousPartitioner};
pub use protocol::{MultiRaftProtocol, ProtocolRegistry, ProtocolType};
pub use router::PartitionRouter;
pub use service::PartitionService;
