//! # miniprim
//!
//! The replicated coordination core of a distributed-primitives platform:
//! - A resource directory state machine: a path tree with nested resource
//!   state machines (counters, locks, id generators, maps) bound to nodes
//! - A partition router that spreads a named primitive over every partition
//!   of a group and routes each operation to one of them
//! - An in-process replicated log so the two can be run end to end
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            PrimitiveClient               │
//! │   Partitioner: key → partition           │
//! └──────┬──────────────┬──────────────┬─────┘
//!        │ ServiceClient│              │
//! ┌──────▼─────┐ ┌──────▼─────┐ ┌──────▼─────┐
//! │ Partition 1│ │ Partition 2│ │ Partition 3│
//! │  log       │ │  log       │ │  log       │
//! │  Directory │ │  Directory │ │  Directory │
//! │   └ Proxy  │ │   └ Proxy  │ │   └ Proxy  │
//! └────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use miniprim::directory::{ResourceType, ResourceTypeRegistry};
//! use miniprim::partition::{PartitionService, ProtocolRegistry, MultiRaftProtocol, ServiceId};
//! use miniprim::resources::{CounterOp, Payload};
//! use std::sync::Arc;
//!
//! # async fn run() -> miniprim::Result<()> {
//! let config = miniprim::Config::default();
//! let registry = Arc::new(ResourceTypeRegistry::with_builtin());
//! let partitions = Arc::new(PartitionService::from_config(&config, registry)?);
//!
//! let protocols = ProtocolRegistry::new();
//! let router = protocols.router(MultiRaftProtocol::NAME, config.router.clone(), partitions)?;
//!
//! let counter = router
//!     .create_service(ServiceId::new("hits", ResourceType::counter()))
//!     .await?;
//! let value = counter.execute("hits", CounterOp::Increment.to_payload()).await?;
//! # let _ = value;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod directory;
pub mod partition;
pub mod resources;
pub mod substrate;

// Re-export commonly used types
pub use common::{Config, Error, Result};
pub use directory::ResourceDirectory;
pub use partition::PartitionRouter;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build info
pub const BUILD_INFO: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARGO_PKG_NAME"), ")");
