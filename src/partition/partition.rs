//! Partitions and their client handles

use crate::common::Result;
use crate::directory::{Command, CommandOutput};
use crate::substrate::LocalLog;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a partition within its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(pub u32);

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition-{}", self.0)
    }
}

/// Transport handle into one partition's replicated log.
///
/// `submit` resolves once the command has been committed and applied.
/// Commands submitted through the same handle are applied in submission
/// order.
#[async_trait]
pub trait PartitionClient: Send + Sync {
    async fn submit(&self, command: Command) -> Result<CommandOutput>;
}

/// Client over a [`LocalLog`]
#[derive(Debug, Clone)]
pub struct LocalPartitionClient {
    log: Arc<LocalLog>,
}

impl LocalPartitionClient {
    pub fn new(log: Arc<LocalLog>) -> Self {
        Self { log }
    }

    pub fn log(&self) -> &Arc<LocalLog> {
        &self.log
    }
}

#[async_trait]
impl PartitionClient for LocalPartitionClient {
    async fn submit(&self, command: Command) -> Result<CommandOutput> {
        self.log.submit(command).await
    }
}

/// One independently replicated consensus group
#[derive(Clone)]
pub struct Partition {
    id: PartitionId,
    client: Arc<dyn PartitionClient>,
}

impl Partition {
    pub fn new(id: PartitionId, client: Arc<dyn PartitionClient>) -> Self {
        Self { id, client }
    }

    pub fn id(&self) -> PartitionId {
        self.id
    }

    pub fn client(&self) -> Arc<dyn PartitionClient> {
        self.client.clone()
    }
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partition").field("id", &self.id).finish_non_exhaustive()
    }
}
