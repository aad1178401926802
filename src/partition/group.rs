//! Partition groups
//!
//! A group is the unit a primitive binds to: a name, an ordered list of
//! partitions and the registry of primitives created in it.

use crate::common::{Error, GroupConfig, Result};
use crate::directory::{ResourceType, ResourceTypeRegistry};
use crate::partition::partition::{LocalPartitionClient, Partition, PartitionId};
use crate::substrate::LocalLog;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Name and type of a primitive registered in a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub primitive_type: ResourceType,
}

#[async_trait]
pub trait PartitionGroup: Send + Sync {
    fn name(&self) -> &str;

    /// Partitions in group order; fixed for the life of the group
    fn partitions(&self) -> &[Partition];

    /// Record a primitive in the group.
    ///
    /// Registering the same name and type again succeeds. Registering a name
    /// under a different type fails with `PrimitiveTypeMismatch`.
    async fn create_primitive(&self, metadata: PrimitiveMetadata) -> Result<()>;

    fn partition(&self, id: PartitionId) -> Option<&Partition> {
        self.partitions().iter().find(|p| p.id() == id)
    }

    fn partition_ids(&self) -> Vec<PartitionId> {
        self.partitions().iter().map(Partition::id).collect()
    }
}

/// Group whose metadata lives in process memory
pub struct LocalPartitionGroup {
    name: String,
    partitions: Vec<Partition>,
    logs: Vec<Arc<LocalLog>>,
    primitives: RwLock<HashMap<String, ResourceType>>,
}

impl LocalPartitionGroup {
    /// Group over caller-provided partitions
    pub fn new(name: impl Into<String>, partitions: Vec<Partition>) -> Self {
        Self {
            name: name.into(),
            partitions,
            logs: Vec::new(),
            primitives: RwLock::new(HashMap::new()),
        }
    }

    /// Group of `partitions` local logs, numbered from 1, each applied to
    /// `replicas` directories.
    pub fn with_local_logs(
        name: impl Into<String>,
        partitions: u32,
        replicas: usize,
        registry: Arc<ResourceTypeRegistry>,
    ) -> Self {
        let name = name.into();
        let logs: Vec<Arc<LocalLog>> = (1..=partitions)
            .map(|n| {
                Arc::new(LocalLog::new(
                    format!("{}/{}", name, PartitionId(n)),
                    registry.clone(),
                    replicas,
                ))
            })
            .collect();
        let partitions = logs
            .iter()
            .zip(1..)
            .map(|(log, n)| {
                Partition::new(
                    PartitionId(n),
                    Arc::new(LocalPartitionClient::new(log.clone())),
                )
            })
            .collect();

        Self {
            logs,
            ..Self::new(name, partitions)
        }
    }

    pub fn from_config(config: &GroupConfig, registry: Arc<ResourceTypeRegistry>) -> Self {
        Self::with_local_logs(
            config.name.clone(),
            config.partitions,
            config.replicas,
            registry,
        )
    }

    /// Backing log of a partition, for groups built from local logs
    pub fn log(&self, id: PartitionId) -> Option<&Arc<LocalLog>> {
        let position = self.partitions.iter().position(|p| p.id() == id)?;
        self.logs.get(position)
    }

    /// Registered primitives, sorted by name
    pub async fn primitives(&self) -> Vec<PrimitiveMetadata> {
        let primitives = self.primitives.read().await;
        let mut out: Vec<_> = primitives
            .iter()
            .map(|(name, primitive_type)| PrimitiveMetadata {
                name: name.clone(),
                primitive_type: primitive_type.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

#[async_trait]
impl PartitionGroup for LocalPartitionGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    async fn create_primitive(&self, metadata: PrimitiveMetadata) -> Result<()> {
        let mut primitives = self.primitives.write().await;
        match primitives.entry(metadata.name) {
            Entry::Occupied(entry) if *entry.get() == metadata.primitive_type => Ok(()),
            Entry::Occupied(entry) => Err(Error::PrimitiveTypeMismatch {
                name: entry.key().clone(),
                existing: entry.get().clone(),
                requested: metadata.primitive_type,
            }),
            Entry::Vacant(entry) => {
                tracing::info!(
                    group = %self.name,
                    primitive = %entry.key(),
                    primitive_type = %metadata.primitive_type,
                    "registered primitive"
                );
                entry.insert(metadata.primitive_type);
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for LocalPartitionGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPartitionGroup")
            .field("name", &self.name)
            .field("partitions", &self.partitions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(partitions: u32) -> LocalPartitionGroup {
        LocalPartitionGroup::with_local_logs(
            "raft",
            partitions,
            1,
            Arc::new(ResourceTypeRegistry::with_builtin()),
        )
    }

    fn metadata(name: &str, primitive_type: ResourceType) -> PrimitiveMetadata {
        PrimitiveMetadata {
            name: name.into(),
            primitive_type,
        }
    }

    #[test]
    fn test_partitions_are_ordered() {
        let group = group(3);
        assert_eq!(
            group.partition_ids(),
            [PartitionId(1), PartitionId(2), PartitionId(3)]
        );
        assert_eq!(group.log(PartitionId(2)).unwrap().name(), "raft/partition-2");
        assert!(group.log(PartitionId(4)).is_none());
        assert!(group.partition(PartitionId(3)).is_some());
    }

    #[tokio::test]
    async fn test_create_primitive_is_idempotent() {
        let group = group(1);
        group
            .create_primitive(metadata("lockA", ResourceType::lock()))
            .await
            .unwrap();
        group
            .create_primitive(metadata("lockA", ResourceType::lock()))
            .await
            .unwrap();
        assert_eq!(group.primitives().await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_primitive_type_mismatch() {
        let group = group(1);
        group
            .create_primitive(metadata("x", ResourceType::lock()))
            .await
            .unwrap();
        let err = group
            .create_primitive(metadata("x", ResourceType::map()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PrimitiveTypeMismatch { .. }));
        assert_eq!(
            group.primitives().await,
            [metadata("x", ResourceType::lock())]
        );
    }
}
