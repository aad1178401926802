//! Per-partition service clients and the composite primitive client

use crate::common::{Error, Result};
use crate::directory::{Command, ResourceId, ResourceType, PATH_SEPARATOR};
use crate::partition::partition::{Partition, PartitionClient, PartitionId};
use crate::partition::partitioner::Partitioner;
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Name and type of a primitive service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId {
    pub name: String,
    #[serde(rename = "type")]
    pub primitive_type: ResourceType,
}

impl ServiceId {
    pub fn new(name: impl Into<String>, primitive_type: ResourceType) -> Self {
        Self {
            name: name.into(),
            primitive_type,
        }
    }

    /// Directory path of the service resource in every partition
    pub fn path(&self) -> String {
        format!(
            "{sep}{}{sep}{}",
            self.primitive_type,
            self.name,
            sep = PATH_SEPARATOR
        )
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.primitive_type, self.name)
    }
}

/// Client for a service's resource on one partition
#[derive(Clone)]
pub struct ServiceClient {
    service: ServiceId,
    partition: PartitionId,
    resource: ResourceId,
    client: Arc<dyn PartitionClient>,
}

impl ServiceClient {
    /// Bind `service` on `partition`, creating its resource if needed.
    pub async fn open(service: ServiceId, partition: Partition) -> Result<Self> {
        let client = partition.client();
        let resource = client
            .submit(Command::create_resource(
                service.path(),
                service.primitive_type.clone(),
            ))
            .await?
            .into_resource()?;

        tracing::debug!(%service, partition = %partition.id(), %resource, "opened service client");
        Ok(Self {
            service,
            partition: partition.id(),
            resource,
            client,
        })
    }

    /// Dispatch `payload` to the service resource.
    pub async fn execute(&self, payload: Value) -> Result<Value> {
        self.client
            .submit(Command::dispatch(self.resource, payload))
            .await?
            .into_value()
    }

    /// Delete the service resource on this partition.
    pub async fn close(&self) -> Result<bool> {
        self.client
            .submit(Command::delete_resource(self.resource))
            .await?
            .into_bool()
    }

    pub fn service(&self) -> &ServiceId {
        &self.service
    }

    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    pub fn resource(&self) -> ResourceId {
        self.resource
    }
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.service)
            .field("partition", &self.partition)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

/// One logical client over every partition of a service.
///
/// Each operation is routed by the partitioner to a single partition.
/// Operations on the same partition keep their submission order; nothing is
/// promised across partitions.
pub struct PrimitiveClient {
    service: ServiceId,
    partitions: Vec<PartitionId>,
    clients: Vec<ServiceClient>,
    partitioner: Arc<dyn Partitioner>,
}

impl PrimitiveClient {
    /// `clients` must be in group order.
    pub fn new(
        service: ServiceId,
        clients: Vec<ServiceClient>,
        partitioner: Arc<dyn Partitioner>,
    ) -> Self {
        let partitions = clients.iter().map(ServiceClient::partition).collect();
        Self {
            service,
            partitions,
            clients,
            partitioner,
        }
    }

    pub fn service(&self) -> &ServiceId {
        &self.service
    }

    pub fn partitions(&self) -> &[PartitionId] {
        &self.partitions
    }

    pub fn clients(&self) -> &[ServiceClient] {
        &self.clients
    }

    /// Partition owning `key`
    pub fn partition_for(&self, key: impl AsRef<[u8]>) -> Result<PartitionId> {
        self.partitioner
            .partition(key.as_ref(), &self.partitions)
            .ok_or_else(|| Error::NoPartitions(self.service.to_string()))
    }

    pub fn client(&self, partition: PartitionId) -> Option<&ServiceClient> {
        self.clients.iter().find(|c| c.partition() == partition)
    }

    pub fn client_for(&self, key: impl AsRef<[u8]>) -> Result<&ServiceClient> {
        let partition = self.partition_for(key)?;
        self.client(partition).ok_or_else(|| {
            Error::Internal(format!(
                "partitioner chose {} outside of {}",
                partition, self.service
            ))
        })
    }

    /// Route `payload` by `key` and execute it.
    pub async fn execute(&self, key: impl AsRef<[u8]>, payload: Value) -> Result<Value> {
        self.client_for(key)?.execute(payload).await
    }

    /// Execute on an explicit partition.
    pub async fn execute_on(&self, partition: PartitionId, payload: Value) -> Result<Value> {
        let client = self.client(partition).ok_or_else(|| {
            Error::Internal(format!("{} is not part of {}", partition, self.service))
        })?;
        client.execute(payload).await
    }

    /// Delete the service resource on every partition.
    pub async fn close(self) -> Result<()> {
        try_join_all(self.clients.iter().map(ServiceClient::close)).await?;
        tracing::info!(service = %self.service, "closed primitive client");
        Ok(())
    }
}

impl fmt::Debug for PrimitiveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveClient")
            .field("service", &self.service)
            .field("partitions", &self.partitions)
            .finish_non_exhaustive()
    }
}
