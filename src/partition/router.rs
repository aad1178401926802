//! Partition router
//!
//! Turns a named primitive into a [`PrimitiveClient`] spanning every
//! partition of the configured group.

use crate::common::{Error, Result, RouterConfig};
use crate::partition::client::{PrimitiveClient, ServiceClient, ServiceId};
use crate::partition::group::{PartitionGroup, PrimitiveMetadata};
use crate::partition::partitioner::Partitioner;
use crate::partition::service::PartitionService;
use futures_util::future::try_join_all;
use std::sync::Arc;

pub struct PartitionRouter {
    config: RouterConfig,
    partition_service: Arc<PartitionService>,
    partitioner: Arc<dyn Partitioner>,
}

impl PartitionRouter {
    pub fn new(config: RouterConfig, partition_service: Arc<PartitionService>) -> Self {
        let partitioner = config.partitioner.build();
        Self {
            config,
            partition_service,
            partitioner,
        }
    }

    /// Replace the configured partitioner with a custom one.
    pub fn with_partitioner(mut self, partitioner: Arc<dyn Partitioner>) -> Self {
        self.partitioner = partitioner;
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Group this router binds to
    pub fn group(&self) -> Result<Arc<dyn PartitionGroup>> {
        match &self.config.group {
            Some(name) => self.partition_service.partition_group(name),
            None => self.partition_service.default_group(),
        }
    }

    /// Register `service` with the group and open a client on every
    /// partition.
    ///
    /// Partition clients are opened concurrently. The first failure aborts
    /// the whole creation and is returned wrapped in `PartitionCreation`;
    /// clients already opened are dropped. Resources created on other
    /// partitions are left in place and reused by the next attempt.
    pub async fn create_service(&self, service: ServiceId) -> Result<PrimitiveClient> {
        let name = service.to_string();
        match self.build(service).await {
            Ok(client) => Ok(client),
            Err(e) => {
                tracing::warn!(service = %name, error = %e, "partitioned service creation failed");
                Err(Error::partition_creation(name, e))
            }
        }
    }

    async fn build(&self, service: ServiceId) -> Result<PrimitiveClient> {
        let group = self.group()?;
        if group.partitions().is_empty() {
            return Err(Error::NoPartitions(group.name().to_string()));
        }

        group
            .create_primitive(PrimitiveMetadata {
                name: service.name.clone(),
                primitive_type: service.primitive_type.clone(),
            })
            .await?;

        let clients = try_join_all(
            group
                .partitions()
                .iter()
                .cloned()
                .map(|partition| ServiceClient::open(service.clone(), partition)),
        )
        .await?;

        tracing::info!(
            %service,
            group = %group.name(),
            partitions = clients.len(),
            "created partitioned service"
        );
        Ok(PrimitiveClient::new(
            service,
            clients,
            self.partitioner.clone(),
        ))
    }
}

impl std::fmt::Debug for PartitionRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionRouter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
