//! Partition group lookup

use crate::common::{Config, Error, Result};
use crate::directory::ResourceTypeRegistry;
use crate::partition::group::{LocalPartitionGroup, PartitionGroup};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Resolves partition groups by name
pub struct PartitionService {
    groups: BTreeMap<String, Arc<dyn PartitionGroup>>,
    default_group: String,
}

impl PartitionService {
    pub fn new(default_group: impl Into<String>) -> Self {
        Self {
            groups: BTreeMap::new(),
            default_group: default_group.into(),
        }
    }

    /// Add (or replace) a group.
    pub fn with_group(mut self, group: Arc<dyn PartitionGroup>) -> Self {
        self.groups.insert(group.name().to_string(), group);
        self
    }

    /// Build local groups for every configured group.
    pub fn from_config(config: &Config, registry: Arc<ResourceTypeRegistry>) -> Result<Self> {
        config.validate()?;
        let mut service = Self::new(config.default_group.clone());
        for group in &config.groups {
            tracing::info!(
                group = %group.name,
                partitions = group.partitions,
                replicas = group.replicas,
                "building partition group"
            );
            service = service.with_group(Arc::new(LocalPartitionGroup::from_config(
                group,
                registry.clone(),
            )));
        }
        Ok(service)
    }

    pub fn partition_group(&self, name: &str) -> Result<Arc<dyn PartitionGroup>> {
        self.groups
            .get(name)
            .cloned()
            .ok_or_else(|| Error::PartitionGroupNotFound(name.to_string()))
    }

    pub fn default_group(&self) -> Result<Arc<dyn PartitionGroup>> {
        self.partition_group(&self.default_group)
    }

    pub fn default_group_name(&self) -> &str {
        &self.default_group
    }

    /// Group names, sorted
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for PartitionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionService")
            .field("groups", &self.group_names())
            .field("default_group", &self.default_group)
            .finish()
    }
}
