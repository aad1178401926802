//! Protocol registry
//!
//! Maps protocol type names to factories. One registry is built at startup
//! and handed to whatever creates routers.

use crate::common::{Error, Result, RouterConfig};
use crate::partition::router::PartitionRouter;
use crate::partition::service::PartitionService;
use std::collections::HashMap;
use std::sync::Arc;

pub trait ProtocolType: Send + Sync {
    fn name(&self) -> &'static str;

    fn default_config(&self) -> RouterConfig {
        RouterConfig::default()
    }

    fn new_router(
        &self,
        config: RouterConfig,
        partitions: Arc<PartitionService>,
    ) -> PartitionRouter;
}

/// Primitives replicated over a group of independent consensus partitions
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiRaftProtocol;

impl MultiRaftProtocol {
    pub const NAME: &'static str = "multi-raft";
}

impl ProtocolType for MultiRaftProtocol {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn new_router(
        &self,
        config: RouterConfig,
        partitions: Arc<PartitionService>,
    ) -> PartitionRouter {
        PartitionRouter::new(config, partitions)
    }
}

pub struct ProtocolRegistry {
    types: HashMap<&'static str, Arc<dyn ProtocolType>>,
}

impl ProtocolRegistry {
    /// Registry with the multi-raft protocol
    pub fn new() -> Self {
        let mut registry = Self {
            types: HashMap::new(),
        };
        registry.register(Arc::new(MultiRaftProtocol));
        registry
    }

    pub fn register(&mut self, protocol: Arc<dyn ProtocolType>) {
        self.types.insert(protocol.name(), protocol);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn ProtocolType>> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownProtocol(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.types.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Router for protocol `name`
    pub fn router(
        &self,
        name: &str,
        config: RouterConfig,
        partitions: Arc<PartitionService>,
    ) -> Result<PartitionRouter> {
        Ok(self.get(name)?.new_router(config, partitions))
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = ProtocolRegistry::new();
        assert_eq!(registry.names(), ["multi-raft"]);
        let protocol = registry.get(MultiRaftProtocol::NAME).unwrap();
        assert_eq!(protocol.default_config(), RouterConfig::default());
        assert!(matches!(
            registry.get("primary-backup").err(),
            Some(Error::UnknownProtocol(_))
        ));
    }

    #[test]
    fn test_router_uses_given_config() {
        let registry = ProtocolRegistry::new();
        let partitions = Arc::new(PartitionService::new("raft"));
        let config = RouterConfig::default().with_group("data");
        let router = registry
            .router(MultiRaftProtocol::NAME, config.clone(), partitions)
            .unwrap();
        assert_eq!(router.config(), &config);
        assert!(matches!(
            router.group().err(),
            Some(Error::PartitionGroupNotFound(_))
        ));
    }
}
