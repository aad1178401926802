//! Registry of resource types the directory can instantiate
//!
//! Built once at startup and shared by every directory replica. The set of
//! tags is closed: `create_resource` with an unregistered tag fails instead
//! of loading anything at runtime.

use crate::common::{Error, Result};
use crate::directory::command::ResourceType;
use crate::directory::proxy::StateMachine;
use crate::resources::{Counter, IdGenerator, Lock, Map};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a fresh nested state machine
pub type Constructor = Arc<dyn Fn() -> Result<Box<dyn StateMachine>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ResourceTypeRegistry {
    constructors: HashMap<ResourceType, Constructor>,
}

impl ResourceTypeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with counter, lock, id-generator and map registered
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_default::<Counter>(ResourceType::counter());
        registry.register_default::<Lock>(ResourceType::lock());
        registry.register_default::<IdGenerator>(ResourceType::id_generator());
        registry.register_default::<Map>(ResourceType::map());
        registry
    }

    /// Register (or replace) the constructor for a tag.
    pub fn register<F>(&mut self, resource_type: ResourceType, constructor: F)
    where
        F: Fn() -> Result<Box<dyn StateMachine>> + Send + Sync + 'static,
    {
        self.constructors
            .insert(resource_type, Arc::new(constructor));
    }

    /// Register a type built by its `Default` impl.
    pub fn register_default<M>(&mut self, resource_type: ResourceType)
    where
        M: StateMachine + Default + 'static,
    {
        self.register(resource_type, || Ok(Box::new(M::default())));
    }

    pub fn contains(&self, resource_type: &ResourceType) -> bool {
        self.constructors.contains_key(resource_type)
    }

    /// Registered tags, sorted
    pub fn types(&self) -> Vec<ResourceType> {
        let mut types: Vec<_> = self.constructors.keys().cloned().collect();
        types.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        types
    }

    /// Construct a new instance of `resource_type`.
    pub fn instantiate(&self, resource_type: &ResourceType) -> Result<Box<dyn StateMachine>> {
        let constructor =
            self.constructors
                .get(resource_type)
                .ok_or_else(|| Error::Instantiation {
                    resource_type: resource_type.clone(),
                    reason: "type is not registered".into(),
                })?;

        constructor().map_err(|e| match e {
            e @ Error::Instantiation { .. } => e,
            other => Error::Instantiation {
                resource_type: resource_type.clone(),
                reason: other.to_string(),
            },
        })
    }
}

impl std::fmt::Debug for ResourceTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTypeRegistry")
            .field("types", &self.types())
            .finish()
    }
}
