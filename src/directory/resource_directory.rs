//! Resource directory state machine
//!
//! Holds the path tree and the table of live resources for one partition.
//! Directory commands are handled here; `Dispatch` commands are forwarded to
//! the proxy of the addressed resource.
//!
//! Application is strictly sequential. The substrate hands over one commit
//! at a time, so nothing in here locks.

use crate::common::{Error, Result};
use crate::directory::command::{Command, CommandOutput, Commit, ResourceId, ResourceType};
use crate::directory::node::{split_path, Node, PATH_SEPARATOR};
use crate::directory::proxy::ResourceProxy;
use crate::directory::registry::ResourceTypeRegistry;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct ResourceDirectory {
    registry: Arc<ResourceTypeRegistry>,
    root: Option<Node>,
    resources: BTreeMap<ResourceId, ResourceProxy>,
    last_index: u64,
}

impl ResourceDirectory {
    pub fn new(registry: Arc<ResourceTypeRegistry>) -> Self {
        Self {
            registry,
            root: None,
            resources: BTreeMap::new(),
            last_index: 0,
        }
    }

    /// Rebuild a directory by applying `commits` in order.
    ///
    /// Per-command failures are part of the replicated history and are
    /// reproduced, not reported.
    pub fn replay<I>(registry: Arc<ResourceTypeRegistry>, commits: I) -> Self
    where
        I: IntoIterator<Item = Commit<Command>>,
    {
        let mut directory = Self::new(registry);
        for commit in commits {
            let _ = directory.apply(commit);
        }
        directory
    }

    /// Apply one commit.
    ///
    /// Errors are the result of this command only; the directory stays
    /// consistent and keeps accepting commits.
    pub fn apply(&mut self, commit: Commit<Command>) -> Result<CommandOutput> {
        let Commit {
            index,
            timestamp,
            command,
        } = commit;

        if index <= self.last_index {
            return Err(Error::Internal(format!(
                "commit index {} is not after {}",
                index, self.last_index
            )));
        }
        self.last_index = index;

        tracing::debug!(index, kind = command.kind(), "applying commit");

        match command {
            Command::CreatePath { path } => {
                Ok(CommandOutput::Bool(self.create_path(index, timestamp, &path)))
            }
            Command::PathExists { path } => Ok(CommandOutput::Bool(self.path_exists(&path))),
            Command::PathChildren { path } => {
                Ok(CommandOutput::Children(self.path_children(&path)))
            }
            Command::DeletePath { path } => {
                Ok(CommandOutput::Bool(self.delete_path(index, timestamp, &path)))
            }
            Command::CreateResource {
                path,
                resource_type,
            } => self
                .create_resource(index, timestamp, &path, &resource_type)
                .map(CommandOutput::Resource),
            Command::DeleteResource { resource } => Ok(CommandOutput::Bool(
                self.delete_resource(index, timestamp, resource),
            )),
            Command::Dispatch { resource, payload } => self
                .dispatch(Commit::new(index, timestamp, payload), resource)
                .map(CommandOutput::Value),
        }
    }

    fn init(&mut self, index: u64, timestamp: u64) -> &mut Node {
        self.root.get_or_insert_with(|| {
            tracing::debug!(index, "initializing directory root");
            Node::new(PATH_SEPARATOR.to_string(), index, timestamp)
        })
    }

    fn create_path(&mut self, index: u64, timestamp: u64, path: &str) -> bool {
        let segments = split_path(path);
        let (_, created) = self
            .init(index, timestamp)
            .find_or_create(&segments, index, timestamp);
        created
    }

    /// Whether every segment of `path` exists. False before the root exists.
    pub fn path_exists(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    /// Child names of `path` in creation order, empty if it does not exist.
    pub fn path_children(&self, path: &str) -> Vec<String> {
        self.node(path).map(Node::child_names).unwrap_or_default()
    }

    fn delete_path(&mut self, index: u64, timestamp: u64, path: &str) -> bool {
        let segments = split_path(path);
        let root = self.init(index, timestamp);

        let Some((last, parent_segments)) = segments.split_last() else {
            return false;
        };
        let Some(parent) = root.find_mut(parent_segments) else {
            return false;
        };
        let Some(removed) = parent.children.shift_remove(*last) else {
            return false;
        };

        let mut revoked = Vec::new();
        removed.collect_resources(&mut revoked);
        for id in &revoked {
            self.resources.remove(id);
        }
        if !revoked.is_empty() {
            tracing::info!(path, revoked = ?revoked, "revoked resources under deleted path");
        }
        true
    }

    fn create_resource(
        &mut self,
        index: u64,
        timestamp: u64,
        path: &str,
        resource_type: &ResourceType,
    ) -> Result<ResourceId> {
        let segments = split_path(path);
        let root = self
            .root
            .get_or_insert_with(|| Node::new(PATH_SEPARATOR.to_string(), index, timestamp));
        let (node, _) = root.find_or_create(&segments, index, timestamp);

        if let Some(id) = node.resource {
            return Ok(id);
        }

        let machine = match self.registry.instantiate(resource_type) {
            Ok(machine) => machine,
            Err(e) => {
                tracing::warn!(path, %resource_type, error = %e, "resource instantiation failed");
                return Err(e);
            }
        };

        let id = ResourceId(index);
        node.resource = Some(id);
        let owned = segments.iter().map(|s| s.to_string()).collect();
        self.resources
            .insert(id, ResourceProxy::new(resource_type.clone(), owned, machine));

        tracing::info!(path, %resource_type, resource = %id, "created resource");
        Ok(id)
    }

    fn delete_resource(&mut self, index: u64, timestamp: u64, id: ResourceId) -> bool {
        let root = self
            .root
            .get_or_insert_with(|| Node::new(PATH_SEPARATOR.to_string(), index, timestamp));

        let Some(proxy) = self.resources.remove(&id) else {
            return false;
        };

        let segments: Vec<&str> = proxy.segments().iter().map(String::as_str).collect();
        if let Some(node) = root.find_mut(&segments) {
            if node.resource == Some(id) {
                node.resource = None;
            }
        }

        tracing::info!(resource = %id, resource_type = %proxy.resource_type(), "deleted resource");
        true
    }

    fn dispatch(&mut self, commit: Commit<Value>, resource: ResourceId) -> Result<Value> {
        let proxy = match self.resources.get_mut(&resource) {
            Some(proxy) if !resource.is_none() => proxy,
            _ => {
                tracing::warn!(resource = %resource, index = commit.index, "dispatch to unknown resource");
                return Err(Error::UnknownResource(resource));
            }
        };
        proxy.apply(&commit)
    }

    // === Introspection ===

    /// Node at `path`, if the root and every segment exist
    pub fn node(&self, path: &str) -> Option<&Node> {
        self.root.as_ref()?.find(&split_path(path))
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    /// Index of the last applied commit, 0 if none
    pub fn last_index(&self) -> u64 {
        self.last_index
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn resource_ids(&self) -> Vec<ResourceId> {
        self.resources.keys().copied().collect()
    }

    pub fn resource_type(&self, id: ResourceId) -> Option<&ResourceType> {
        self.resources.get(&id).map(ResourceProxy::resource_type)
    }

    /// Path the resource was bound at
    pub fn resource_path(&self, id: ResourceId) -> Option<String> {
        self.resources
            .get(&id)
            .map(|proxy| format!("{}{}", PATH_SEPARATOR, proxy.segments().join("/")))
    }

    /// Depth-first listing of every path below the root with its binding.
    pub fn paths(&self) -> Vec<(String, Option<ResourceId>)> {
        fn walk(node: &Node, prefix: &str, out: &mut Vec<(String, Option<ResourceId>)>) {
            for child in node.children.values() {
                let path = format!("{}/{}", prefix, child.name());
                out.push((path.clone(), child.resource()));
                walk(child, &path, out);
            }
        }

        let mut out = Vec::new();
        if let Some(root) = &self.root {
            walk(root, "", &mut out);
        }
        out
    }
}

impl std::fmt::Debug for ResourceDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDirectory")
            .field("initialized", &self.is_initialized())
            .field("resources", &self.resources.len())
            .field("last_index", &self.last_index)
            .finish()
    }
}
