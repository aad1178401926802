//! Nested state machine contract and the proxy the directory keeps per resource

use crate::common::Result;
use crate::directory::command::{Commit, ResourceType};
use serde_json::Value;

/// A deterministic state machine that can be attached under a directory node.
///
/// `apply` is invoked once per commit, in log order, on every replica. It must
/// only depend on the commit and its own state.
pub trait StateMachine: Send {
    fn apply(&mut self, commit: &Commit<Value>) -> Result<Value>;
}

/// Owns one nested state machine on behalf of the directory.
pub struct ResourceProxy {
    resource_type: ResourceType,
    segments: Vec<String>,
    machine: Box<dyn StateMachine>,
}

impl ResourceProxy {
    pub(crate) fn new(
        resource_type: ResourceType,
        segments: Vec<String>,
        machine: Box<dyn StateMachine>,
    ) -> Self {
        Self {
            resource_type,
            segments,
            machine,
        }
    }

    /// Forward a commit to the nested machine, result unchanged.
    pub fn apply(&mut self, commit: &Commit<Value>) -> Result<Value> {
        self.machine.apply(commit)
    }

    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    /// Segments of the node the resource was bound to, root excluded
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl std::fmt::Debug for ResourceProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceProxy")
            .field("resource_type", &self.resource_type)
            .field("segments", &self.segments)
            .finish_non_exhaustive()
    }
}
