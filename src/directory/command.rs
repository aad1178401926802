//! Command vocabulary and commit envelope of the resource directory

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a resource bound in the directory.
///
/// Ids are minted from commit indexes, which start at 1, so
/// [`ResourceId::NONE`] never names a live resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// Sentinel for "no resource"
    pub const NONE: ResourceId = ResourceId(0);

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "none")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Type tag of a nested resource state machine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(String);

impl ResourceType {
    pub const COUNTER: &'static str = "counter";
    pub const LOCK: &'static str = "lock";
    pub const ID_GENERATOR: &'static str = "id-generator";
    pub const MAP: &'static str = "map";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn counter() -> Self {
        Self::new(Self::COUNTER)
    }

    pub fn lock() -> Self {
        Self::new(Self::LOCK)
    }

    pub fn id_generator() -> Self {
        Self::new(Self::ID_GENERATOR)
    }

    pub fn map() -> Self {
        Self::new(Self::MAP)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// One ordered, timestamped command delivered by the log substrate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit<C> {
    /// Strictly increasing per partition, starting at 1
    pub index: u64,
    /// Substrate time in milliseconds
    pub timestamp: u64,
    pub command: C,
}

impl<C> Commit<C> {
    pub fn new(index: u64, timestamp: u64, command: C) -> Self {
        Self {
            index,
            timestamp,
            command,
        }
    }

    /// Same position in the log, different command.
    pub fn with_command<D>(&self, command: D) -> Commit<D> {
        Commit {
            index: self.index,
            timestamp: self.timestamp,
            command,
        }
    }
}

/// Commands understood by the resource directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    CreatePath {
        path: String,
    },
    PathExists {
        path: String,
    },
    PathChildren {
        path: String,
    },
    DeletePath {
        path: String,
    },
    CreateResource {
        path: String,
        #[serde(rename = "type")]
        resource_type: ResourceType,
    },
    DeleteResource {
        resource: ResourceId,
    },
    /// Envelope for every operation addressed to a nested resource
    Dispatch {
        resource: ResourceId,
        payload: Value,
    },
}

impl Command {
    pub fn create_path(path: impl Into<String>) -> Self {
        Command::CreatePath { path: path.into() }
    }

    pub fn path_exists(path: impl Into<String>) -> Self {
        Command::PathExists { path: path.into() }
    }

    pub fn path_children(path: impl Into<String>) -> Self {
        Command::PathChildren { path: path.into() }
    }

    pub fn delete_path(path: impl Into<String>) -> Self {
        Command::DeletePath { path: path.into() }
    }

    pub fn create_resource(path: impl Into<String>, resource_type: ResourceType) -> Self {
        Command::CreateResource {
            path: path.into(),
            resource_type,
        }
    }

    pub fn delete_resource(resource: ResourceId) -> Self {
        Command::DeleteResource { resource }
    }

    pub fn dispatch(resource: ResourceId, payload: Value) -> Self {
        Command::Dispatch { resource, payload }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Command::CreatePath { .. } => "create_path",
            Command::PathExists { .. } => "path_exists",
            Command::PathChildren { .. } => "path_children",
            Command::DeletePath { .. } => "delete_path",
            Command::CreateResource { .. } => "create_resource",
            Command::DeleteResource { .. } => "delete_resource",
            Command::Dispatch { .. } => "dispatch",
        }
    }
}

/// Result of applying one [`Command`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutput {
    Bool(bool),
    Children(Vec<String>),
    Resource(ResourceId),
    Value(Value),
}

impl CommandOutput {
    pub fn into_bool(self) -> Result<bool> {
        match self {
            CommandOutput::Bool(b) => Ok(b),
            other => Err(Error::UnexpectedOutput(format!("expected bool, got {:?}", other))),
        }
    }

    pub fn into_children(self) -> Result<Vec<String>> {
        match self {
            CommandOutput::Children(children) => Ok(children),
            other => Err(Error::UnexpectedOutput(format!(
                "expected children, got {:?}",
                other
            ))),
        }
    }

    pub fn into_resource(self) -> Result<ResourceId> {
        match self {
            CommandOutput::Resource(id) => Ok(id),
            other => Err(Error::UnexpectedOutput(format!(
                "expected resource id, got {:?}",
                other
            ))),
        }
    }

    pub fn into_value(self) -> Result<Value> {
        match self {
            CommandOutput::Value(value) => Ok(value),
            other => Err(Error::UnexpectedOutput(format!("expected value, got {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_id_display() {
        assert_eq!(ResourceId::NONE.to_string(), "none");
        assert_eq!(ResourceId(7).to_string(), "7");
        assert!(ResourceId::NONE.is_none());
        assert!(!ResourceId(7).is_none());
    }

    #[test]
    fn test_command_wire_shape() {
        let cmd = Command::create_resource("/x", ResourceType::counter());
        let encoded = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            encoded,
            json!({"kind": "create_resource", "path": "/x", "type": "counter"})
        );

        let cmd: Command =
            serde_json::from_value(json!({"kind": "dispatch", "resource": 7, "payload": "get"}))
                .unwrap();
        assert_eq!(cmd, Command::dispatch(ResourceId(7), json!("get")));
    }

    #[test]
    fn test_output_accessors() {
        assert!(CommandOutput::Bool(true).into_bool().unwrap());
        assert_eq!(
            CommandOutput::Resource(ResourceId(3)).into_resource().unwrap(),
            ResourceId(3)
        );
        assert!(matches!(
            CommandOutput::Bool(true).into_value(),
            Err(Error::UnexpectedOutput(_))
        ));
    }
}
