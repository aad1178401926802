//! Resource directory state machine
//!
//! The directory is the top-level state machine of every partition:
//! - Path tree of named nodes
//! - Resources (nested state machines) bound to nodes, keyed by id
//! - Command dispatch to the addressed resource

pub mod command;
pub mod node;
pub mod proxy;
pub mod registry;
pub mod resource_directory;

pub use command::{Command, CommandOutput, Commit, ResourceId, ResourceType};
pub use node::{split_path, Node, PATH_SEPARATOR};
pub use proxy::{ResourceProxy, StateMachine};
pub use registry::{Constructor, ResourceTypeRegistry};
pub use resource_directory::ResourceDirectory;
