//! Error types for miniprim

use crate::directory::{ResourceId, ResourceType};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Directory Errors ===
    #[error("Unknown resource: {0}")]
    UnknownResource(ResourceId),

    #[error("Failed to instantiate state machine of type {resource_type}: {reason}")]
    Instantiation {
        resource_type: ResourceType,
        reason: String,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Unexpected command output: {0}")]
    UnexpectedOutput(String),

    // === Partition Errors ===
    #[error("Failed to create partitioned service {service}: {source}")]
    PartitionCreation {
        service: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Partition group not found: {0}")]
    PartitionGroupNotFound(String),

    #[error("Partition group {0} has no partitions")]
    NoPartitions(String),

    #[error("Primitive {name} already registered as {existing}, requested {requested}")]
    PrimitiveTypeMismatch {
        name: String,
        existing: ResourceType,
        requested: ResourceType,
    },

    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    // === Encoding Errors ===
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Is this a retryable error?
    ///
    /// Directory errors are deterministic: replaying the same command yields
    /// the same failure, so only lookup and transport level failures qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::PartitionCreation { source, .. } => source.is_retryable(),
            Error::Io(_) | Error::Internal(_) => true,
            _ => false,
        }
    }

    /// Wrap an error raised while building a partitioned service.
    pub fn partition_creation(service: impl Into<String>, source: Error) -> Self {
        Error::PartitionCreation {
            service: service.into(),
            source: Box::new(source),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Other(e.to_string())
    }
}
