//! Configuration for miniprim components

use crate::common::{Error, Result};
use crate::partition::PartitionerKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default config file looked up by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "miniprim";

/// Environment prefix, e.g. `MINIPRIM__ROUTER__PARTITIONER=rendezvous`
pub const ENV_PREFIX: &str = "MINIPRIM";

/// Name of the group used when a router does not name one
pub const DEFAULT_GROUP: &str = "raft";

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Node ID (unique identifier)
    #[serde(default = "default_node_id")]
    pub node_id: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Partition router settings
    #[serde(default)]
    pub router: RouterConfig,

    /// Group that routers bind to when they do not name one
    #[serde(default = "default_group")]
    pub default_group: String,

    /// Partition groups hosted by this process
    #[serde(default = "default_groups")]
    pub groups: Vec<GroupConfig>,
}

fn default_node_id() -> String {
    "node-1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

fn default_groups() -> Vec<GroupConfig> {
    vec![GroupConfig::default()]
}

/// Partition router configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Partition group to bind to; the service default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Partition selection strategy
    #[serde(default)]
    pub partitioner: PartitionerKind,
}

impl RouterConfig {
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_partitioner(mut self, partitioner: PartitionerKind) -> Self {
        self.partitioner = partitioner;
        self
    }
}

/// Partition group configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,

    /// Number of partitions in the group
    #[serde(default = "default_partitions")]
    pub partitions: u32,

    /// Replicas applying each partition's log
    #[serde(default = "default_replicas")]
    pub replicas: usize,
}

fn default_partitions() -> u32 {
    3
}
fn default_replicas() -> usize {
    1
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            name: default_group(),
            partitions: default_partitions(),
            replicas: default_replicas(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            log_level: default_log_level(),
            router: RouterConfig::default(),
            default_group: default_group(),
            groups: default_groups(),
        }
    }
}

impl Config {
    /// Load `miniprim.toml` from the working directory if present, then
    /// apply `MINIPRIM__*` environment overrides.
    pub fn load() -> Result<Self> {
        Self::build(DEFAULT_CONFIG_FILE, false)
    }

    /// Load from an explicit file; the file must exist.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .to_str()
            .ok_or_else(|| Error::InvalidConfig(format!("non UTF-8 path: {}", path.display())))?;
        Self::build(name, true)
    }

    fn build(name: &str, required: bool) -> Result<Self> {
        let config: Config = config::Config::builder()
            .add_source(config::File::with_name(name).required(required))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject layouts the partition service cannot build.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.partitions == 0 {
                return Err(Error::InvalidConfig(format!(
                    "group {} must have at least one partition",
                    group.name
                )));
            }
            if group.replicas == 0 {
                return Err(Error::InvalidConfig(format!(
                    "group {} must have at least one replica",
                    group.name
                )));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate group name: {}",
                    group.name
                )));
            }
        }

        if !seen.contains(self.default_group.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "default group {} is not declared",
                self.default_group
            )));
        }

        if let Some(group) = &self.router.group {
            if !seen.contains(group.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "router group {} is not declared",
                    group
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].partitions, 3);
        assert_eq!(config.router.partitioner, PartitionerKind::Hash);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cluster.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
node_id = "node-7"
default_group = "data"

[router]
group = "data"
partitioner = "rendezvous"

[[groups]]
name = "data"
partitions = 5

[[groups]]
name = "system"
partitions = 1
replicas = 3
"#
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.node_id, "node-7");
        assert_eq!(config.router.group.as_deref(), Some("data"));
        assert_eq!(config.router.partitioner, PartitionerKind::Rendezvous);
        assert_eq!(config.groups[0].partitions, 5);
        assert_eq!(config.groups[0].replicas, 1);
        assert_eq!(config.groups[1].replicas, 3);
    }

    #[test]
    fn test_validate_rejects_bad_layouts() {
        let mut config = Config::default();
        config.groups[0].partitions = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.groups.push(GroupConfig::default());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.default_group = "missing".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.router = RouterConfig::default().with_group("missing");
        assert!(config.validate().is_err());
    }
}
