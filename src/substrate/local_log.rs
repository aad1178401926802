//! In-process replicated log
//!
//! Stands in for a consensus group inside one process: submissions are
//! serialized behind a single async mutex, stamped with the next index and a
//! non-decreasing timestamp, appended, then applied to every replica in the
//! same order. Leader election and durability are not modelled.

use crate::common::{timestamp_now_millis, Error, Result};
use crate::directory::{Command, CommandOutput, Commit, ResourceDirectory, ResourceTypeRegistry};
use std::sync::Arc;
use tokio::sync::Mutex;

struct LogState {
    next_index: u64,
    last_timestamp: u64,
    entries: Vec<Commit<Command>>,
    replicas: Vec<ResourceDirectory>,
}

pub struct LocalLog {
    name: String,
    registry: Arc<ResourceTypeRegistry>,
    state: Mutex<LogState>,
}

impl LocalLog {
    /// Log applied to `replicas` directories (at least one).
    pub fn new(
        name: impl Into<String>,
        registry: Arc<ResourceTypeRegistry>,
        replicas: usize,
    ) -> Self {
        let replicas = (0..replicas.max(1))
            .map(|_| ResourceDirectory::new(registry.clone()))
            .collect();
        Self {
            name: name.into(),
            registry,
            state: Mutex::new(LogState {
                next_index: 1,
                last_timestamp: 0,
                entries: Vec::new(),
                replicas,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Arc<ResourceTypeRegistry> {
        &self.registry
    }

    /// Append `command` and return the result of applying it on the first
    /// replica.
    pub async fn submit(&self, command: Command) -> Result<CommandOutput> {
        let mut state = self.state.lock().await;

        let index = state.next_index;
        state.next_index += 1;
        let timestamp = timestamp_now_millis().max(state.last_timestamp);
        state.last_timestamp = timestamp;

        let commit = Commit::new(index, timestamp, command);
        tracing::debug!(log = %self.name, index, kind = commit.command.kind(), "committed");
        state.entries.push(commit.clone());

        let mut result = None;
        for replica in state.replicas.iter_mut() {
            let out = replica.apply(commit.clone());
            if result.is_none() {
                result = Some(out);
            }
        }
        result.unwrap_or_else(|| Err(Error::Internal(format!("log {} has no replicas", self.name))))
    }

    /// Committed entries, in index order
    pub async fn entries(&self) -> Vec<Commit<Command>> {
        self.state.lock().await.entries.clone()
    }

    pub async fn last_index(&self) -> u64 {
        self.state.lock().await.next_index - 1
    }

    pub async fn replica_count(&self) -> usize {
        self.state.lock().await.replicas.len()
    }

    /// Run `f` against replica `replica`, if it exists.
    pub async fn read_replica<R>(
        &self,
        replica: usize,
        f: impl FnOnce(&ResourceDirectory) -> R,
    ) -> Option<R> {
        let state = self.state.lock().await;
        state.replicas.get(replica).map(f)
    }

    /// Run `f` against the first replica.
    pub async fn read<R>(&self, f: impl FnOnce(&ResourceDirectory) -> R) -> R {
        let state = self.state.lock().await;
        // new() always creates at least one replica
        f(&state.replicas[0])
    }
}

impl std::fmt::Debug for LocalLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalLog").field("name", &self.name).finish_non_exhaustive()
    }
}
