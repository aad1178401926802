//! Replicated string-keyed map

use super::Payload;
use crate::common::Result;
use crate::directory::{Commit, StateMachine};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MapOp {
    Get { key: String },
    /// Returns the previous value or null
    Put { key: String, value: Value },
    /// Returns the removed value or null
    Remove { key: String },
    ContainsKey { key: String },
    Size,
    /// Keys in insertion order
    Keys,
    /// Returns the number of removed entries
    Clear,
}

impl Payload for MapOp {}

#[derive(Debug, Default)]
pub struct Map {
    entries: IndexMap<String, Value>,
}

impl Map {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateMachine for Map {
    fn apply(&mut self, commit: &Commit<Value>) -> Result<Value> {
        let out = match MapOp::from_payload(&commit.command)? {
            MapOp::Get { key } => self.entries.get(&key).cloned().unwrap_or(Value::Null),
            MapOp::Put { key, value } => self.entries.insert(key, value).unwrap_or(Value::Null),
            MapOp::Remove { key } => self.entries.shift_remove(&key).unwrap_or(Value::Null),
            MapOp::ContainsKey { key } => json!(self.entries.contains_key(&key)),
            MapOp::Size => json!(self.entries.len()),
            MapOp::Keys => json!(self.entries.keys().collect::<Vec<_>>()),
            MapOp::Clear => {
                let removed = self.entries.len();
                self.entries.clear();
                json!(removed)
            }
        };
        Ok(out)
    }
}
