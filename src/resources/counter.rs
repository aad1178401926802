//! Replicated 64-bit counter

use super::Payload;
use crate::common::Result;
use crate::directory::{Commit, StateMachine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CounterOp {
    Get,
    /// Returns the previous value
    Set { value: i64 },
    /// Returns the new value
    Increment,
    /// Returns the new value
    Decrement,
    /// Returns the new value
    Add { delta: i64 },
    /// Returns whether the value was swapped
    CompareAndSet { expect: i64, update: i64 },
}

impl Payload for CounterOp {}

/// Arithmetic wraps on overflow.
#[derive(Debug, Default)]
pub struct Counter {
    value: i64,
}

impl Counter {
    pub fn value(&self) -> i64 {
        self.value
    }
}

impl StateMachine for Counter {
    fn apply(&mut self, commit: &Commit<Value>) -> Result<Value> {
        let out = match CounterOp::from_payload(&commit.command)? {
            CounterOp::Get => json!(self.value),
            CounterOp::Set { value } => json!(std::mem::replace(&mut self.value, value)),
            CounterOp::Increment => {
                self.value = self.value.wrapping_add(1);
                json!(self.value)
            }
            CounterOp::Decrement => {
                self.value = self.value.wrapping_sub(1);
                json!(self.value)
            }
            CounterOp::Add { delta } => {
                self.value = self.value.wrapping_add(delta);
                json!(self.value)
            }
            CounterOp::CompareAndSet { expect, update } => {
                let swapped = self.value == expect;
                if swapped {
                    self.value = update;
                }
                json!(swapped)
            }
        };
        Ok(out)
    }
}
