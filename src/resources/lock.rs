//! Replicated exclusive lock with a FIFO wait queue
//!
//! A grant is stamped with the index of the commit that produced it. The
//! stamp increases with every grant and can be used as a fencing token.

use super::Payload;
use crate::common::{Error, Result};
use crate::directory::{Commit, StateMachine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LockOp {
    /// Acquire, or join the wait queue if held
    Lock { holder: String },
    /// Acquire only if free
    TryLock { holder: String },
    /// Release; the next waiter is granted the lock
    Unlock { holder: String },
    /// Current holder and grant version
    Holder,
}

impl Payload for LockOp {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Grant {
    holder: String,
    version: u64,
}

#[derive(Debug, Default)]
pub struct Lock {
    grant: Option<Grant>,
    waiters: VecDeque<String>,
}

impl Lock {
    pub fn holder(&self) -> Option<&str> {
        self.grant.as_ref().map(|g| g.holder.as_str())
    }

    pub fn waiters(&self) -> impl Iterator<Item = &str> {
        self.waiters.iter().map(String::as_str)
    }

    fn acquired(grant: &Grant) -> Value {
        json!({"acquired": true, "version": grant.version})
    }

    fn try_grant(&mut self, holder: &str, index: u64) -> Option<Value> {
        match &self.grant {
            // reentrant acquire keeps the first grant
            Some(grant) if grant.holder == holder => return Some(Self::acquired(grant)),
            Some(_) => return None,
            None => {}
        }

        let grant = Grant {
            holder: holder.to_string(),
            version: index,
        };
        let out = Self::acquired(&grant);
        self.grant = Some(grant);
        Some(out)
    }
}

impl StateMachine for Lock {
    fn apply(&mut self, commit: &Commit<Value>) -> Result<Value> {
        match LockOp::from_payload(&commit.command)? {
            LockOp::Lock { holder } => {
                if let Some(out) = self.try_grant(&holder, commit.index) {
                    return Ok(out);
                }
                let position = match self.waiters.iter().position(|w| *w == holder) {
                    Some(position) => position,
                    None => {
                        self.waiters.push_back(holder);
                        self.waiters.len() - 1
                    }
                };
                Ok(json!({"acquired": false, "queued": true, "position": position}))
            }
            LockOp::TryLock { holder } => Ok(self
                .try_grant(&holder, commit.index)
                .unwrap_or_else(|| json!({"acquired": false, "queued": false}))),
            LockOp::Unlock { holder } => {
                match &self.grant {
                    Some(grant) if grant.holder == holder => {}
                    _ => {
                        // a waiter giving up its place is not an error
                        if let Some(position) = self.waiters.iter().position(|w| *w == holder) {
                            self.waiters.remove(position);
                            return Ok(json!({"released": false, "next": null}));
                        }
                        return Err(Error::InvalidOperation(format!(
                            "lock is not held by {}",
                            holder
                        )));
                    }
                }

                self.grant = self.waiters.pop_front().map(|next| Grant {
                    holder: next,
                    version: commit.index,
                });
                Ok(json!({"released": true, "next": self.holder()}))
            }
            LockOp::Holder => Ok(match &self.grant {
                Some(grant) => json!({"holder": grant.holder, "version": grant.version}),
                None => json!({"holder": null, "version": null}),
            }),
        }
    }
}
