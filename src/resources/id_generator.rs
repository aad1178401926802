//! Replicated id generator

use super::Payload;
use crate::common::{Error, Result};
use crate::directory::{Commit, StateMachine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum IdGeneratorOp {
    /// Next id, starting at 1
    Next,
    /// Reserve `size` ids, answered as the half-open range `{start, end}`
    NextBatch { size: u64 },
}

impl Payload for IdGeneratorOp {}

#[derive(Debug, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    fn reserve(&mut self, size: u64) -> Result<(u64, u64)> {
        let end = self
            .last
            .checked_add(size)
            .and_then(|last| last.checked_add(1))
            .ok_or_else(|| Error::InvalidOperation("id space exhausted".into()))?;
        let start = self.last + 1;
        self.last = end - 1;
        Ok((start, end))
    }
}

impl StateMachine for IdGenerator {
    fn apply(&mut self, commit: &Commit<Value>) -> Result<Value> {
        match IdGeneratorOp::from_payload(&commit.command)? {
            IdGeneratorOp::Next => {
                let (start, _) = self.reserve(1)?;
                Ok(json!(start))
            }
            IdGeneratorOp::NextBatch { size: 0 } => {
                Err(Error::InvalidOperation("batch size must be positive".into()))
            }
            IdGeneratorOp::NextBatch { size } => {
                let (start, end) = self.reserve(size)?;
                Ok(json!({"start": start, "end": end}))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(gen: &mut IdGenerator, op: IdGeneratorOp) -> Result<Value> {
        gen.apply(&Commit::new(1, 0, op.to_payload()))
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut gen = IdGenerator::default();
        assert_eq!(run(&mut gen, IdGeneratorOp::Next).unwrap(), json!(1));
        assert_eq!(run(&mut gen, IdGeneratorOp::Next).unwrap(), json!(2));
        assert_eq!(
            run(&mut gen, IdGeneratorOp::NextBatch { size: 10 }).unwrap(),
            json!({"start": 3, "end": 13})
        );
        assert_eq!(run(&mut gen, IdGeneratorOp::Next).unwrap(), json!(13));
    }

    #[test]
    fn test_empty_batch_rejected() {
        let mut gen = IdGenerator::default();
        assert!(run(&mut gen, IdGeneratorOp::NextBatch { size: 0 }).is_err());
        assert_eq!(run(&mut gen, IdGeneratorOp::Next).unwrap(), json!(1));
    }
}
