//! Built-in resource state machines
//!
//! These are the nested machines registered by
//! [`ResourceTypeRegistry::with_builtin`](crate::directory::ResourceTypeRegistry::with_builtin).
//! Each decodes its payload into a typed operation enum and answers with a
//! JSON value.

pub mod counter;
pub mod id_generator;
pub mod lock;
pub mod map;

pub use counter::{Counter, CounterOp};
pub use id_generator::{IdGenerator, IdGeneratorOp};
pub use lock::{Lock, LockOp};
pub use map::{Map, MapOp};

use crate::common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Conversion between a typed operation and a dispatch payload
pub trait Payload: Serialize + DeserializeOwned {
    fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    fn from_payload(payload: &Value) -> Result<Self> {
        serde_json::from_value(payload.clone())
            .map_err(|e| Error::InvalidOperation(format!("malformed payload {}: {}", payload, e)))
    }
}
