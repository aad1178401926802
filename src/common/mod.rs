//! Common utilities and types shared across miniprim

pub mod config;
pub mod error;
pub mod hash;
pub mod utils;

pub use self::config::{Config, GroupConfig, RouterConfig, DEFAULT_GROUP};
pub use error::{Error, Result};
pub use hash::{hash64, hrw_select, hrw_weight, shard_key};
pub use utils::timestamp_now_millis;
