//! Replicated log substrate
//!
//! The directory only needs commits delivered once, in index order,
//! identically to every replica. [`LocalLog`] provides that inside one
//! process so partitions can be assembled and exercised without a network.

pub mod local_log;

pub use local_log::LocalLog;
