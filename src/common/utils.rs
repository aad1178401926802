//! Utility functions for miniprim

use std::time::{SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp (milliseconds)
///
/// A clock set before the epoch reads as 0.
pub fn timestamp_now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now_millis() {
        let a = timestamp_now_millis();
        let b = timestamp_now_millis();
        assert!(a > 0);
        assert!(b >= a);
    }
}
