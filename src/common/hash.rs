//! Hashing utilities for miniprim
//!
//! - BLAKE3 for stable, platform independent key digests
//! - Modulo sharding and HRW (Highest Random Weight) for partition selection

/// First 8 bytes of BLAKE3(data) as a little endian u64
pub fn hash64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut word = [0u8; 8];
    word.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(word)
}

/// Compute the bucket for a key among `buckets` slots.
///
/// Returns 0 when `buckets` is 0.
pub fn shard_key(key: &[u8], buckets: u64) -> u64 {
    if buckets == 0 {
        return 0;
    }
    hash64(key) % buckets
}

/// HRW weight of `node` for `key`.
pub fn hrw_weight(key: &[u8], node: &[u8]) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(key);
    hasher.update(node);
    let hash = hasher.finalize();
    let mut word = [0u8; 8];
    word.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(word)
}

/// HRW (Highest Random Weight) hashing
///
/// Returns the index of the node with the highest weight for `key`.
/// Ties are broken by the lower index so the result only depends on inputs.
pub fn hrw_select<N: AsRef<[u8]>>(key: &[u8], nodes: &[N]) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (idx, node) in nodes.iter().enumerate() {
        let weight = hrw_weight(key, node.as_ref());
        match best {
            Some((_, best_weight)) if best_weight >= weight => {}
            _ => best = Some((idx, weight)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_key_deterministic() {
        let key = b"test-key";
        let shard1 = shard_key(key, 256);
        let shard2 = shard_key(key, 256);
        assert_eq!(shard1, shard2);
        assert!(shard1 < 256);
        assert_eq!(shard_key(key, 0), 0);
    }

    #[test]
    fn test_hrw_select_consistent() {
        let nodes = ["partition-1", "partition-2", "partition-3"];

        let first = hrw_select(b"my-key", &nodes);
        let second = hrw_select(b"my-key", &nodes);

        assert_eq!(first, second);
        assert!(first.unwrap() < 3);
        assert_eq!(hrw_select::<&str>(b"my-key", &[]), None);
    }

    #[test]
    fn test_hrw_spreads_keys() {
        let nodes = ["partition-1", "partition-2", "partition-3"];
        let mut hits = [0usize; 3];
        for i in 0..300 {
            let idx = hrw_select(format!("key-{}", i).as_bytes(), &nodes).unwrap();
            hits[idx] += 1;
        }
        assert!(hits.iter().all(|&h| h > 0));
    }

    #[test]
    fn test_hrw_removal_only_moves_owned_keys() {
        let all = ["partition-1", "partition-2", "partition-3"];
        let fewer = ["partition-1", "partition-3"];
        for i in 0..100 {
            let key = format!("key-{}", i);
            let before = all[hrw_select(key.as_bytes(), &all).unwrap()];
            let after = fewer[hrw_select(key.as_bytes(), &fewer).unwrap()];
            if before != "partition-2" {
                assert_eq!(before, after);
            }
        }
    }
}
