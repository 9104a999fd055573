// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const N_SHARDS: usize = 10;

/// Passed to the shard master to ask for the newest configuration
pub const LATEST_CONFIG: i64 = -1;

/// Replica group id, 0 means no group
pub type Gid = u64;

/// Which shard a key lives in
pub fn key_to_shard(key: &str) -> usize {
    key.as_bytes()
        .first()
        .map(|b| *b as usize % N_SHARDS)
        .unwrap_or(0)
}

/// Shard to group assignment published by the shard master
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardConfig {
    pub num: u64,
    pub shards: [Gid; N_SHARDS],
    pub groups: HashMap<Gid, Vec<String>>,
}

impl ShardConfig {
    /// Servers of the group that owns `key`, if that group is known
    pub fn servers_for(&self, key: &str) -> Option<(Gid, &[String])> {
        let gid = self.shards[key_to_shard(key)];
        self.groups
            .get(&gid)
            .map(|servers| (gid, servers.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_to_shard_uses_first_byte() {
        assert_eq!(key_to_shard(""), 0);
        assert_eq!(key_to_shard("a"), b'a' as usize % N_SHARDS);
        assert_eq!(key_to_shard("abc"), key_to_shard("a"));
        assert_eq!(key_to_shard("2"), b'2' as usize % N_SHARDS);
    }

    #[test]
    fn test_servers_for_unknown_group() {
        let mut config = ShardConfig::default();
        assert!(config.servers_for("k").is_none());

        config.shards[key_to_shard("k")] = 3;
        config.groups.insert(3, vec!["s1".to_string()]);
        let (gid, servers) = config.servers_for("k").unwrap();
        assert_eq!(gid, 3);
        assert_eq!(servers, ["s1".to_string()]);
    }
}
