// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use shard_kv_core::{
    key_to_shard, Clerk, ClerkError, Connector, GetArgs, GetReply, Gid, KvErr, PutAppendArgs,
    PutAppendOp, PutAppendReply, Random, ServerEnd, ShardConfig, ShardMaster, Timer,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================
// Test doubles
// ============================================================

struct FixedRandom(i64);

impl Random for FixedRandom {
    fn i64(&self, _range: std::ops::Range<i64>) -> i64 {
        self.0
    }
}

/// Yields instead of sleeping and counts retry passes
#[derive(Clone, Default)]
struct CountingTimer {
    sleeps: Arc<AtomicUsize>,
}

#[async_trait]
impl Timer for CountingTimer {
    async fn sleep(&self, _duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }
}

#[derive(Clone, Default)]
struct FakeMaster {
    config: Arc<Mutex<ShardConfig>>,
    queries: Arc<AtomicUsize>,
}

impl FakeMaster {
    fn publish(&self, config: ShardConfig) {
        *self.config.lock().unwrap() = config;
    }
}

#[async_trait]
impl ShardMaster for FakeMaster {
    async fn query(&self, _num: i64) -> ShardConfig {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.config.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct ClusterState {
    data: HashMap<String, String>,
    server_group: HashMap<String, Gid>,
    owned: HashMap<Gid, HashSet<usize>>,
    leaders: HashSet<String>,
    lost_replies: usize,
    last_applied: HashMap<i64, u64>,
    put_requests: Vec<(String, u64)>,
}

impl ClusterState {
    fn check(&self, server: &str, key: &str) -> Result<(), (bool, KvErr)> {
        let gid = self.server_group.get(server).copied().unwrap_or(0);
        let owns = self
            .owned
            .get(&gid)
            .is_some_and(|shards| shards.contains(&key_to_shard(key)));
        if !owns {
            return Err((false, KvErr::WrongGroup));
        }
        if !self.leaders.contains(server) {
            return Err((true, KvErr::Ok));
        }
        Ok(())
    }
}

/// Shared in-memory store served by named replicas
#[derive(Clone, Default)]
struct FakeCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl FakeCluster {
    fn add_server(&self, server: &str, gid: Gid, leader: bool) {
        let mut state = self.state.lock().unwrap();
        state.server_group.insert(server.to_string(), gid);
        if leader {
            state.leaders.insert(server.to_string());
        }
    }

    fn assign(&self, gid: Gid, shards: impl IntoIterator<Item = usize>) {
        let mut state = self.state.lock().unwrap();
        for owned in state.owned.values_mut() {
            owned.clear();
        }
        state.owned.insert(gid, shards.into_iter().collect());
    }

    fn lose_next_replies(&self, count: usize) {
        self.state.lock().unwrap().lost_replies = count;
    }

    fn value(&self, key: &str) -> Option<String> {
        self.state.lock().unwrap().data.get(key).cloned()
    }

    fn put_requests(&self) -> Vec<(String, u64)> {
        self.state.lock().unwrap().put_requests.clone()
    }
}

struct FakeEnd {
    server: String,
    state: Arc<Mutex<ClusterState>>,
}

#[async_trait]
impl ServerEnd for FakeEnd {
    async fn get(&self, args: &GetArgs) -> Option<GetReply> {
        let state = self.state.lock().unwrap();
        if let Err((wrong_leader, err)) = state.check(&self.server, &args.key) {
            return Some(GetReply {
                wrong_leader,
                err,
                value: String::new(),
            });
        }
        Some(match state.data.get(&args.key) {
            Some(value) => GetReply {
                wrong_leader: false,
                err: KvErr::Ok,
                value: value.clone(),
            },
            None => GetReply {
                wrong_leader: false,
                err: KvErr::NoKey,
                value: String::new(),
            },
        })
    }

    async fn put_append(&self, args: &PutAppendArgs) -> Option<PutAppendReply> {
        let mut state = self.state.lock().unwrap();
        state
            .put_requests
            .push((self.server.clone(), args.request_id));
        if let Err((wrong_leader, err)) = state.check(&self.server, &args.key) {
            return Some(PutAppendReply { wrong_leader, err });
        }

        let duplicate = state
            .last_applied
            .get(&args.client_id)
            .is_some_and(|last| *last >= args.request_id);
        if duplicate {
            return Some(PutAppendReply {
                wrong_leader: false,
                err: KvErr::Outdated,
            });
        }

        match args.op {
            PutAppendOp::Put => {
                state.data.insert(args.key.clone(), args.value.clone());
            }
            PutAppendOp::Append => {
                state
                    .data
                    .entry(args.key.clone())
                    .or_default()
                    .push_str(&args.value);
            }
        }
        state.last_applied.insert(args.client_id, args.request_id);

        if state.lost_replies > 0 {
            state.lost_replies -= 1;
            return None;
        }
        Some(PutAppendReply {
            wrong_leader: false,
            err: KvErr::Ok,
        })
    }
}

impl Connector for FakeCluster {
    type End = FakeEnd;

    fn connect(&self, server: &str) -> FakeEnd {
        FakeEnd {
            server: server.to_string(),
            state: self.state.clone(),
        }
    }
}

fn config(num: u64, gid: Gid, servers: &[&str]) -> ShardConfig {
    let mut config = ShardConfig {
        num,
        ..Default::default()
    };
    config.shards = [gid; shard_kv_core::N_SHARDS];
    config
        .groups
        .insert(gid, servers.iter().map(|s| s.to_string()).collect());
    config
}

/// Group 1 with a follower listed before its leader
fn single_group() -> (FakeMaster, FakeCluster) {
    let master = FakeMaster::default();
    master.publish(config(1, 1, &["g1-follower", "g1-leader"]));
    let cluster = FakeCluster::default();
    cluster.add_server("g1-follower", 1, false);
    cluster.add_server("g1-leader", 1, true);
    cluster.assign(1, 0..shard_kv_core::N_SHARDS);
    (master, cluster)
}

type TestClerk = Clerk<FakeMaster, FakeCluster, CountingTimer>;

fn clerk(master: &FakeMaster, cluster: &FakeCluster, timer: &CountingTimer) -> TestClerk {
    Clerk::new(
        master.clone(),
        cluster.clone(),
        timer.clone(),
        &FixedRandom(42),
    )
}

// ============================================================
// Basic operations
// ============================================================

#[tokio::test]
async fn test_put_get_append_through_leader() {
    let (master, cluster) = single_group();
    let timer = CountingTimer::default();
    let clerk = clerk(&master, &cluster, &timer);

    clerk.put("apple", "red").await.unwrap();
    assert_eq!(clerk.get("apple").await.unwrap(), "red");

    clerk.append("apple", "-ish").await.unwrap();
    assert_eq!(clerk.get("apple").await.unwrap(), "red-ish");
    assert_eq!(clerk.client_id(), 42);
    assert_eq!(timer.sleeps.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_get_missing_key_is_empty() {
    let (master, cluster) = single_group();
    let timer = CountingTimer::default();
    let clerk = clerk(&master, &cluster, &timer);

    assert_eq!(clerk.get("nothing").await.unwrap(), "");
}

#[tokio::test]
async fn test_first_call_fetches_configuration() {
    let (master, cluster) = single_group();
    let timer = CountingTimer::default();
    let clerk = clerk(&master, &cluster, &timer);
    assert_eq!(clerk.config().await.num, 0);

    clerk.put("k", "v").await.unwrap();

    assert_eq!(clerk.config().await.num, 1);
    assert_eq!(master.queries.load(Ordering::SeqCst), 1);
}

// ============================================================
// Retries
// ============================================================

#[tokio::test]
async fn test_lost_reply_is_retried_with_same_request_id() {
    let (master, cluster) = single_group();
    let timer = CountingTimer::default();
    let clerk = clerk(&master, &cluster, &timer);

    cluster.lose_next_replies(1);
    clerk.append("log", "x").await.unwrap();

    assert_eq!(cluster.value("log").as_deref(), Some("x"), "Applied once");
    let leader_requests: Vec<u64> = cluster
        .put_requests()
        .into_iter()
        .filter(|(server, _)| server == "g1-leader")
        .map(|(_, id)| id)
        .collect();
    assert_eq!(leader_requests.len(), 2);
    assert_eq!(leader_requests[0], leader_requests[1]);
    assert_eq!(timer.sleeps.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_request_ids_increase_across_calls() {
    let (master, cluster) = single_group();
    let timer = CountingTimer::default();
    let clerk = clerk(&master, &cluster, &timer);

    clerk.put("a", "1").await.unwrap();
    clerk.get("a").await.unwrap();
    clerk.append("a", "2").await.unwrap();

    let ids: Vec<u64> = cluster
        .put_requests()
        .into_iter()
        .filter(|(server, _)| server == "g1-leader")
        .map(|(_, id)| id)
        .collect();
    assert_eq!(ids, vec![0, 2]);
    assert_eq!(cluster.value("a").as_deref(), Some("12"));
}

#[tokio::test]
async fn test_wrong_group_triggers_reconfiguration() {
    let (master, cluster) = single_group();
    cluster.add_server("g2-leader", 2, true);
    let timer = CountingTimer::default();
    let clerk = clerk(&master, &cluster, &timer);

    clerk.put("moved", "before").await.unwrap();

    // Shards move to group 2; the clerk still holds configuration 1
    cluster.assign(2, 0..shard_kv_core::N_SHARDS);
    master.publish(config(2, 2, &["g2-leader"]));

    clerk.put("moved", "after").await.unwrap();

    assert_eq!(cluster.value("moved").as_deref(), Some("after"));
    assert_eq!(clerk.config().await.num, 2);
    assert_eq!(timer.sleeps.load(Ordering::SeqCst), 1);

    let first_group_tries = cluster
        .put_requests()
        .into_iter()
        .filter(|(server, id)| server.starts_with("g1-") && *id == 1)
        .count();
    assert_eq!(first_group_tries, 1, "Rest of a wrong group is skipped");
}

#[tokio::test]
async fn test_unknown_group_waits_for_configuration() {
    let master = FakeMaster::default();
    let cluster = FakeCluster::default();
    cluster.add_server("g3-leader", 3, true);
    cluster.assign(3, [key_to_shard("late")]);
    let timer = CountingTimer::default();
    let clerk = Arc::new(clerk(&master, &cluster, &timer));

    let pending = {
        let clerk = clerk.clone();
        tokio::spawn(async move { clerk.put("late", "value").await })
    };

    while timer.sleeps.load(Ordering::SeqCst) < 3 {
        tokio::task::yield_now().await;
    }
    master.publish(config(1, 3, &["g3-leader"]));

    tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(cluster.value("late").as_deref(), Some("value"));
}

// ============================================================
// Cancellation
// ============================================================

#[tokio::test]
async fn test_cancellation_stops_retrying() {
    let master = FakeMaster::default();
    let cluster = FakeCluster::default();
    let timer = CountingTimer::default();
    let token = CancellationToken::new();
    let clerk = Arc::new(clerk(&master, &cluster, &timer).with_cancellation(token.clone()));

    let pending = {
        let clerk = clerk.clone();
        tokio::spawn(async move { clerk.get("never").await })
    };

    while timer.sleeps.load(Ordering::SeqCst) < 2 {
        tokio::task::yield_now().await;
    }
    token.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .unwrap()
        .unwrap();
    match result {
        Err(ClerkError::Cancelled { op, key, passes }) => {
            assert_eq!(op, "GET");
            assert_eq!(key, "never");
            assert!(passes >= 2);
        }
        other => panic!("Expected cancellation, got {:?}", other),
    }
}
