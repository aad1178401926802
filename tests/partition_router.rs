//! Partition router: service creation, routing and failure aggregation

use async_trait::async_trait;
use miniprim::common::RouterConfig;
use miniprim::directory::{Command, CommandOutput, ResourceType, ResourceTypeRegistry};
use miniprim::partition::{
    LocalPartitionClient, LocalPartitionGroup, Partition, PartitionClient, PartitionGroup,
    PartitionId, PartitionRouter, PartitionService, Partitioner, PartitionerKind, ServiceId,
};
use miniprim::resources::{CounterOp, LockOp, Payload};
use miniprim::substrate::LocalLog;
use miniprim::{Error, Result};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn registry() -> Arc<ResourceTypeRegistry> {
    Arc::new(ResourceTypeRegistry::with_builtin())
}

fn local_group(name: &str, partitions: u32) -> Arc<LocalPartitionGroup> {
    Arc::new(LocalPartitionGroup::with_local_logs(
        name,
        partitions,
        1,
        registry(),
    ))
}

fn router_over(group: Arc<LocalPartitionGroup>, config: RouterConfig) -> PartitionRouter {
    let service = PartitionService::new(group.name().to_string()).with_group(group);
    PartitionRouter::new(config, Arc::new(service))
}

/// Partition whose log is unreachable
struct FailingClient {
    attempts: AtomicUsize,
}

#[async_trait]
impl PartitionClient for FailingClient {
    async fn submit(&self, _command: Command) -> Result<CommandOutput> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::Internal("partition-2 unavailable".into()))
    }
}

/// Always picks the last partition
struct LastPartitioner;

impl Partitioner for LastPartitioner {
    fn partition(&self, _key: &[u8], partitions: &[PartitionId]) -> Option<PartitionId> {
        partitions.last().copied()
    }
}

#[tokio::test]
async fn creates_one_client_per_partition() {
    let group = local_group("raft", 3);
    let router = router_over(group.clone(), RouterConfig::default());

    let client = router
        .create_service(ServiceId::new("hits", ResourceType::counter()))
        .await
        .unwrap();
    assert_eq!(
        client.partitions(),
        [PartitionId(1), PartitionId(2), PartitionId(3)]
    );

    for partition in group.partitions() {
        let log = group.log(partition.id()).unwrap();
        let bound = log
            .read(|d| d.node("/counter/hits").and_then(|n| n.resource()))
            .await;
        assert!(bound.is_some(), "{} has no resource", partition.id());
    }
}

#[tokio::test]
async fn one_failing_partition_fails_creation() {
    let logs: Vec<_> = (1..=3)
        .map(|n| Arc::new(LocalLog::new(format!("p{}", n), registry(), 1)))
        .collect();
    let failing = Arc::new(FailingClient {
        attempts: AtomicUsize::new(0),
    });
    let partitions = vec![
        Partition::new(
            PartitionId(1),
            Arc::new(LocalPartitionClient::new(logs[0].clone())),
        ),
        Partition::new(PartitionId(2), failing.clone()),
        Partition::new(
            PartitionId(3),
            Arc::new(LocalPartitionClient::new(logs[2].clone())),
        ),
    ];
    let group = Arc::new(LocalPartitionGroup::new("raft", partitions));
    let router = router_over(group, RouterConfig::default());

    let err = router
        .create_service(ServiceId::new("lockA", ResourceType::lock()))
        .await
        .unwrap_err();

    match err {
        Error::PartitionCreation { service, source } => {
            assert_eq!(service, "lock:lockA");
            assert!(matches!(*source, Error::Internal(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(failing.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retry_after_failure_reuses_resources() {
    let group = local_group("raft", 2);
    let router = router_over(group.clone(), RouterConfig::default());
    let service = ServiceId::new("hits", ResourceType::counter());

    let first = router.create_service(service.clone()).await.unwrap();
    let second = router.create_service(service).await.unwrap();
    for (a, b) in first.clients().iter().zip(second.clients()) {
        assert_eq!(a.resource(), b.resource());
    }
    let log = group.log(PartitionId(1)).unwrap();
    assert_eq!(log.read(|d| d.resource_count()).await, 1);
}

#[tokio::test]
async fn routing_is_deterministic() {
    for kind in [PartitionerKind::Hash, PartitionerKind::Rendezvous] {
        let router = router_over(
            local_group("raft", 3),
            RouterConfig::default().with_partitioner(kind),
        );
        let client = router
            .create_service(ServiceId::new("m", ResourceType::map()))
            .await
            .unwrap();
        for i in 0..20 {
            let key = format!("key-{}", i);
            assert_eq!(
                client.partition_for(&key).unwrap(),
                client.partition_for(&key).unwrap()
            );
        }
    }
}

#[tokio::test]
async fn same_key_preserves_order() {
    let router = router_over(local_group("raft", 3), RouterConfig::default());
    let counter = router
        .create_service(ServiceId::new("hits", ResourceType::counter()))
        .await
        .unwrap();

    for expected in 1..=5 {
        let value = counter
            .execute("page-1", CounterOp::Increment.to_payload())
            .await
            .unwrap();
        assert_eq!(value, json!(expected));
    }

    // every other partition kept its own counter untouched
    let owner = counter.partition_for("page-1").unwrap();
    for partition in counter.partitions() {
        let value = counter
            .execute_on(*partition, CounterOp::Get.to_payload())
            .await
            .unwrap();
        let expected = if *partition == owner { 5 } else { 0 };
        assert_eq!(value, json!(expected));
    }
}

#[tokio::test]
async fn custom_partitioner() {
    let router = router_over(local_group("raft", 3), RouterConfig::default())
        .with_partitioner(Arc::new(LastPartitioner));
    let client = router
        .create_service(ServiceId::new("m", ResourceType::map()))
        .await
        .unwrap();
    assert_eq!(client.partition_for("anything").unwrap(), PartitionId(3));
}

#[tokio::test]
async fn lock_is_shared_between_clients() {
    let group = local_group("raft", 3);
    let a = router_over(group.clone(), RouterConfig::default());
    let b = router_over(group, RouterConfig::default());
    let service = ServiceId::new("lockA", ResourceType::lock());

    let lock_a = a.create_service(service.clone()).await.unwrap();
    let lock_b = b.create_service(service).await.unwrap();
    assert_eq!(
        lock_a.partition_for("lockA").unwrap(),
        lock_b.partition_for("lockA").unwrap()
    );

    let grant = lock_a
        .execute("lockA", LockOp::Lock { holder: "a".into() }.to_payload())
        .await
        .unwrap();
    assert_eq!(grant["acquired"], json!(true));

    let queued = lock_b
        .execute("lockA", LockOp::Lock { holder: "b".into() }.to_payload())
        .await
        .unwrap();
    assert_eq!(queued["queued"], json!(true));

    let released = lock_a
        .execute("lockA", LockOp::Unlock { holder: "a".into() }.to_payload())
        .await
        .unwrap();
    assert_eq!(released["next"], json!("b"));
}

#[tokio::test]
async fn primitive_type_conflict_fails_creation() {
    let router = router_over(local_group("raft", 2), RouterConfig::default());
    router
        .create_service(ServiceId::new("x", ResourceType::lock()))
        .await
        .unwrap();

    let err = router
        .create_service(ServiceId::new("x", ResourceType::map()))
        .await
        .unwrap_err();
    match err {
        Error::PartitionCreation { source, .. } => {
            assert!(matches!(*source, Error::PrimitiveTypeMismatch { .. }));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn group_resolution() {
    let service = PartitionService::new("raft")
        .with_group(local_group("raft", 1))
        .with_group(local_group("data", 4));
    let service = Arc::new(service);

    let default = PartitionRouter::new(RouterConfig::default(), service.clone());
    assert_eq!(default.group().unwrap().name(), "raft");

    let data = PartitionRouter::new(RouterConfig::default().with_group("data"), service.clone());
    let client = data
        .create_service(ServiceId::new("m", ResourceType::map()))
        .await
        .unwrap();
    assert_eq!(client.partitions().len(), 4);

    let missing = PartitionRouter::new(RouterConfig::default().with_group("nope"), service);
    let err = missing
        .create_service(ServiceId::new("m", ResourceType::map()))
        .await
        .unwrap_err();
    match err {
        Error::PartitionCreation { source, .. } => {
            assert!(matches!(*source, Error::PartitionGroupNotFound(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn empty_group_fails_creation() {
    let group = Arc::new(LocalPartitionGroup::new("raft", vec![]));
    let router = router_over(group, RouterConfig::default());
    let err = router
        .create_service(ServiceId::new("m", ResourceType::map()))
        .await
        .unwrap_err();
    match err {
        Error::PartitionCreation { source, .. } => {
            assert!(matches!(*source, Error::NoPartitions(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn close_deletes_resources() {
    let group = local_group("raft", 2);
    let router = router_over(group.clone(), RouterConfig::default());
    let counter = router
        .create_service(ServiceId::new("hits", ResourceType::counter()))
        .await
        .unwrap();
    let stale = counter.clients()[0].clone();

    counter.close().await.unwrap();

    for partition in group.partitions() {
        let log = group.log(partition.id()).unwrap();
        assert_eq!(log.read(|d| d.resource_count()).await, 0);
        assert!(log.read(|d| d.path_exists("/counter/hits")).await);
    }
    let err = stale
        .execute(CounterOp::Get.to_payload())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownResource(_)));
}
