//! Registry behavior driven end to end through the writer queue.

use nr_01_name_indexing::test_utils::{
    content_hash, data_output, frame_output, frame_tx, make_block, name, raw_tx,
    zero_block_hash, FailingKVStore,
};
use nr_01_name_indexing::{
    spawn_registry_writer, Frame, IndexerConfig, IndexingError, InMemoryKVStore, MutationKind,
    MutationOp, NameIndexingService, RegistryHandle,
};

fn spawn_writer(config: IndexerConfig) -> RegistryHandle {
    let (handle, _task) =
        spawn_registry_writer(NameIndexingService::new(InMemoryKVStore::new(), config), 16);
    handle
}

fn journaling() -> IndexerConfig {
    IndexerConfig::default()
}

fn legacy() -> IndexerConfig {
    IndexerConfig {
        journal_disconnects: false,
        ..IndexerConfig::default()
    }
}

// =============================================================================
// CONNECT
// =============================================================================

#[tokio::test]
async fn test_connected_frame_is_looked_up() {
    let registry = spawn_writer(journaling());
    let block = make_block(zero_block_hash(), 1, vec![frame_tx(1, &[(name(1), content_hash(1))])]);

    let batch = registry.connect_block(block, 1).await.unwrap();

    assert_eq!(batch.ops(), &[MutationOp::put(name(1), content_hash(1))]);
    assert_eq!(registry.lookup(name(1)).await.unwrap(), Some(content_hash(1)));
    assert_eq!(registry.lookup(name(2)).await.unwrap(), None);
}

#[tokio::test]
async fn test_within_block_first_writer_wins() {
    let registry = spawn_writer(journaling());
    let block = make_block(
        zero_block_hash(),
        1,
        vec![
            frame_tx(1, &[(name(1), content_hash(1))]),
            frame_tx(2, &[(name(1), content_hash(2))]),
        ],
    );

    registry.connect_block(block, 1).await.unwrap();

    assert_eq!(registry.lookup(name(1)).await.unwrap(), Some(content_hash(1)));
}

#[tokio::test]
async fn test_cross_block_first_writer_wins() {
    let registry = spawn_writer(journaling());
    let first = make_block(zero_block_hash(), 1, vec![frame_tx(1, &[(name(1), content_hash(1))])]);
    let second = make_block(first.block_hash(), 2, vec![frame_tx(2, &[(name(1), content_hash(2))])]);

    registry.connect_block(first, 1).await.unwrap();
    let batch = registry.connect_block(second, 2).await.unwrap();

    assert!(batch.for_name(&name(1)).next().is_none());
    assert_eq!(registry.lookup(name(1)).await.unwrap(), Some(content_hash(1)));
}

#[tokio::test]
async fn test_malformed_frame_is_ignored() {
    let registry = spawn_writer(journaling());
    let mut payload = Frame::new(name(1), content_hash(1)).encode().to_vec();
    payload.truncate(70);
    let block = make_block(zero_block_hash(), 1, vec![raw_tx(1, vec![data_output(&payload)])]);

    let batch = registry.connect_block(block, 1).await.unwrap();

    assert!(batch.is_empty());
    assert_eq!(registry.lookup(name(1)).await.unwrap(), None);
}

#[tokio::test]
async fn test_frames_in_every_output_position_are_found() {
    let registry = spawn_writer(journaling());
    let tx = raw_tx(
        1,
        vec![
            frame_output(name(1), content_hash(1)),
            data_output(b"unrelated op_return"),
            frame_output(name(2), content_hash(2)),
        ],
    );
    let block = make_block(zero_block_hash(), 1, vec![tx]);

    let batch = registry.connect_block(block, 1).await.unwrap();
    assert_eq!(batch.len(), 2);
}

// =============================================================================
// DISCONNECT
// =============================================================================

#[tokio::test]
async fn test_disconnect_removes_entry_it_added() {
    for config in [journaling(), legacy()] {
        let registry = spawn_writer(config);
        let block = make_block(zero_block_hash(), 1, vec![frame_tx(1, &[(name(1), content_hash(1))])]);

        registry.connect_block(block.clone(), 1).await.unwrap();
        let batch = registry.disconnect_block(block, 1).await.unwrap();

        assert!(batch.iter().all(|op| op.kind == MutationKind::Delete));
        assert_eq!(registry.lookup(name(1)).await.unwrap(), None);
    }
}

#[tokio::test]
async fn test_journaled_disconnect_keeps_older_entry() {
    let registry = spawn_writer(journaling());
    let first = make_block(zero_block_hash(), 1, vec![frame_tx(1, &[(name(1), content_hash(1))])]);
    let second = make_block(first.block_hash(), 2, vec![frame_tx(2, &[(name(1), content_hash(2))])]);

    registry.connect_block(first, 1).await.unwrap();
    registry.connect_block(second.clone(), 2).await.unwrap();
    let batch = registry.disconnect_block(second, 2).await.unwrap();

    assert!(batch.is_empty());
    assert_eq!(registry.lookup(name(1)).await.unwrap(), Some(content_hash(1)));
}

#[tokio::test]
async fn test_legacy_disconnect_deletes_every_frame() {
    let registry = spawn_writer(legacy());
    let first = make_block(zero_block_hash(), 1, vec![frame_tx(1, &[(name(1), content_hash(1))])]);
    let second = make_block(first.block_hash(), 2, vec![frame_tx(2, &[(name(1), content_hash(2))])]);

    registry.connect_block(first, 1).await.unwrap();
    registry.connect_block(second.clone(), 2).await.unwrap();
    let batch = registry.disconnect_block(second, 2).await.unwrap();

    assert_eq!(batch.ops(), &[MutationOp::delete(name(1), content_hash(2))]);
    assert_eq!(registry.lookup(name(1)).await.unwrap(), None);
}

#[tokio::test]
async fn test_disconnect_rewinds_tip() {
    let registry = spawn_writer(journaling());
    let first = make_block(zero_block_hash(), 1, vec![]);
    let second = make_block(first.block_hash(), 2, vec![]);

    registry.connect_block(first.clone(), 100).await.unwrap();
    registry.connect_block(second.clone(), 101).await.unwrap();
    registry.disconnect_block(second, 101).await.unwrap();

    let tip = registry.tip().await.unwrap().unwrap();
    assert_eq!(tip.height, 100);
    assert_eq!(tip.hash, first.block_hash());
}

// =============================================================================
// UNCONFIRMED TRANSACTIONS
// =============================================================================

#[tokio::test]
async fn test_unconfirmed_write_is_visible() {
    let registry = spawn_writer(journaling());
    let tx = frame_tx(1, &[(name(1), content_hash(1))]);

    assert_eq!(registry.handle_unconfirmed(tx).await.unwrap(), 1);
    assert_eq!(registry.lookup(name(1)).await.unwrap(), Some(content_hash(1)));
}

#[tokio::test]
async fn test_unconfirmed_does_not_overwrite() {
    let registry = spawn_writer(journaling());

    registry
        .handle_unconfirmed(frame_tx(1, &[(name(1), content_hash(1))]))
        .await
        .unwrap();
    let written = registry
        .handle_unconfirmed(frame_tx(2, &[(name(1), content_hash(2))]))
        .await
        .unwrap();

    assert_eq!(written, 0);
    assert_eq!(registry.lookup(name(1)).await.unwrap(), Some(content_hash(1)));
}

#[tokio::test]
async fn test_confirmed_unconfirmed_write_is_owned_by_block() {
    let registry = spawn_writer(journaling());
    let tx = frame_tx(1, &[(name(1), content_hash(1))]);
    registry.handle_unconfirmed(tx.clone()).await.unwrap();

    let block = make_block(zero_block_hash(), 1, vec![tx]);
    let batch = registry.connect_block(block.clone(), 1).await.unwrap();
    assert!(batch.is_empty());

    registry.disconnect_block(block, 1).await.unwrap();
    assert_eq!(registry.lookup(name(1)).await.unwrap(), None);
}

#[tokio::test]
async fn test_competing_block_does_not_claim_unconfirmed_write() {
    let registry = spawn_writer(journaling());
    registry
        .handle_unconfirmed(frame_tx(1, &[(name(1), content_hash(1))]))
        .await
        .unwrap();

    let block = make_block(zero_block_hash(), 1, vec![frame_tx(2, &[(name(1), content_hash(2))])]);
    registry.connect_block(block.clone(), 1).await.unwrap();
    registry.disconnect_block(block, 1).await.unwrap();

    assert_eq!(registry.lookup(name(1)).await.unwrap(), Some(content_hash(1)));
}

// =============================================================================
// STORE FAILURES
// =============================================================================

#[tokio::test]
async fn test_read_failure_aborts_block_without_partial_batch() {
    let (store, faults) = FailingKVStore::new();
    let (registry, _task) =
        spawn_registry_writer(NameIndexingService::new(store, journaling()), 4);

    faults.fail_reads(true);
    let block = make_block(zero_block_hash(), 1, vec![frame_tx(1, &[(name(1), content_hash(1))])]);
    let result = registry.connect_block(block, 1).await;
    assert!(matches!(result, Err(IndexingError::Store(_))));

    faults.fail_reads(false);
    assert_eq!(registry.lookup(name(1)).await.unwrap(), None);
    assert_eq!(registry.tip().await.unwrap(), None);
}

#[tokio::test]
async fn test_write_failure_commits_nothing() {
    let (store, faults) = FailingKVStore::new();
    let (registry, _task) =
        spawn_registry_writer(NameIndexingService::new(store, journaling()), 4);

    faults.fail_writes(true);
    let block = make_block(
        zero_block_hash(),
        1,
        vec![frame_tx(1, &[(name(1), content_hash(1)), (name(2), content_hash(2))])],
    );
    assert!(registry.connect_block(block, 1).await.is_err());

    faults.fail_writes(false);
    assert_eq!(registry.lookup(name(1)).await.unwrap(), None);
    assert_eq!(registry.lookup(name(2)).await.unwrap(), None);
}

#[tokio::test]
async fn test_unconfirmed_failure_is_reported() {
    let (store, faults) = FailingKVStore::new();
    let (registry, _task) =
        spawn_registry_writer(NameIndexingService::new(store, journaling()), 4);

    faults.fail_reads(true);
    let result = registry
        .handle_unconfirmed(frame_tx(1, &[(name(1), content_hash(1))]))
        .await;
    assert!(matches!(result, Err(IndexingError::Store(_))));
}

// =============================================================================
// QUEUE
// =============================================================================

#[tokio::test]
async fn test_concurrent_writers_leave_one_entry_per_name() {
    let registry = spawn_writer(journaling());
    let mut tasks = Vec::new();

    for seed in 0..20u8 {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            let tx = frame_tx(seed, &[(name(seed % 5), content_hash(seed))]);
            registry.handle_unconfirmed(tx).await
        }));
    }

    let mut written = 0;
    for task in tasks {
        written += task.await.unwrap().unwrap();
    }

    assert_eq!(written, 5);
    for n in 0..5u8 {
        assert!(registry.lookup(name(n)).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn test_requests_after_shutdown_fail() {
    let (registry, task) =
        spawn_registry_writer(NameIndexingService::new_in_memory(journaling()), 4);

    registry.shutdown().await;
    task.await.unwrap();

    assert_eq!(
        registry.lookup(name(1)).await,
        Err(IndexingError::QueueClosed)
    );
}
