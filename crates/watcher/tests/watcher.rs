//! Delivery tests for the [`ChainEventWatcher`] against the mock chain.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, LogData, B256};
use rollup_db::{test_utils::setup_test_db, DatabaseOperations};
use rollup_node_primitives::{ChainEvent, Cursor, LogFilter};
use rollup_node_providers::test_utils::MockChain;
use rollup_node_watcher::{
    test_utils::RecordingHandler, ChainEventWatcher, WatchTarget, WatcherConfig, WatcherError,
};

fn config() -> WatcherConfig {
    WatcherConfig { retry_backoff: Duration::from_millis(5), ..Default::default() }
}

fn emit(chain: &MockChain, filter: &LogFilter, data: u8) -> B256 {
    chain.stage_transaction(
        filter.address,
        Bytes::new(),
        vec![LogData::new_unchecked(vec![filter.event_signature], Bytes::from(vec![data]))],
    )
}

#[tokio::test]
async fn test_blocks_mined_during_subscription_are_delivered_once_in_order() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_blocks(1);
    let db = setup_test_db().await;
    let (watcher, _fatal) = ChainEventWatcher::new(chain.clone(), db, config());
    let handler = RecordingHandler::new();

    // When
    watcher.subscribe(WatchTarget::Blocks, handler.clone(), true).await;
    handler.wait_for_sync().await;
    chain.mine_block();

    // Then
    handler.wait_for_events(3).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(handler.block_numbers(), vec![0, 1, 2]);
    assert!(handler.events().iter().all(|e| matches!(e, ChainEvent::Block(_))));
    assert_eq!(handler.synced(), vec!["blocks".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_cursor_resumes_delivery() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_blocks(4);
    let db = setup_test_db().await;
    db.set_cursor(Cursor { subscription_id: "blocks".into(), last_processed: 2 }).await?;
    let (watcher, _fatal) = ChainEventWatcher::new(chain.clone(), db.clone(), config());
    let handler = RecordingHandler::new();

    // When
    watcher.subscribe(WatchTarget::Blocks, handler.clone(), true).await;
    handler.wait_for_sync().await;

    // Then
    assert_eq!(handler.block_numbers(), vec![3, 4]);
    assert_eq!(db.get_cursor("blocks").await?, Some(4));

    Ok(())
}

#[tokio::test]
async fn test_confirmations_withhold_recent_blocks() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_blocks(5);
    let db = setup_test_db().await;
    let config = WatcherConfig { confirmations: 3, ..config() };
    let (watcher, _fatal) = ChainEventWatcher::new(chain.clone(), db, config);
    let handler = RecordingHandler::new();

    // When
    watcher.subscribe(WatchTarget::Blocks, handler.clone(), true).await;
    handler.wait_for_sync().await;

    // Then
    assert_eq!(handler.block_numbers(), vec![0, 1, 2, 3]);

    // When
    chain.mine_block();

    // Then
    handler.wait_for_events(5).await;
    assert_eq!(handler.block_numbers(), vec![0, 1, 2, 3, 4]);

    Ok(())
}

#[tokio::test]
async fn test_logs_are_delivered_across_query_ranges_despite_fetch_failures() -> eyre::Result<()> {
    // Given
    let filter = LogFilter::new(Address::repeat_byte(0xaa), B256::repeat_byte(0x01));
    let other = LogFilter::new(Address::repeat_byte(0xbb), B256::repeat_byte(0x01));
    let chain = MockChain::new();
    emit(&chain, &filter, 1);
    emit(&chain, &other, 9);
    chain.mine_block();
    chain.mine_block();
    emit(&chain, &filter, 2);
    emit(&chain, &filter, 3);
    chain.mine_block();
    chain.fail_next_log_queries(2);

    let db = setup_test_db().await;
    let config = WatcherConfig { log_query_block_range: 2, ..config() };
    let (watcher, _fatal) = ChainEventWatcher::new(chain.clone(), db.clone(), config);
    let handler = RecordingHandler::new();

    // When
    watcher.subscribe(WatchTarget::Logs(filter), handler.clone(), true).await;
    handler.wait_for_sync().await;
    emit(&chain, &filter, 4);
    chain.mine_block();

    // Then
    let events = handler.wait_for_events(4).await;
    let data: Vec<_> = events
        .iter()
        .map(|e| match e {
            ChainEvent::Log(log) => log.data[0],
            ChainEvent::Block(_) => panic!("unexpected block event"),
        })
        .collect();
    assert_eq!(data, vec![1, 2, 3, 4]);
    assert_eq!(handler.block_numbers(), vec![1, 3, 3, 4]);
    assert_eq!(db.get_cursor(&WatchTarget::Logs(filter).subscription_id()).await?, Some(4));

    Ok(())
}

#[tokio::test]
async fn test_late_subscriber_is_notified_of_completed_sync() -> eyre::Result<()> {
    let chain = MockChain::with_blocks(2);
    let db = setup_test_db().await;
    let (watcher, _fatal) = ChainEventWatcher::new(chain.clone(), db, config());
    let first = RecordingHandler::new();
    let late = RecordingHandler::new();

    watcher.subscribe(WatchTarget::Blocks, first.clone(), true).await;
    first.wait_for_sync().await;
    assert!(watcher.is_synced(&WatchTarget::Blocks));

    watcher.subscribe(WatchTarget::Blocks, late.clone(), true).await;
    assert_eq!(late.synced(), vec!["blocks".to_string()]);
    assert!(late.events().is_empty());

    chain.mine_block();
    late.wait_for_events(1).await;
    assert_eq!(late.block_numbers(), vec![3]);
    assert_eq!(first.wait_for_events(4).await.len(), 4);

    Ok(())
}

#[tokio::test]
async fn test_without_past_events_delivery_starts_at_next_block() -> eyre::Result<()> {
    let chain = MockChain::with_blocks(3);
    let db = setup_test_db().await;
    let (watcher, _fatal) = ChainEventWatcher::new(chain.clone(), db, config());
    let handler = RecordingHandler::new();

    watcher.subscribe(WatchTarget::Blocks, handler.clone(), false).await;
    handler.wait_for_sync().await;
    assert!(handler.events().is_empty());

    chain.mine_block();
    handler.wait_for_events(1).await;
    assert_eq!(handler.block_numbers(), vec![4]);

    Ok(())
}

#[tokio::test]
async fn test_live_handler_failure_is_fatal() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_blocks(1);
    let db = setup_test_db().await;
    let (watcher, mut fatal) = ChainEventWatcher::new(chain.clone(), db.clone(), config());
    let handler = RecordingHandler::new();
    handler.fail_at_block(2);

    // When
    watcher.subscribe(WatchTarget::Blocks, handler.clone(), true).await;
    handler.wait_for_sync().await;
    chain.mine_block();
    chain.mine_block();

    // Then
    let err = tokio::time::timeout(Duration::from_secs(5), fatal.recv()).await?.unwrap();
    assert!(err.is_fatal());
    assert!(matches!(err, WatcherError::Handler { block_number: 2, .. }));
    assert_eq!(handler.block_numbers(), vec![0, 1]);
    assert_eq!(db.get_cursor("blocks").await?, Some(1));

    Ok(())
}

#[tokio::test]
async fn test_shutdown_drops_heads_subscription() -> eyre::Result<()> {
    let chain = MockChain::new();
    let db = setup_test_db().await;
    let (watcher, _fatal) = ChainEventWatcher::new(chain.clone(), db, config());
    let handler = RecordingHandler::new();

    watcher.subscribe(WatchTarget::Blocks, handler.clone(), true).await;
    handler.wait_for_sync().await;
    assert_eq!(chain.heads_subscriber_count(), 1);

    watcher.shutdown();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(chain.heads_subscriber_count(), 0);

    Ok(())
}

