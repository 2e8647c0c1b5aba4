use crate::{ChainReader, ProviderError};

use std::time::Duration;

use alloy_primitives::B256;
use rollup_node_primitives::{LogEvent, LogFilter, TransactionReceipt};

/// Polls the reader for the receipt of the transaction until it is available or the timeout
/// elapses. Provider errors while polling are logged and retried on the next poll.
pub async fn wait_for_receipt<R: ChainReader + ?Sized>(
    reader: &R,
    hash: B256,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<TransactionReceipt, ProviderError> {
    let poll = async {
        loop {
            match reader.transaction_receipt(hash).await {
                Ok(Some(receipt)) => return receipt,
                Ok(None) => {
                    tracing::trace!(target: "rollup::providers", %hash, "receipt not yet available")
                }
                Err(err) => {
                    tracing::warn!(target: "rollup::providers", %hash, %err, "failed to fetch receipt, retrying")
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    };
    tokio::time::timeout(timeout, poll).await.map_err(|_| ProviderError::Timeout(timeout))
}

/// Polls the reader for the first log matching the filter at or above `from_block`, until one is
/// found or the timeout elapses. Provider errors while polling are logged and the same range is
/// queried again on the next poll.
pub async fn wait_for_log<R: ChainReader + ?Sized>(
    reader: &R,
    filter: &LogFilter,
    from_block: u64,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<LogEvent, ProviderError> {
    let poll = async {
        let mut next = from_block;
        loop {
            match scan_logs(reader, filter, next).await {
                Ok((Some(log), _)) => return log,
                Ok((None, scanned_to)) => next = scanned_to,
                Err(err) => {
                    tracing::warn!(target: "rollup::providers", from_block = next, %err, "failed to query logs, retrying")
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    };
    tokio::time::timeout(timeout, poll).await.map_err(|_| ProviderError::Timeout(timeout))
}

/// Queries the logs matching the filter from `from_block` to the head. Returns the first match
/// and the block to scan from next.
async fn scan_logs<R: ChainReader + ?Sized>(
    reader: &R,
    filter: &LogFilter,
    from_block: u64,
) -> Result<(Option<LogEvent>, u64), ProviderError> {
    let head = reader.block_number().await?;
    if head < from_block {
        return Ok((None, from_block));
    }
    let log = reader.logs(filter, from_block, head).await?.into_iter().next();
    Ok((log, head + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockChain;

    use alloy_primitives::{address, b256, Address, Bytes, LogData};

    #[tokio::test]
    async fn test_wait_for_receipt_times_out() {
        let chain = MockChain::new();
        let err = wait_for_receipt(
            &chain,
            B256::repeat_byte(1),
            Duration::from_millis(5),
            Duration::from_millis(30),
        )
        .await
        .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_wait_for_receipt_once_mined() -> eyre::Result<()> {
        let chain = MockChain::new();
        let hash = chain.stage_transaction(Address::ZERO, Bytes::new(), vec![]);

        let mined = {
            let chain = chain.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                chain.mine_block()
            })
        };

        let receipt =
            wait_for_receipt(&chain, hash, Duration::from_millis(5), Duration::from_secs(5))
                .await?;
        let block = mined.await?;
        assert_eq!(receipt.transaction_hash, hash);
        assert_eq!(receipt.block_number, Some(block.number));
        assert!(receipt.status);
        Ok(())
    }

    #[tokio::test]
    async fn test_wait_for_receipt_retries_after_provider_error() -> eyre::Result<()> {
        // Given
        let chain = MockChain::new();
        let hash = chain.stage_transaction(Address::ZERO, Bytes::new(), vec![]);
        chain.mine_block();
        chain.fail_next_receipt_queries(1);

        // When
        let receipt =
            wait_for_receipt(&chain, hash, Duration::from_millis(5), Duration::from_secs(5))
                .await?;

        // Then
        assert_eq!(receipt.transaction_hash, hash);
        assert!(receipt.status);
        Ok(())
    }

    #[tokio::test]
    async fn test_wait_for_receipt_times_out_on_persistent_errors() {
        let chain = MockChain::new();
        let hash = chain.stage_transaction(Address::ZERO, Bytes::new(), vec![]);
        chain.mine_block();
        chain.fail_next_receipt_queries(usize::MAX);

        let err = wait_for_receipt(&chain, hash, Duration::from_millis(5), Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_wait_for_log_retries_after_provider_error() -> eyre::Result<()> {
        let emitter = address!("0x00000000000000000000000000000000000000aa");
        let signature = b256!("0x1111111111111111111111111111111111111111111111111111111111111111");
        let filter = LogFilter::new(emitter, signature);
        let chain = MockChain::new();
        chain.stage_transaction(
            emitter,
            Bytes::new(),
            vec![LogData::new_unchecked(vec![signature], Bytes::from_static(&[7]))],
        );
        let block = chain.mine_block();
        chain.fail_next_log_queries(2);

        let log =
            wait_for_log(&chain, &filter, 0, Duration::from_millis(5), Duration::from_secs(1))
                .await?;
        assert_eq!(log.block_number, block.number);
        assert_eq!(log.data, Bytes::from_static(&[7]));
        Ok(())
    }

    #[tokio::test]
    async fn test_wait_for_log_skips_blocks_below_start() -> eyre::Result<()> {
        let emitter = address!("0x00000000000000000000000000000000000000aa");
        let signature = b256!("0x1111111111111111111111111111111111111111111111111111111111111111");
        let filter = LogFilter::new(emitter, signature);
        let chain = MockChain::new();

        chain.stage_transaction(
            emitter,
            Bytes::new(),
            vec![LogData::new_unchecked(vec![signature], Bytes::from_static(&[1]))],
        );
        chain.mine_block();
        chain.stage_transaction(
            emitter,
            Bytes::new(),
            vec![LogData::new_unchecked(vec![signature], Bytes::from_static(&[2]))],
        );
        let second = chain.mine_block();

        let log = wait_for_log(
            &chain,
            &filter,
            second.number,
            Duration::from_millis(5),
            Duration::from_secs(1),
        )
        .await?;
        assert_eq!(log.block_number, second.number);
        assert_eq!(log.data, Bytes::from_static(&[2]));
        Ok(())
    }
}
