use crate::RollupNodePrimitiveError;
use alloy_primitives::{Address, Bytes, B256};

/// An event observed on the base chain.
///
/// Events are validated when they are constructed so that downstream handlers never need to
/// check which fields are present.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainEvent {
    /// A new block.
    Block(BlockEvent),
    /// A log emitted by a contract.
    Log(LogEvent),
}

impl ChainEvent {
    /// Returns the number of the block the event belongs to.
    pub const fn block_number(&self) -> u64 {
        match self {
            Self::Block(block) => block.number,
            Self::Log(log) => log.block_number,
        }
    }

    /// Returns the `(block number, log index)` position of the event. Blocks sort at index zero.
    pub const fn position(&self) -> (u64, u64) {
        match self {
            Self::Block(block) => (block.number, 0),
            Self::Log(log) => log.position(),
        }
    }

    /// Returns the hash of the block the event belongs to.
    pub const fn block_hash(&self) -> B256 {
        match self {
            Self::Block(block) => block.hash,
            Self::Log(log) => log.block_hash,
        }
    }
}

/// A base chain block header summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct BlockEvent {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: B256,
    /// The hash of the parent block.
    pub parent_hash: B256,
    /// The block timestamp.
    pub timestamp: u64,
}

impl BlockEvent {
    /// Returns the [`crate::BlockInfo`] for the block.
    pub const fn block_info(&self) -> crate::BlockInfo {
        crate::BlockInfo::new(self.number, self.hash)
    }
}

/// A log emitted by a base chain contract, included in a block.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LogEvent {
    /// The address of the emitting contract.
    pub address: Address,
    /// The log topics. The first topic is the event signature hash.
    pub topics: Vec<B256>,
    /// The log data.
    pub data: Bytes,
    /// The number of the block that includes the log.
    pub block_number: u64,
    /// The hash of the block that includes the log.
    pub block_hash: B256,
    /// The hash of the transaction that emitted the log.
    pub transaction_hash: B256,
    /// The index of the log in the block.
    pub log_index: u64,
}

impl LogEvent {
    /// Returns the event signature hash of the log, if any.
    pub fn signature(&self) -> Option<B256> {
        self.topics.first().copied()
    }

    /// Returns the `(block number, log index)` position of the log, which totally orders logs.
    pub const fn position(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }

    /// Returns the log as a primitive [`alloy_primitives::Log`], suitable for ABI decoding.
    pub fn to_primitive_log(&self) -> alloy_primitives::Log {
        alloy_primitives::Log::new_unchecked(self.address, self.topics.clone(), self.data.clone())
    }
}

impl TryFrom<alloy_rpc_types_eth::Log> for LogEvent {
    type Error = RollupNodePrimitiveError;

    fn try_from(log: alloy_rpc_types_eth::Log) -> Result<Self, Self::Error> {
        if log.removed {
            return Err(RollupNodePrimitiveError::RemovedLog);
        }
        let block_number =
            log.block_number.ok_or(RollupNodePrimitiveError::MissingBlockNumber)?;
        let block_hash = log.block_hash.ok_or(RollupNodePrimitiveError::MissingBlockHash)?;
        let transaction_hash =
            log.transaction_hash.ok_or(RollupNodePrimitiveError::MissingTransactionHash)?;
        let log_index = log.log_index.ok_or(RollupNodePrimitiveError::MissingLogIndex)?;

        Ok(Self {
            address: log.inner.address,
            topics: log.inner.data.topics().to_vec(),
            data: log.inner.data.data.clone(),
            block_number,
            block_hash,
            transaction_hash,
            log_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, LogData};

    fn rpc_log() -> alloy_rpc_types_eth::Log {
        alloy_rpc_types_eth::Log {
            inner: alloy_primitives::Log {
                address: address!("0x5300000000000000000000000000000000000000"),
                data: LogData::new_unchecked(
                    vec![b256!(
                        "0x1111111111111111111111111111111111111111111111111111111111111111"
                    )],
                    Bytes::from_static(&[1, 2, 3]),
                ),
            },
            block_hash: Some(B256::repeat_byte(2)),
            block_number: Some(10),
            block_timestamp: None,
            transaction_hash: Some(B256::repeat_byte(3)),
            transaction_index: Some(0),
            log_index: Some(4),
            removed: false,
        }
    }

    #[test]
    fn test_should_convert_complete_log() {
        let log = LogEvent::try_from(rpc_log()).unwrap();

        assert_eq!(log.block_number, 10);
        assert_eq!(log.position(), (10, 4));
        assert_eq!(log.signature(), Some(B256::repeat_byte(0x11)));
        assert_eq!(log.data, Bytes::from_static(&[1, 2, 3]));
    }

    #[test]
    fn test_should_reject_pending_log() {
        let mut log = rpc_log();
        log.block_number = None;
        assert_eq!(LogEvent::try_from(log), Err(RollupNodePrimitiveError::MissingBlockNumber));

        let mut log = rpc_log();
        log.block_hash = None;
        assert_eq!(LogEvent::try_from(log), Err(RollupNodePrimitiveError::MissingBlockHash));

        let mut log = rpc_log();
        log.removed = true;
        assert_eq!(LogEvent::try_from(log), Err(RollupNodePrimitiveError::RemovedLog));
    }

    #[test]
    fn test_chain_event_serde() {
        let event = ChainEvent::Log(LogEvent::try_from(rpc_log()).unwrap());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"log\""));
        assert_eq!(serde_json::from_str::<ChainEvent>(&json).unwrap(), event);
    }
}
