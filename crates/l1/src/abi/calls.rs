use alloy_primitives::B256;
use alloy_sol_types::{sol, SolCall};
use std::vec::Vec;

sol! {
    /// Appends a sequencer batch. The batch is not ABI encoded: it follows the selector as a
    /// packed byte stream.
    #[cfg_attr(feature = "test-utils", derive(arbitrary::Arbitrary))]
    #[derive(Debug)]
    function appendSequencerBatch() external;

    #[cfg_attr(feature = "test-utils", derive(arbitrary::Arbitrary))]
    #[derive(Debug)]
    function appendStateBatch(bytes32[] _batch, uint256 _shouldStartAtElement) external;
}

/// The selector of the `appendSequencerBatch()` call.
pub const APPEND_SEQUENCER_BATCH_SELECTOR: [u8; 4] = appendSequencerBatchCall::SELECTOR;

/// A call to append a state batch on the state commitment chain.
#[derive(Debug, derive_more::From)]
pub struct AppendStateBatchCall(appendStateBatchCall);

impl AppendStateBatchCall {
    /// Tries to decode the calldata into an [`AppendStateBatchCall`].
    pub fn try_decode(calldata: &[u8]) -> Option<Self> {
        match calldata.get(0..4) {
            Some(selector) if selector == appendStateBatchCall::SELECTOR => {
                appendStateBatchCall::abi_decode(calldata).map(Into::into).ok()
            }
            Some(_) | None => None,
        }
    }

    /// Returns the state roots of the batch.
    pub fn state_roots(&self) -> Vec<B256> {
        self.0._batch.clone()
    }

    /// Returns the index of the first element the batch should start at.
    pub fn should_start_at_element(&self) -> u64 {
        self.0._shouldStartAtElement.saturating_to()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{keccak256, U256};

    #[test]
    fn test_append_sequencer_batch_selector() {
        assert_eq!(APPEND_SEQUENCER_BATCH_SELECTOR, keccak256("appendSequencerBatch()")[..4]);
    }

    #[test]
    fn test_should_decode_append_state_batch() {
        let roots = vec![keccak256("1"), keccak256("2"), keccak256("3")];
        let calldata = appendStateBatchCall {
            _batch: roots.clone(),
            _shouldStartAtElement: U256::from(9),
        }
        .abi_encode();

        let call = AppendStateBatchCall::try_decode(&calldata).expect("valid calldata");
        assert_eq!(call.state_roots(), roots);
        assert_eq!(call.should_start_at_element(), 9);
    }

    #[test]
    fn test_should_reject_unknown_selector() {
        let mut calldata = appendStateBatchCall { _batch: vec![], _shouldStartAtElement: U256::ZERO }
            .abi_encode();
        calldata[0] ^= 0xff;

        assert!(AppendStateBatchCall::try_decode(&calldata).is_none());
        assert!(AppendStateBatchCall::try_decode(&[0x01]).is_none());
    }
}
