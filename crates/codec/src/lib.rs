//! The codec of the sequencer batches appended to the canonical transaction chain.
//!
//! A batch is packed as fixed width big endian fields with no length prefixes besides the
//! context count and the per transaction length:
//!
//! ```text
//! should_start_at_batch (5) | total_elements_to_append (3) | context_count (3)
//! context_count * [num_sequenced (3) | num_queue (3) | timestamp (5) | block_number (5)]
//! * [tx_length (3) | tx_bytes (tx_length)]
//! ```
//!
//! The calldata of an `appendSequencerBatch()` call is the 4 byte selector followed by the
//! packed batch.

pub mod decoding;

pub mod encoding;

pub use error::{CodecError, DecodingError, EncodingError};
mod error;

pub use transaction::{decode_hex_data, RecordSignature, TransactionRecord, TransactionType};
mod transaction;

use alloy_primitives::Bytes;
use rollup_l1::abi::calls::APPEND_SEQUENCER_BATCH_SELECTOR;
use rollup_node_primitives::EncodedBatch;

/// The Codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchCodec;

impl BatchCodec {
    /// Encodes the batch.
    pub fn encode(batch: &EncodedBatch) -> Result<Bytes, CodecError> {
        Ok(encoding::encode_batch(batch)?.into())
    }

    /// Decodes the batch from the input, which must be consumed entirely.
    pub fn decode(input: &[u8]) -> Result<EncodedBatch, CodecError> {
        Ok(decoding::decode_batch(&mut &input[..])?)
    }

    /// Encodes the batch as the calldata of an `appendSequencerBatch()` call.
    pub fn encode_append_sequencer_batch(batch: &EncodedBatch) -> Result<Bytes, CodecError> {
        let encoded = encoding::encode_batch(batch)?;
        let mut calldata = Vec::with_capacity(APPEND_SEQUENCER_BATCH_SELECTOR.len() + encoded.len());
        calldata.extend_from_slice(&APPEND_SEQUENCER_BATCH_SELECTOR);
        calldata.extend_from_slice(&encoded);
        Ok(calldata.into())
    }

    /// Decodes the batch from the calldata of an `appendSequencerBatch()` call.
    pub fn decode_append_sequencer_batch(calldata: &[u8]) -> Result<EncodedBatch, CodecError> {
        let selector = calldata.get(0..4).ok_or(DecodingError::Eof)?;
        if selector != APPEND_SEQUENCER_BATCH_SELECTOR {
            return Err(DecodingError::InvalidSelector(Bytes::copy_from_slice(selector)).into())
        }
        Self::decode(&calldata[4..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{bytes, hex};
    use arbitrary::Arbitrary;
    use rand::Rng;
    use rollup_node_primitives::{BatchContext, MAX_U24, MAX_U40};

    fn batch() -> EncodedBatch {
        EncodedBatch {
            should_start_at_batch: 0x0102030405,
            total_elements_to_append: 3,
            contexts: vec![BatchContext {
                num_sequenced_transactions: 2,
                num_subsequent_queue_transactions: 1,
                timestamp: 0x6000,
                block_number: 17,
            }],
            transactions: vec![bytes!("aabb"), bytes!("cc")],
        }
    }

    #[test]
    fn test_should_encode_packed_layout() -> eyre::Result<()> {
        let encoded = BatchCodec::encode(&batch())?;

        let expected = hex!(
            "0102030405" "000003" "000001"
            "000002" "000001" "0000006000" "0000000011"
            "000002" "aabb"
            "000001" "cc"
        );
        assert_eq!(encoded.as_ref(), expected.as_slice());
        Ok(())
    }

    #[test]
    fn test_should_round_trip_arbitrary_batches() -> eyre::Result<()> {
        let mut rng = rand::rng();
        for _ in 0..20 {
            let mut bytes = [0u8; 4096];
            rng.fill(bytes.as_mut_slice());
            let mut u = arbitrary::Unstructured::new(&bytes);
            let batch = EncodedBatch::arbitrary(&mut u)?;

            let encoded = BatchCodec::encode(&batch)?;
            assert_eq!(BatchCodec::decode(&encoded)?, batch);
        }
        Ok(())
    }

    #[test]
    fn test_should_round_trip_empty_batch() -> eyre::Result<()> {
        let batch = EncodedBatch::default();
        let encoded = BatchCodec::encode(&batch)?;

        assert_eq!(encoded.len(), 11);
        assert_eq!(BatchCodec::decode(&encoded)?, batch);
        Ok(())
    }

    #[test]
    fn test_should_reject_overflowing_fields() {
        let mut overflow = batch();
        overflow.should_start_at_batch = MAX_U40 + 1;
        assert!(matches!(
            BatchCodec::encode(&overflow),
            Err(CodecError::Encoding(EncodingError::ValueOverflow {
                field: "should_start_at_batch",
                width: 5
            }))
        ));

        let mut overflow = batch();
        overflow.contexts[0].num_sequenced_transactions = MAX_U24 + 1;
        assert!(matches!(
            BatchCodec::encode(&overflow),
            Err(CodecError::Encoding(EncodingError::ValueOverflow { width: 3, .. }))
        ));
    }

    #[test]
    fn test_should_fail_on_truncated_input() -> eyre::Result<()> {
        let encoded = BatchCodec::encode(&batch())?;

        for len in [0, 4, 10, 20, encoded.len() - 1] {
            assert!(matches!(
                BatchCodec::decode(&encoded[..len]),
                Err(CodecError::Decoding(DecodingError::Eof))
            ));
        }
        Ok(())
    }

    #[test]
    fn test_should_frame_calldata_with_selector() -> eyre::Result<()> {
        let calldata = BatchCodec::encode_append_sequencer_batch(&batch())?;

        assert_eq!(calldata[..4], APPEND_SEQUENCER_BATCH_SELECTOR);
        assert_eq!(calldata[4..], BatchCodec::encode(&batch())?[..]);
        assert_eq!(BatchCodec::decode_append_sequencer_batch(&calldata)?, batch());

        let mut wrong_selector = calldata.to_vec();
        wrong_selector[0] ^= 0xff;
        assert!(matches!(
            BatchCodec::decode_append_sequencer_batch(&wrong_selector),
            Err(CodecError::Decoding(DecodingError::InvalidSelector(_)))
        ));
        Ok(())
    }
}
