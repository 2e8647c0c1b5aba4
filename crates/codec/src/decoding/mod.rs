//! Decoding implementations for the batch data.

mod macros;

use crate::{from_be_bytes_slice_and_advance_buf, DecodingError};
use alloy_primitives::{bytes::Buf, Bytes};
use rollup_node_primitives::{BatchContext, EncodedBatch};

/// The length in bytes of the batch header.
pub const BATCH_HEADER_BYTES_LENGTH: usize = 11;

/// The length in bytes of an encoded [`BatchContext`].
pub const BATCH_CONTEXT_BYTES_LENGTH: usize = 16;

/// The length in bytes of the transaction length prefix.
pub const TRANSACTION_LENGTH_BYTES_LENGTH: usize = 3;

/// Decodes the packed batch from the buffer, consuming it entirely.
pub fn decode_batch(buf: &mut &[u8]) -> Result<EncodedBatch, DecodingError> {
    if buf.len() < BATCH_HEADER_BYTES_LENGTH {
        return Err(DecodingError::Eof)
    }
    let should_start_at_batch = from_be_bytes_slice_and_advance_buf!(u64, 5, buf)?;
    let total_elements_to_append = from_be_bytes_slice_and_advance_buf!(u32, 3, buf)?;
    let context_count = from_be_bytes_slice_and_advance_buf!(u32, 3, buf)? as usize;

    if buf.len() < context_count * BATCH_CONTEXT_BYTES_LENGTH {
        return Err(DecodingError::Eof)
    }
    let contexts =
        (0..context_count).map(|_| decode_context(buf)).collect::<Result<Vec<_>, _>>()?;

    let mut transactions = Vec::new();
    while buf.has_remaining() {
        transactions.push(decode_transaction(buf)?);
    }

    Ok(EncodedBatch { should_start_at_batch, total_elements_to_append, contexts, transactions })
}

/// Decodes a [`BatchContext`] from the buffer.
pub fn decode_context(buf: &mut &[u8]) -> Result<BatchContext, DecodingError> {
    if buf.len() < BATCH_CONTEXT_BYTES_LENGTH {
        return Err(DecodingError::Eof)
    }
    let num_sequenced_transactions = from_be_bytes_slice_and_advance_buf!(u32, 3, buf)?;
    let num_subsequent_queue_transactions = from_be_bytes_slice_and_advance_buf!(u32, 3, buf)?;
    let timestamp = from_be_bytes_slice_and_advance_buf!(u64, 5, buf)?;
    let block_number = from_be_bytes_slice_and_advance_buf!(u64, 5, buf)?;

    Ok(BatchContext {
        num_sequenced_transactions,
        num_subsequent_queue_transactions,
        timestamp,
        block_number,
    })
}

/// Decodes a length prefixed transaction from the buffer.
pub fn decode_transaction(buf: &mut &[u8]) -> Result<Bytes, DecodingError> {
    let len = from_be_bytes_slice_and_advance_buf!(u32, TRANSACTION_LENGTH_BYTES_LENGTH, buf)?
        as usize;
    if buf.len() < len {
        return Err(DecodingError::Eof)
    }

    // copy the transaction bytes and advance the buffer.
    let tx = Bytes::copy_from_slice(&buf[..len]);
    buf.advance(len);
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    #[test]
    fn test_should_decode_context() -> eyre::Result<()> {
        let raw = hex!("000002" "000001" "0000006000" "0000000011" "ff");
        let buf = &mut raw.as_slice();

        let context = decode_context(buf)?;

        assert_eq!(context.num_sequenced_transactions, 2);
        assert_eq!(context.num_subsequent_queue_transactions, 1);
        assert_eq!(context.timestamp, 0x6000);
        assert_eq!(context.block_number, 17);
        assert_eq!(*buf, [0xffu8].as_slice());
        Ok(())
    }

    #[test]
    fn test_should_decode_transactions_until_exhausted() -> eyre::Result<()> {
        let raw = hex!("0000000001" "000002" "000000" "000001" "aa" "000000");
        let batch = decode_batch(&mut raw.as_slice())?;

        assert_eq!(batch.should_start_at_batch, 1);
        assert_eq!(batch.total_elements_to_append, 2);
        assert!(batch.contexts.is_empty());
        assert_eq!(batch.transactions, vec![Bytes::from_static(&[0xaa]), Bytes::new()]);
        Ok(())
    }

    #[test]
    fn test_should_fail_on_missing_contexts() {
        // announces two contexts but carries one.
        let raw = hex!("0000000001" "000002" "000002" "000002" "000001" "0000006000" "0000000011");
        assert!(matches!(decode_batch(&mut raw.as_slice()), Err(DecodingError::Eof)));
    }

    #[test]
    fn test_should_fail_on_short_transaction() {
        let raw = hex!("000003" "aabb");
        assert!(matches!(decode_transaction(&mut raw.as_slice()), Err(DecodingError::Eof)));

        let raw = hex!("0000");
        assert!(matches!(decode_transaction(&mut raw.as_slice()), Err(DecodingError::Eof)));
    }
}
