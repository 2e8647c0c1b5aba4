//! Encoding implementations for the batch data.

use crate::{
    decoding::{BATCH_CONTEXT_BYTES_LENGTH, BATCH_HEADER_BYTES_LENGTH},
    EncodingError,
};
use alloy_primitives::bytes::BufMut;
use rollup_node_primitives::{BatchContext, EncodedBatch};

/// Writes the value as a big endian unsigned integer of `width` bytes, left padded with zeros.
/// Fails if the value does not fit in `width` bytes.
pub fn put_fixed_width(
    buf: &mut Vec<u8>,
    value: u64,
    width: usize,
    field: &'static str,
) -> Result<(), EncodingError> {
    if width < 8 && value >> (8 * width) != 0 {
        return Err(EncodingError::ValueOverflow { field, width })
    }
    buf.put_uint(value, width);
    Ok(())
}

/// Encodes the batch into its packed representation.
pub fn encode_batch(batch: &EncodedBatch) -> Result<Vec<u8>, EncodingError> {
    let transactions_len = batch.transactions.iter().map(|tx| tx.len() + 3).sum::<usize>();
    let mut buf = Vec::with_capacity(
        BATCH_HEADER_BYTES_LENGTH +
            batch.contexts.len() * BATCH_CONTEXT_BYTES_LENGTH +
            transactions_len,
    );

    put_fixed_width(&mut buf, batch.should_start_at_batch, 5, "should_start_at_batch")?;
    put_fixed_width(&mut buf, batch.total_elements_to_append as u64, 3, "total_elements_to_append")?;
    put_fixed_width(&mut buf, batch.contexts.len() as u64, 3, "context_count")?;

    for context in &batch.contexts {
        encode_context(&mut buf, context)?;
    }
    for tx in &batch.transactions {
        put_fixed_width(&mut buf, tx.len() as u64, 3, "transaction_length")?;
        buf.put_slice(tx);
    }

    Ok(buf)
}

/// Encodes the context into the buffer.
pub fn encode_context(buf: &mut Vec<u8>, context: &BatchContext) -> Result<(), EncodingError> {
    put_fixed_width(buf, context.num_sequenced_transactions as u64, 3, "num_sequenced_transactions")?;
    put_fixed_width(
        buf,
        context.num_subsequent_queue_transactions as u64,
        3,
        "num_subsequent_queue_transactions",
    )?;
    put_fixed_width(buf, context.timestamp, 5, "timestamp")?;
    put_fixed_width(buf, context.block_number, 5, "block_number")
}
