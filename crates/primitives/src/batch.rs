use alloy_primitives::Bytes;

/// The largest value representable in a 3 byte field.
pub const MAX_U24: u32 = (1 << 24) - 1;

/// The largest value representable in a 5 byte field.
pub const MAX_U40: u64 = (1 << 40) - 1;

/// The context of a group of transactions in a sequencer batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchContext {
    /// The number of sequenced transactions in the context.
    pub num_sequenced_transactions: u32,
    /// The number of queue transactions following the sequenced ones.
    pub num_subsequent_queue_transactions: u32,
    /// The timestamp of the context, a 40 bit value.
    pub timestamp: u64,
    /// The base chain block number of the context, a 40 bit value.
    pub block_number: u64,
}

/// A sequencer batch as appended to the canonical transaction chain.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EncodedBatch {
    /// The index of the first element of the batch, a 40 bit value.
    pub should_start_at_batch: u64,
    /// The total number of elements appended by the batch, a 24 bit value.
    pub total_elements_to_append: u32,
    /// The batch contexts.
    pub contexts: Vec<BatchContext>,
    /// The raw transactions of the batch.
    pub transactions: Vec<Bytes>,
}

#[cfg(feature = "arbitrary")]
impl arbitrary::Arbitrary<'_> for BatchContext {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        Ok(Self {
            num_sequenced_transactions: u.int_in_range(0..=MAX_U24)?,
            num_subsequent_queue_transactions: u.int_in_range(0..=MAX_U24)?,
            timestamp: u.int_in_range(0..=MAX_U40)?,
            block_number: u.int_in_range(0..=MAX_U40)?,
        })
    }
}

#[cfg(feature = "arbitrary")]
impl arbitrary::Arbitrary<'_> for EncodedBatch {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let contexts_len = u.int_in_range(0..=8)?;
        let contexts =
            (0..contexts_len).map(|_| BatchContext::arbitrary(u)).collect::<Result<_, _>>()?;
        let transactions_len = u.int_in_range(0..=8)?;
        let transactions = (0..transactions_len)
            .map(|_| {
                let len = u.int_in_range(0..=256)?;
                Ok(Bytes::copy_from_slice(u.bytes(len)?))
            })
            .collect::<arbitrary::Result<_>>()?;

        Ok(Self {
            should_start_at_batch: u.int_in_range(0..=MAX_U40)?,
            total_elements_to_append: u.int_in_range(0..=MAX_U24)?,
            contexts,
            transactions,
        })
    }
}
