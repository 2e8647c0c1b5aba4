/// A single key/value record held by the durable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// The metadata key.
    pub key: String,
    /// The metadata value.
    pub value: String,
}

impl Metadata {
    /// The key under which the last verified batch number is stored.
    pub const LAST_VERIFIED_BATCH: &'static str = "last_verified_batch";

    /// The key under which the reported fraud holding back the verified watermark is stored, as
    /// `<batch_number>:<batch_index>`.
    pub const OPEN_FRAUD: &'static str = "open_fraud";

    /// Returns the key under which the cursor for the provided subscription is stored.
    pub fn cursor_key(subscription_id: &str) -> String {
        format!("cursor:{subscription_id}")
    }
}
