use alloy_json_rpc::RpcError;
use alloy_transport::TransportErrorKind;
use rollup_node_primitives::RollupNodePrimitiveError;
use std::time::Duration;

/// An error occurring at a base chain provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A provider error at the RPC level.
    #[error("base chain rpc error: {0:?}")]
    Rpc(#[from] RpcError<TransportErrorKind>),
    /// The provider returned a log that could not be validated.
    #[error("invalid log: {0}")]
    InvalidLog(#[from] RollupNodePrimitiveError),
    /// The awaited value did not become available before the timeout elapsed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// The subscription was closed by the provider.
    #[error("subscription closed")]
    SubscriptionClosed,
    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Returns true if the error is a timeout.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
