use rollup_codec::CodecError;
use rollup_node_primitives::RollupNodePrimitiveError;

/// The error type for database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// A database error occurred.
    #[error("database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),
    /// A batch submission was not found in the database.
    #[error("batch submission {0} not found in database")]
    BatchNotFound(u64),
    /// The stored batch data failed to encode or decode.
    #[error("batch data codec error: {0}")]
    Codec(#[from] CodecError),
    /// A stored value could not be converted into its primitive type.
    #[error("invalid stored value: {0}")]
    InvalidValue(#[from] RollupNodePrimitiveError),
    /// A stored metadata value could not be parsed.
    #[error("invalid metadata value for key {key}: {value}")]
    InvalidMetadata {
        /// The metadata key.
        key: String,
        /// The stored value.
        value: String,
    },
}
