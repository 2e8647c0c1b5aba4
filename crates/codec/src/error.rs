use alloy_primitives::Bytes;

/// An error occurring during the codec process.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// An error occurring at the decoding state.
    #[error(transparent)]
    Decoding(#[from] DecodingError),
    /// An error occurring at the encoding state.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// An error occurring during the decoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodingError {
    /// The input ended before the value was fully read.
    #[error("end of file")]
    Eof,
    /// The calldata does not start with the expected selector.
    #[error("invalid selector {0}")]
    InvalidSelector(Bytes),
    /// The transaction record has an unknown type discriminant.
    #[error("invalid transaction type {0:#04x}")]
    InvalidTxType(u8),
    /// The input has bytes left after the value was read.
    #[error("{0} trailing bytes")]
    TrailingBytes(usize),
}

/// An error occurring during the encoding.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    /// The value does not fit in the width of its field.
    #[error("value of {field} does not fit in {width} bytes")]
    ValueOverflow {
        /// The name of the field.
        field: &'static str,
        /// The width of the field in bytes.
        width: usize,
    },
    /// The hex encoded data has an odd number of digits.
    #[error("odd length hex data of {0} digits")]
    OddLengthData(usize),
    /// The data is not valid hex.
    #[error(transparent)]
    InvalidHex(#[from] alloy_primitives::hex::FromHexError),
}
