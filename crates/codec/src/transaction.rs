use crate::{
    encoding::put_fixed_width, from_be_bytes_slice_and_advance_buf, DecodingError, EncodingError,
};
use alloy_primitives::{
    bytes::{Buf, BufMut},
    hex, Address, Bytes, FixedBytes, B256,
};

/// A 65 byte `r ‖ s ‖ v` signature.
pub type RecordSignature = FixedBytes<65>;

/// The type discriminant of a [`TransactionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransactionType {
    /// A record creating an externally owned account.
    EoaCreation = 0x00,
    /// A standard transaction record.
    Standard = 0x01,
}

impl TryFrom<u8> for TransactionType {
    type Error = DecodingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::EoaCreation),
            0x01 => Ok(Self::Standard),
            ty => Err(DecodingError::InvalidTxType(ty)),
        }
    }
}

/// A transaction of a sequencer batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionRecord {
    /// `type (1) ‖ signature (65) ‖ message_hash (32)`.
    EoaCreation {
        /// The signature over the message hash.
        signature: RecordSignature,
        /// The signed message hash.
        message_hash: B256,
    },
    /// `type (1) ‖ signature (65) ‖ gas_limit (2) ‖ gas_price (1) ‖ nonce (3) ‖ target (20) ‖
    /// data`.
    Standard {
        /// The transaction signature.
        signature: RecordSignature,
        /// The gas limit.
        gas_limit: u16,
        /// The gas price.
        gas_price: u8,
        /// The sender nonce, a 24 bit value.
        nonce: u32,
        /// The target of the call.
        target: Address,
        /// The call data.
        data: Bytes,
    },
}

impl TransactionRecord {
    /// The length in bytes of an encoded [`TransactionRecord::EoaCreation`].
    pub const EOA_CREATION_BYTES_LENGTH: usize = 98;

    /// The length in bytes of an encoded [`TransactionRecord::Standard`] without its data.
    pub const STANDARD_HEADER_BYTES_LENGTH: usize = 92;

    /// Returns the type of the record.
    pub const fn tx_type(&self) -> TransactionType {
        match self {
            Self::EoaCreation { .. } => TransactionType::EoaCreation,
            Self::Standard { .. } => TransactionType::Standard,
        }
    }

    /// Encodes the record.
    pub fn encode(&self) -> Result<Bytes, EncodingError> {
        let mut buf = Vec::with_capacity(match self {
            Self::EoaCreation { .. } => Self::EOA_CREATION_BYTES_LENGTH,
            Self::Standard { data, .. } => Self::STANDARD_HEADER_BYTES_LENGTH + data.len(),
        });
        buf.put_u8(self.tx_type() as u8);

        match self {
            Self::EoaCreation { signature, message_hash } => {
                buf.put_slice(signature.as_slice());
                buf.put_slice(message_hash.as_slice());
            }
            Self::Standard { signature, gas_limit, gas_price, nonce, target, data } => {
                buf.put_slice(signature.as_slice());
                buf.put_u16(*gas_limit);
                buf.put_u8(*gas_price);
                put_fixed_width(&mut buf, *nonce as u64, 3, "nonce")?;
                buf.put_slice(target.as_slice());
                buf.put_slice(data);
            }
        }

        Ok(buf.into())
    }

    /// Decodes a record from the input, dispatching on the leading type discriminant.
    pub fn decode(input: &[u8]) -> Result<Self, DecodingError> {
        let buf = &mut &input[..];
        let record = Self::try_from_buf(buf)?;
        if buf.has_remaining() {
            return Err(DecodingError::TrailingBytes(buf.remaining()))
        }
        Ok(record)
    }

    /// Tries to read a record from the buffer. Standard records consume the rest of the buffer as
    /// their data.
    pub(crate) fn try_from_buf(buf: &mut &[u8]) -> Result<Self, DecodingError> {
        let ty = from_be_bytes_slice_and_advance_buf!(u8, buf)?;
        match TransactionType::try_from(ty)? {
            TransactionType::EoaCreation => {
                if buf.len() < Self::EOA_CREATION_BYTES_LENGTH - 1 {
                    return Err(DecodingError::Eof)
                }
                let signature = RecordSignature::from_slice(&buf[..65]);
                buf.advance(65);
                let message_hash = B256::from_slice(&buf[..32]);
                buf.advance(32);

                Ok(Self::EoaCreation { signature, message_hash })
            }
            TransactionType::Standard => {
                if buf.len() < Self::STANDARD_HEADER_BYTES_LENGTH - 1 {
                    return Err(DecodingError::Eof)
                }
                let signature = RecordSignature::from_slice(&buf[..65]);
                buf.advance(65);
                let gas_limit = from_be_bytes_slice_and_advance_buf!(u16, buf)?;
                let gas_price = from_be_bytes_slice_and_advance_buf!(u8, buf)?;
                let nonce = from_be_bytes_slice_and_advance_buf!(u32, 3, buf)?;
                let target = Address::from_slice(&buf[..20]);
                buf.advance(20);
                let data = Bytes::copy_from_slice(&buf[..]);
                buf.advance(buf.len());

                Ok(Self::Standard { signature, gas_limit, gas_price, nonce, target, data })
            }
        }
    }
}

/// Decodes hex encoded transaction data, with or without a `0x` prefix. Odd length data is
/// rejected.
pub fn decode_hex_data(data: &str) -> Result<Bytes, EncodingError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    if digits.len() % 2 != 0 {
        return Err(EncodingError::OddLengthData(digits.len()))
    }
    Ok(hex::decode(digits)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};
    use rand::Rng;
    use rollup_node_primitives::MAX_U24;

    fn signature() -> RecordSignature {
        RecordSignature::repeat_byte(0x5a)
    }

    fn standard() -> TransactionRecord {
        TransactionRecord::Standard {
            signature: signature(),
            gas_limit: 0x1234,
            gas_price: 7,
            nonce: 0x010203,
            target: address!("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"),
            data: bytes!("abcdabcd"),
        }
    }

    #[test]
    fn test_should_encode_standard_record() -> eyre::Result<()> {
        let encoded = standard().encode()?;

        assert_eq!(encoded.len(), TransactionRecord::STANDARD_HEADER_BYTES_LENGTH + 4);
        assert_eq!(encoded[0], 0x01);
        assert_eq!(encoded[1..66], signature()[..]);
        assert_eq!(encoded[66..68], [0x12, 0x34]);
        assert_eq!(encoded[68], 7);
        assert_eq!(encoded[69..72], [0x01, 0x02, 0x03]);
        assert_eq!(encoded[72..92], [0xbb; 20]);
        assert_eq!(encoded[92..], [0xab, 0xcd, 0xab, 0xcd]);

        assert_eq!(TransactionRecord::decode(&encoded)?, standard());
        Ok(())
    }

    #[test]
    fn test_should_round_trip_eoa_creation_record() -> eyre::Result<()> {
        let record = TransactionRecord::EoaCreation {
            signature: signature(),
            message_hash: B256::repeat_byte(0x42),
        };
        let encoded = record.encode()?;

        assert_eq!(encoded.len(), TransactionRecord::EOA_CREATION_BYTES_LENGTH);
        assert_eq!(encoded[0], 0x00);
        assert_eq!(TransactionRecord::decode(&encoded)?, record);
        Ok(())
    }

    #[test]
    fn test_should_round_trip_random_records() -> eyre::Result<()> {
        let mut rng = rand::rng();
        for i in 0..50 {
            let mut signature = RecordSignature::ZERO;
            rng.fill(signature.as_mut_slice());

            let record = if i % 2 == 0 {
                let message_hash = B256::from(rng.random::<[u8; 32]>());
                TransactionRecord::EoaCreation { signature, message_hash }
            } else {
                let mut data = vec![0u8; rng.random_range(0..256)];
                rng.fill(data.as_mut_slice());
                TransactionRecord::Standard {
                    signature,
                    gas_limit: rng.random(),
                    gas_price: rng.random(),
                    nonce: rng.random_range(0..=MAX_U24),
                    target: Address::from(rng.random::<[u8; 20]>()),
                    data: data.into(),
                }
            };

            let encoded = record.encode()?;
            assert_eq!(TransactionRecord::decode(&encoded)?, record);
        }
        Ok(())
    }

    #[test]
    fn test_should_round_trip_standard_record_without_data() -> eyre::Result<()> {
        let record = TransactionRecord::Standard {
            signature: signature(),
            gas_limit: u16::MAX,
            gas_price: u8::MAX,
            nonce: MAX_U24,
            target: Address::ZERO,
            data: Bytes::new(),
        };
        let encoded = record.encode()?;

        assert_eq!(encoded.len(), TransactionRecord::STANDARD_HEADER_BYTES_LENGTH);
        assert_eq!(TransactionRecord::decode(&encoded)?, record);
        Ok(())
    }

    #[test]
    fn test_should_reject_unknown_type() -> eyre::Result<()> {
        let mut encoded = standard().encode()?.to_vec();
        encoded[0] = 0x02;

        assert!(matches!(TransactionRecord::decode(&encoded), Err(DecodingError::InvalidTxType(2))));
        Ok(())
    }

    #[test]
    fn test_should_reject_truncated_records() -> eyre::Result<()> {
        let encoded = standard().encode()?;
        assert!(matches!(
            TransactionRecord::decode(&encoded[..TransactionRecord::STANDARD_HEADER_BYTES_LENGTH - 1]),
            Err(DecodingError::Eof)
        ));
        assert!(matches!(TransactionRecord::decode(&[]), Err(DecodingError::Eof)));

        let mut eoa = TransactionRecord::EoaCreation {
            signature: signature(),
            message_hash: B256::ZERO,
        }
        .encode()?
        .to_vec();
        eoa.push(0);
        assert!(matches!(TransactionRecord::decode(&eoa), Err(DecodingError::TrailingBytes(1))));
        Ok(())
    }

    #[test]
    fn test_should_reject_overflowing_nonce() {
        let TransactionRecord::Standard { signature, gas_limit, gas_price, target, data, .. } =
            standard()
        else {
            unreachable!()
        };
        let record = TransactionRecord::Standard {
            signature,
            gas_limit,
            gas_price,
            nonce: 1 << 24,
            target,
            data,
        };

        assert!(matches!(
            record.encode(),
            Err(EncodingError::ValueOverflow { field: "nonce", width: 3 })
        ));
    }

    #[test]
    fn test_decode_hex_data() -> eyre::Result<()> {
        assert_eq!(decode_hex_data("0xabcd")?, bytes!("abcd"));
        assert_eq!(decode_hex_data("")?, Bytes::new());
        assert!(matches!(decode_hex_data("0xabc"), Err(EncodingError::OddLengthData(3))));
        assert!(matches!(decode_hex_data("zz"), Err(EncodingError::InvalidHex(_))));
        Ok(())
    }
}
