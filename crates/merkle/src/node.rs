use crate::MerkleError;
use alloy_primitives::{keccak256, B256, U256};

/// The size in bytes of the preimage of a node when hashed into its parent.
const NODE_PREIMAGE_LENGTH: usize = 64;

/// A node of an interval Merkle tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalNode {
    /// The hash of the node.
    pub hash: B256,
    /// The lower bound of the interval covered by the node.
    pub lower_bound: U256,
}

impl IntervalNode {
    /// The node used to pad levels with an odd number of nodes. It sorts after every other node,
    /// so its lower bound [`U256::MAX`] is reserved and rejected on leaves.
    pub const EMPTY: Self = Self { hash: B256::ZERO, lower_bound: U256::MAX };

    /// Returns a new [`IntervalNode`].
    pub const fn new(hash: B256, lower_bound: U256) -> Self {
        Self { hash, lower_bound }
    }

    /// Returns a leaf over the keccak256 hash of the data.
    pub fn leaf(data: &[u8], lower_bound: U256) -> Self {
        Self { hash: keccak256(data), lower_bound }
    }

    /// Returns a node whose lower bound is read from big endian bytes, for example a serialized
    /// index.
    pub fn from_be_bytes(hash: B256, lower_bound: &[u8]) -> Result<Self, MerkleError> {
        let lower_bound = U256::try_from_be_slice(lower_bound)
            .ok_or(MerkleError::LowerBoundTooLarge(lower_bound.len()))?;
        Ok(Self { hash, lower_bound })
    }

    /// Returns true if the node is the padding node.
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Returns the parent of the two nodes, inheriting the lower bound of the left node.
    ///
    /// The parent hash is `keccak256(left.hash ‖ left.lower_bound ‖ right.hash ‖
    /// right.lower_bound)` with bounds as 32 byte big endian words.
    pub fn parent(left: &Self, right: &Self) -> Result<Self, MerkleError> {
        if left.lower_bound >= right.lower_bound {
            return Err(MerkleError::InvalidTreeStructure {
                left: left.lower_bound,
                right: right.lower_bound,
            });
        }

        let mut preimage = Vec::with_capacity(2 * NODE_PREIMAGE_LENGTH);
        left.write_preimage(&mut preimage);
        right.write_preimage(&mut preimage);

        Ok(Self { hash: keccak256(&preimage), lower_bound: left.lower_bound })
    }

    fn write_preimage(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.hash.as_slice());
        buf.extend_from_slice(&self.lower_bound.to_be_bytes::<32>());
    }
}
