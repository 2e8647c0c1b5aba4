use alloy_primitives::U256;

/// An error occurring while building or verifying an interval Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MerkleError {
    /// The tree was built without leaves.
    #[error("cannot build a tree without leaves")]
    EmptyTree,
    /// The leaf position is outside of the tree.
    #[error("invalid leaf position {position} for tree with {leaves} leaves")]
    InvalidLeafPosition {
        /// The requested position.
        position: usize,
        /// The number of leaves in the tree.
        leaves: usize,
    },
    /// The lower bounds of sibling nodes are not strictly increasing.
    #[error("invalid tree structure: left lower bound {left} is not below right lower bound {right}")]
    InvalidTreeStructure {
        /// The lower bound of the left node.
        left: U256,
        /// The lower bound of the right node.
        right: U256,
    },
    /// A leaf carries the lower bound reserved for padding.
    #[error("leaf at position {0} uses the reserved lower bound U256::MAX")]
    ReservedLowerBound(usize),
    /// The lower bound does not fit in 32 bytes.
    #[error("lower bound of {0} bytes exceeds 32 bytes")]
    LowerBoundTooLarge(usize),
}
