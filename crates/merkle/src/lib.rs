//! An interval Merkle tree.
//!
//! Every node of the tree carries a lower bound next to its hash. Leaves must be supplied with
//! strictly increasing lower bounds and a parent inherits the lower bound of its left child. An
//! inclusion proof for a leaf therefore also proves the exclusive interval `[lower, upper)` owned
//! by the leaf, where `upper` is the lower bound of the first right sibling met on the way to the
//! root.

pub use error::MerkleError;
mod error;

pub use node::IntervalNode;
mod node;

pub use proof::{InclusionProof, InclusionVerification};
mod proof;

/// An interval Merkle tree, stored level by level from the leaves up to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalMerkleTree {
    levels: Vec<Vec<IntervalNode>>,
    leaf_count: usize,
}

impl IntervalMerkleTree {
    /// Builds the tree over the provided leaves.
    ///
    /// Levels with an odd number of nodes are padded with [`IntervalNode::EMPTY`]. Returns an
    /// error if the leaves are empty, a leaf uses the padding lower bound, or their lower bounds
    /// are not strictly increasing.
    pub fn build(leaves: Vec<IntervalNode>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }
        let reserved = IntervalNode::EMPTY.lower_bound;
        if let Some(position) = leaves.iter().position(|leaf| leaf.lower_bound == reserved) {
            return Err(MerkleError::ReservedLowerBound(position));
        }
        let leaf_count = leaves.len();

        let mut levels = Vec::new();
        let mut current = leaves;
        while current.len() > 1 {
            if current.len() % 2 == 1 {
                current.push(IntervalNode::EMPTY);
            }
            let next = current
                .chunks_exact(2)
                .map(|pair| IntervalNode::parent(&pair[0], &pair[1]))
                .collect::<Result<Vec<_>, _>>()?;
            levels.push(current);
            current = next;
        }
        levels.push(current);

        Ok(Self { levels, leaf_count })
    }

    /// Returns the root node of the tree.
    pub fn root(&self) -> IntervalNode {
        self.levels[self.height()][0]
    }

    /// Returns the height of the tree, `ceil(log2(leaves))`.
    pub fn height(&self) -> usize {
        self.levels.len() - 1
    }

    /// Returns the number of leaves in the tree, excluding padding.
    pub const fn len(&self) -> usize {
        self.leaf_count
    }

    /// Returns true if the tree has no leaves. A built tree always has at least one.
    pub const fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Returns the leaves of the tree, excluding padding.
    pub fn leaves(&self) -> &[IntervalNode] {
        &self.levels[0][..self.leaf_count]
    }

    /// Returns the inclusion proof for the leaf at the provided position.
    pub fn inclusion_proof(&self, leaf_position: usize) -> Result<InclusionProof, MerkleError> {
        let leaves = self.len();
        if leaf_position >= leaves {
            return Err(MerkleError::InvalidLeafPosition { position: leaf_position, leaves });
        }

        let mut siblings = Vec::with_capacity(self.height());
        let mut index = leaf_position;
        for level in &self.levels[..self.height()] {
            // padded levels always have an even length.
            siblings.push(level[index ^ 1]);
            index /= 2;
        }

        Ok(InclusionProof { leaf_position, siblings })
    }
}
