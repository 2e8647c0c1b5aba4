use crate::{IntervalNode, MerkleError};
use alloy_primitives::{B256, U256};

/// A proof that a leaf is included in an interval Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionProof {
    /// The position of the leaf in the tree.
    pub leaf_position: usize,
    /// The siblings on the path from the leaf to the root, bottom up.
    pub siblings: Vec<IntervalNode>,
}

/// The outcome of verifying an [`InclusionProof`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InclusionVerification {
    /// Whether the computed root matches the expected root.
    pub valid: bool,
    /// The exclusive upper bound of the interval owned by the leaf. [`U256::MAX`] if the leaf has
    /// no right sibling on its path.
    pub upper_bound: U256,
}

impl InclusionProof {
    /// Recomputes the root from the leaf and returns it with the upper bound of the leaf
    /// interval.
    ///
    /// Fails if the position does not fit the proof height or if the sibling bounds are not
    /// monotonic.
    pub fn compute_root(&self, leaf: &IntervalNode) -> Result<(IntervalNode, U256), MerkleError> {
        let leaves = 1usize.checked_shl(self.siblings.len() as u32).unwrap_or(usize::MAX);
        if self.leaf_position >= leaves {
            return Err(MerkleError::InvalidLeafPosition { position: self.leaf_position, leaves });
        }

        let mut current = *leaf;
        let mut upper_bound: Option<U256> = None;
        let mut position = self.leaf_position;

        for sibling in &self.siblings {
            current = if position % 2 == 0 {
                // right siblings higher up must not sort before the first one.
                match upper_bound {
                    Some(bound) if sibling.lower_bound < bound => {
                        return Err(MerkleError::InvalidTreeStructure {
                            left: bound,
                            right: sibling.lower_bound,
                        })
                    }
                    Some(_) => {}
                    None => upper_bound = Some(sibling.lower_bound),
                }
                IntervalNode::parent(&current, sibling)?
            } else {
                IntervalNode::parent(sibling, &current)?
            };
            position /= 2;
        }

        Ok((current, upper_bound.unwrap_or(U256::MAX)))
    }

    /// Verifies the proof of the leaf against the expected root hash.
    pub fn verify(
        &self,
        leaf: &IntervalNode,
        root: B256,
    ) -> Result<InclusionVerification, MerkleError> {
        let (computed, upper_bound) = self.compute_root(leaf)?;
        Ok(InclusionVerification { valid: computed.hash == root, upper_bound })
    }
}
