use alloy_primitives::B256;

/// A committed state root and the state root computed by re-executing the same transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct StateRootPair {
    /// The state root committed to the base chain.
    pub committed_root: B256,
    /// The state root computed locally.
    pub computed_root: B256,
}

impl StateRootPair {
    /// Returns a new [`StateRootPair`].
    pub const fn new(committed_root: B256, computed_root: B256) -> Self {
        Self { committed_root, computed_root }
    }

    /// Returns true if the committed and computed roots are equal.
    pub fn is_match(&self) -> bool {
        self.committed_root == self.computed_root
    }
}

/// The state roots of a batch, one per state transition in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCandidate {
    /// The batch number.
    pub batch_number: u64,
    /// The root pairs of the batch.
    pub roots: Vec<StateRootPair>,
}

impl VerificationCandidate {
    /// Returns the index of the first root pair that does not match.
    pub fn first_mismatch(&self) -> Option<usize> {
        self.roots.iter().position(|pair| !pair.is_match())
    }
}

/// The position of the first mismatching root pair of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FraudRecord {
    /// The batch number.
    pub batch_number: u64,
    /// The index of the mismatching root pair in the batch.
    pub batch_index: u64,
}

impl core::fmt::Display for FraudRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "batch {} index {}", self.batch_number, self.batch_index)
    }
}
