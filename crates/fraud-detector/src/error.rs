use rollup_db::DatabaseError;

/// A boxed error returned by a [`crate::FraudReporter`].
pub type ReportError = Box<dyn std::error::Error + Send + Sync>;

/// An error that occurred in the fraud detector.
#[derive(Debug, thiserror::Error)]
pub enum FraudDetectorError {
    /// An error occurred while interacting with the database.
    #[error("fraud detection failed due to database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    /// The verification candidate holds no state roots.
    #[error("malformed verification candidate for batch {batch_number}: no state roots")]
    MalformedCandidate {
        /// The batch number of the candidate.
        batch_number: u64,
    },
    /// The fraud could not be reported.
    #[error("failed to report fraud: {0}")]
    Report(ReportError),
}

impl FraudDetectorError {
    /// Returns true if the error is an invariant violation that retrying cannot fix.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::MalformedCandidate { .. })
    }
}
