/// The configuration of the [`crate::FraudDetector`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FraudDetectorConfig {
    /// Reports an unresolved fraud again after this many runs found it unchanged. [`None`] never
    /// reports the same fraud twice.
    pub realert_every: Option<u64>,
}
