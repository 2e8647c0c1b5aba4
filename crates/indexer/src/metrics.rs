use metrics::{Counter, Histogram};
use metrics_derive::Metrics;
use strum::EnumIter;

/// An enum representing the items the indexer can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum IndexerItem {
    /// A `SequencerBatchAppended` log.
    SequencerBatch,
    /// A `StateBatchAppended` log.
    StateBatch,
    /// A chain event with no handler.
    Ignored,
}

impl IndexerItem {
    /// Returns the str representation of the [`IndexerItem`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SequencerBatch => "sequencer_batch",
            Self::StateBatch => "state_batch",
            Self::Ignored => "ignored",
        }
    }
}

/// The metrics for the [`super::L1LogHandler`], labelled per [`IndexerItem`].
#[derive(Metrics, Clone)]
#[metrics(scope = "indexer")]
pub struct IndexerMetrics {
    /// The duration of the handling of an item.
    pub task_duration: Histogram,
    /// The number of items dropped because their data is malformed.
    pub malformed: Counter,
}
