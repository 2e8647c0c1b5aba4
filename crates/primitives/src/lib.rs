//! Primitive types for the Rollup Node.

pub use batch::{BatchContext, EncodedBatch, MAX_U24, MAX_U40};
mod batch;

pub use block::BlockInfo;
mod block;

pub use error::RollupNodePrimitiveError;
mod error;

pub use event::{BlockEvent, ChainEvent, LogEvent};
mod event;

pub use filter::LogFilter;
mod filter;

pub use metadata::Metadata;
mod metadata;

pub use queue::{Cursor, QueueItem};
mod queue;

pub use submission::{BatchSubmission, BatchSubmissionStatus, TransactionReceipt};
mod submission;

pub use verification::{FraudRecord, StateRootPair, VerificationCandidate};
mod verification;
