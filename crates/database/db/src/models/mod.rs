/// This module contains the metadata model.
pub mod metadata;

/// This module contains the queue item model.
pub mod queue_item;

/// This module contains the batch submission model.
pub mod batch_submission;

/// This module contains the state root model.
pub mod state_root;
