use super::{transaction::DatabaseTransaction, DatabaseConnectionProvider};
use crate::error::DatabaseError;

use sea_orm::{Database as SeaOrmDatabase, DatabaseConnection, TransactionTrait};

/// The [`Database`] struct is responsible for interacting with the database.
///
/// The [`Database`] type wraps a [`sea_orm::DatabaseConnection`]. We implement
/// [`DatabaseConnectionProvider`] for [`Database`] such that it can be used to perform the
/// operations defined in [`crate::DatabaseOperations`]. Atomic operations can be performed using
/// the [`Database::tx`] method which returns a [`DatabaseTransaction`] that also implements the
/// [`DatabaseConnectionProvider`] trait and also the [`crate::DatabaseOperations`] trait.
#[derive(Debug, Clone)]
pub struct Database {
    /// The underlying database connection.
    connection: DatabaseConnection,
}

impl Database {
    /// Creates a new [`Database`] instance associated with the provided database URL.
    pub async fn new(database_url: &str) -> Result<Self, DatabaseError> {
        let connection = SeaOrmDatabase::connect(database_url).await?;
        Ok(Self { connection })
    }

    /// Creates a new [`DatabaseTransaction`] which can be used for atomic operations.
    pub async fn tx(&self) -> Result<DatabaseTransaction, DatabaseError> {
        Ok(DatabaseTransaction::new(self.connection.begin().await?))
    }
}

impl DatabaseConnectionProvider for Database {
    type Connection = DatabaseConnection;

    fn get_connection(&self) -> &Self::Connection {
        &self.connection
    }
}

impl From<DatabaseConnection> for Database {
    fn from(connection: DatabaseConnection) -> Self {
        Self { connection }
    }
}

#[cfg(test)]
mod test {
    use crate::{operations::DatabaseOperations, test_utils::setup_test_db, DatabaseError};
    use alloy_primitives::B256;
    use arbitrary::{Arbitrary, Unstructured};
    use rand::Rng;
    use rollup_node_primitives::{
        BatchSubmission, BatchSubmissionStatus, Cursor, EncodedBatch, FraudRecord, Metadata,
        QueueItem, StateRootPair,
    };

    fn queue_item(queue_key: &str, index: u64, payload: &[u8]) -> QueueItem<Vec<u8>> {
        QueueItem { queue_key: queue_key.to_owned(), index, payload: payload.to_vec(), processed: false }
    }

    #[tokio::test]
    async fn test_database_cursor() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        assert_eq!(db.get_cursor("blocks").await?, None);

        db.set_cursor(Cursor { subscription_id: "blocks".into(), last_processed: 3 }).await?;
        db.set_cursor(Cursor { subscription_id: "blocks".into(), last_processed: 4 }).await?;
        db.set_cursor(Cursor { subscription_id: "logs".into(), last_processed: 1 }).await?;

        assert_eq!(db.get_cursor("blocks").await?, Some(4));
        assert_eq!(db.get_cursor("logs").await?, Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_database_queue_items() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        // Duplicate inserts are no-ops.
        assert!(db.insert_queue_item(queue_item("a", 0, b"first")).await?);
        assert!(!db.insert_queue_item(queue_item("a", 0, b"second")).await?);
        assert!(db.insert_queue_item(queue_item("a", 1, b"next")).await?);
        assert!(db.insert_queue_item(queue_item("b", 0, b"other")).await?);

        let item = db.get_queue_item("a", 0).await?.unwrap();
        assert_eq!(item.payload, b"first");
        assert!(!item.processed);
        assert!(db.get_queue_item("a", 2).await?.is_none());

        assert_eq!(db.get_last_processed_queue_index("a").await?, None);
        assert_eq!(db.get_last_queue_index("a").await?, Some(1));
        assert_eq!(db.get_last_queue_index("c").await?, None);
        assert!(db.mark_queue_item_processed("a", 0).await?);
        assert!(db.mark_queue_item_processed("a", 1).await?);
        assert!(!db.mark_queue_item_processed("a", 5).await?);

        assert_eq!(db.get_last_processed_queue_index("a").await?, Some(1));
        assert_eq!(db.get_last_processed_queue_index("b").await?, None);
        assert!(db.get_queue_item("a", 0).await?.unwrap().processed);
        Ok(())
    }

    #[tokio::test]
    async fn test_database_batch_submissions() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        // Generate unstructured bytes.
        let mut bytes = [0u8; 4096];
        rand::rng().fill(bytes.as_mut_slice());
        let mut u = Unstructured::new(&bytes);

        for batch_number in [2, 1] {
            let submission = BatchSubmission {
                batch_number,
                status: BatchSubmissionStatus::Queued,
                batch: EncodedBatch::arbitrary(&mut u)?,
                submission_tx_hash: None,
            };
            db.insert_batch_submission(&submission).await?;
            assert_eq!(db.get_batch_submission(batch_number).await?, Some(submission));
        }

        let next = db.get_first_batch_submission_with_status(BatchSubmissionStatus::Queued).await?;
        assert_eq!(next.map(|s| s.batch_number), Some(1));

        let tx_hash = B256::repeat_byte(0x11);
        db.mark_batch_submitted(1, tx_hash).await?;
        let submitted = db.get_batch_submission(1).await?.unwrap();
        assert_eq!(submitted.status, BatchSubmissionStatus::Submitted);
        assert_eq!(submitted.submission_tx_hash, Some(tx_hash));

        let next = db.get_first_batch_submission_with_status(BatchSubmissionStatus::Queued).await?;
        assert_eq!(next.map(|s| s.batch_number), Some(2));

        db.mark_batch_finalized(1).await?;
        assert_eq!(
            db.get_batch_submission(1).await?.map(|s| s.status),
            Some(BatchSubmissionStatus::Finalized)
        );
        assert!(matches!(
            db.mark_batch_submitted(9, tx_hash).await,
            Err(DatabaseError::BatchNotFound(9))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_database_verification_candidates() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;
        let (a, b, c) = (B256::repeat_byte(0xa), B256::repeat_byte(0xb), B256::repeat_byte(0xc));

        assert!(db.get_next_verification_candidate().await?.is_none());

        // Committed roots alone are not a candidate.
        db.insert_committed_state_roots(1, vec![a, b, c]).await?;
        db.insert_committed_state_roots(2, vec![a]).await?;
        assert!(db.get_next_verification_candidate().await?.is_none());

        // Neither is a partially computed batch.
        db.insert_computed_state_roots(1, 0, vec![a, b]).await?;
        db.insert_computed_state_roots(2, 0, vec![a]).await?;
        assert!(db.get_next_verification_candidate().await?.is_none());

        db.insert_computed_state_roots(1, 2, vec![b]).await?;
        let candidate = db.get_next_verification_candidate().await?.unwrap();
        assert_eq!(candidate.batch_number, 1);
        assert_eq!(
            candidate.roots,
            vec![StateRootPair::new(a, a), StateRootPair::new(b, b), StateRootPair::new(c, b)]
        );

        // Re-derivation overwrites the computed root only.
        db.insert_computed_state_roots(1, 2, vec![c]).await?;
        let candidate = db.get_next_verification_candidate().await?.unwrap();
        assert_eq!(candidate.roots[2], StateRootPair::new(c, c));

        db.set_last_verified_batch(1).await?;
        let candidate = db.get_next_verification_candidate().await?.unwrap();
        assert_eq!(candidate.batch_number, 2);

        // The watermark never moves backwards.
        db.set_last_verified_batch(2).await?;
        db.set_last_verified_batch(1).await?;
        assert_eq!(db.get_last_verified_batch().await?, Some(2));
        assert!(db.get_next_verification_candidate().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_database_open_fraud() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;
        assert_eq!(db.get_open_fraud().await?, None);

        let fraud = FraudRecord { batch_number: 4, batch_index: 2 };
        db.set_open_fraud(Some(fraud)).await?;
        assert_eq!(db.get_open_fraud().await?, Some(fraud));

        db.set_open_fraud(None).await?;
        assert_eq!(db.get_open_fraud().await?, None);
        // Clearing twice is a no-op.
        db.set_open_fraud(None).await?;

        db.set_metadata(Metadata { key: Metadata::OPEN_FRAUD.to_owned(), value: "4".into() })
            .await?;
        assert!(matches!(db.get_open_fraud().await, Err(DatabaseError::InvalidMetadata { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_database_tx() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        // Insert the items in a transaction and roll it back.
        let tx = db.tx().await?;
        tx.insert_queue_item(queue_item("a", 0, b"rolled back")).await?;
        tx.rollback().await?;
        assert!(db.get_queue_item("a", 0).await?.is_none());

        // Insert the items in a transaction and commit it.
        let tx = db.tx().await?;
        tx.insert_queue_item(queue_item("a", 0, b"committed")).await?;
        tx.set_cursor(Cursor { subscription_id: "a".into(), last_processed: 0 }).await?;
        tx.commit().await?;

        assert_eq!(db.get_queue_item("a", 0).await?.unwrap().payload, b"committed");
        assert_eq!(db.get_cursor("a").await?, Some(0));
        Ok(())
    }
}
