use super::{models, DatabaseError};
use crate::DatabaseConnectionProvider;

use alloy_primitives::B256;
use rollup_node_primitives::{
    BatchSubmission, BatchSubmissionStatus, Cursor, FraudRecord, Metadata, QueueItem,
    StateRootPair, VerificationCandidate,
};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// The [`DatabaseOperations`] trait provides methods for interacting with the database.
#[async_trait::async_trait]
pub trait DatabaseOperations: DatabaseConnectionProvider + Sync {
    /// Get the metadata value stored under the provided key.
    async fn get_metadata(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(models::metadata::Entity::find_by_id(key.to_owned())
            .one(self.get_connection())
            .await
            .map(|x| x.map(|model| Metadata::from(model).value))?)
    }

    /// Insert or replace the [`Metadata`] record.
    async fn set_metadata(&self, metadata: Metadata) -> Result<(), DatabaseError> {
        tracing::trace!(target: "rollup::db", key = %metadata.key, value = %metadata.value, "Setting metadata in database.");
        let metadata: models::metadata::ActiveModel = metadata.into();
        models::metadata::Entity::insert(metadata)
            .on_conflict(
                OnConflict::column(models::metadata::Column::Key)
                    .update_column(models::metadata::Column::Value)
                    .to_owned(),
            )
            .exec_without_returning(self.get_connection())
            .await?;
        Ok(())
    }

    /// Get the last processed position of the provided subscription.
    async fn get_cursor(&self, subscription_id: &str) -> Result<Option<u64>, DatabaseError> {
        let key = Metadata::cursor_key(subscription_id);
        self.get_metadata(&key).await?.map(|value| parse_u64(key, value)).transpose()
    }

    /// Persist the [`Cursor`].
    async fn set_cursor(&self, cursor: Cursor) -> Result<(), DatabaseError> {
        self.set_metadata(Metadata {
            key: Metadata::cursor_key(&cursor.subscription_id),
            value: cursor.last_processed.to_string(),
        })
        .await
    }

    /// Insert the queue item if no item is stored at the same `(queue_key, index)`. Returns true
    /// if the item was inserted.
    async fn insert_queue_item(&self, item: QueueItem<Vec<u8>>) -> Result<bool, DatabaseError> {
        tracing::trace!(target: "rollup::db", queue_key = %item.queue_key, index = item.index, "Inserting queue item into database.");
        let item: models::queue_item::ActiveModel = item.into();
        let inserted = models::queue_item::Entity::insert(item)
            .on_conflict(
                OnConflict::columns([
                    models::queue_item::Column::QueueKey,
                    models::queue_item::Column::ItemIndex,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.get_connection())
            .await?;
        Ok(inserted > 0)
    }

    /// Get the queue item stored at `(queue_key, index)`.
    async fn get_queue_item(
        &self,
        queue_key: &str,
        index: u64,
    ) -> Result<Option<QueueItem<Vec<u8>>>, DatabaseError> {
        Ok(models::queue_item::Entity::find_by_id((queue_key.to_owned(), index as i64))
            .one(self.get_connection())
            .await
            .map(|x| x.map(Into::into))?)
    }

    /// Mark the queue item at `(queue_key, index)` as processed. Returns false if the item does
    /// not exist.
    async fn mark_queue_item_processed(
        &self,
        queue_key: &str,
        index: u64,
    ) -> Result<bool, DatabaseError> {
        tracing::trace!(target: "rollup::db", queue_key, index, "Marking queue item as processed.");
        let result = models::queue_item::Entity::update_many()
            .col_expr(models::queue_item::Column::Processed, Expr::value(true))
            .filter(models::queue_item::Column::QueueKey.eq(queue_key))
            .filter(models::queue_item::Column::ItemIndex.eq(index as i64))
            .exec(self.get_connection())
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Get the highest processed index of the queue.
    async fn get_last_processed_queue_index(
        &self,
        queue_key: &str,
    ) -> Result<Option<u64>, DatabaseError> {
        Ok(models::queue_item::Entity::find()
            .select_only()
            .column_as(models::queue_item::Column::ItemIndex.max(), "max_index")
            .filter(models::queue_item::Column::QueueKey.eq(queue_key))
            .filter(models::queue_item::Column::Processed.eq(true))
            .into_tuple::<Option<i64>>()
            .one(self.get_connection())
            .await?
            .flatten()
            .map(|index| index as u64))
    }

    /// Get the highest index stored for the queue, processed or not.
    async fn get_last_queue_index(&self, queue_key: &str) -> Result<Option<u64>, DatabaseError> {
        Ok(models::queue_item::Entity::find()
            .select_only()
            .column_as(models::queue_item::Column::ItemIndex.max(), "max_index")
            .filter(models::queue_item::Column::QueueKey.eq(queue_key))
            .into_tuple::<Option<i64>>()
            .one(self.get_connection())
            .await?
            .flatten()
            .map(|index| index as u64))
    }

    /// Insert a new [`BatchSubmission`].
    async fn insert_batch_submission(
        &self,
        submission: &BatchSubmission,
    ) -> Result<(), DatabaseError> {
        tracing::trace!(target: "rollup::db", batch_number = submission.batch_number, status = %submission.status, "Inserting batch submission into database.");
        let submission: models::batch_submission::ActiveModel = submission.try_into()?;
        models::batch_submission::Entity::insert(submission)
            .exec_without_returning(self.get_connection())
            .await?;
        Ok(())
    }

    /// Get the [`BatchSubmission`] with the provided batch number.
    async fn get_batch_submission(
        &self,
        batch_number: u64,
    ) -> Result<Option<BatchSubmission>, DatabaseError> {
        models::batch_submission::Entity::find_by_id(batch_number as i64)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get the lowest numbered [`BatchSubmission`] with the provided status.
    async fn get_first_batch_submission_with_status(
        &self,
        status: BatchSubmissionStatus,
    ) -> Result<Option<BatchSubmission>, DatabaseError> {
        models::batch_submission::Entity::find()
            .filter(models::batch_submission::Column::Status.eq(status.as_str()))
            .order_by_asc(models::batch_submission::Column::BatchNumber)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Mark the batch as submitted by the provided transaction.
    async fn mark_batch_submitted(
        &self,
        batch_number: u64,
        tx_hash: B256,
    ) -> Result<(), DatabaseError> {
        tracing::trace!(target: "rollup::db", batch_number, ?tx_hash, "Marking batch as submitted.");
        let result = models::batch_submission::Entity::update_many()
            .col_expr(
                models::batch_submission::Column::Status,
                Expr::value(BatchSubmissionStatus::Submitted.as_str()),
            )
            .col_expr(models::batch_submission::Column::SubmissionTxHash, Expr::value(tx_hash.to_vec()))
            .filter(models::batch_submission::Column::BatchNumber.eq(batch_number as i64))
            .exec(self.get_connection())
            .await?;
        if result.rows_affected == 0 {
            tracing::error!(target: "rollup::db", batch_number, "Batch not found in DB when trying to mark it submitted.");
            return Err(DatabaseError::BatchNotFound(batch_number));
        }
        Ok(())
    }

    /// Mark the batch as finalized.
    async fn mark_batch_finalized(&self, batch_number: u64) -> Result<(), DatabaseError> {
        tracing::trace!(target: "rollup::db", batch_number, "Marking batch as finalized.");
        let result = models::batch_submission::Entity::update_many()
            .col_expr(
                models::batch_submission::Column::Status,
                Expr::value(BatchSubmissionStatus::Finalized.as_str()),
            )
            .filter(models::batch_submission::Column::BatchNumber.eq(batch_number as i64))
            .exec(self.get_connection())
            .await?;
        if result.rows_affected == 0 {
            tracing::error!(target: "rollup::db", batch_number, "Batch not found in DB when trying to finalize it.");
            return Err(DatabaseError::BatchNotFound(batch_number));
        }
        Ok(())
    }

    /// Insert the state roots committed to the base chain for the batch, starting at index 0.
    async fn insert_committed_state_roots(
        &self,
        batch_number: u64,
        roots: Vec<B256>,
    ) -> Result<(), DatabaseError> {
        tracing::trace!(target: "rollup::db", batch_number, count = roots.len(), "Inserting committed state roots into database.");
        upsert_state_roots(
            self.get_connection(),
            batch_number,
            0,
            roots,
            models::state_root::Column::CommittedRoot,
        )
        .await
    }

    /// Insert the locally computed state roots for the batch, starting at `start_index`.
    async fn insert_computed_state_roots(
        &self,
        batch_number: u64,
        start_index: u64,
        roots: Vec<B256>,
    ) -> Result<(), DatabaseError> {
        tracing::trace!(target: "rollup::db", batch_number, start_index, count = roots.len(), "Inserting computed state roots into database.");
        upsert_state_roots(
            self.get_connection(),
            batch_number,
            start_index,
            roots,
            models::state_root::Column::ComputedRoot,
        )
        .await
    }

    /// Get the last verified batch number.
    async fn get_last_verified_batch(&self) -> Result<Option<u64>, DatabaseError> {
        self.get_metadata(Metadata::LAST_VERIFIED_BATCH)
            .await?
            .map(|value| parse_u64(Metadata::LAST_VERIFIED_BATCH.to_owned(), value))
            .transpose()
    }

    /// Set the last verified batch number. The watermark never moves backwards.
    async fn set_last_verified_batch(&self, batch_number: u64) -> Result<(), DatabaseError> {
        if self.get_last_verified_batch().await?.is_some_and(|last| last >= batch_number) {
            return Ok(());
        }
        self.set_metadata(Metadata {
            key: Metadata::LAST_VERIFIED_BATCH.to_owned(),
            value: batch_number.to_string(),
        })
        .await
    }

    /// Get the reported fraud that holds back the verified watermark, if any.
    async fn get_open_fraud(&self) -> Result<Option<FraudRecord>, DatabaseError> {
        let Some(value) = self.get_metadata(Metadata::OPEN_FRAUD).await? else { return Ok(None) };
        let invalid = || DatabaseError::InvalidMetadata {
            key: Metadata::OPEN_FRAUD.to_owned(),
            value: value.clone(),
        };
        let (batch_number, batch_index) = value.split_once(':').ok_or_else(invalid)?;
        Ok(Some(FraudRecord {
            batch_number: batch_number.parse().map_err(|_| invalid())?,
            batch_index: batch_index.parse().map_err(|_| invalid())?,
        }))
    }

    /// Set the reported fraud that holds back the verified watermark. [`None`] clears it.
    async fn set_open_fraud(&self, fraud: Option<FraudRecord>) -> Result<(), DatabaseError> {
        match fraud {
            Some(fraud) => {
                self.set_metadata(Metadata {
                    key: Metadata::OPEN_FRAUD.to_owned(),
                    value: format!("{}:{}", fraud.batch_number, fraud.batch_index),
                })
                .await
            }
            None => {
                tracing::trace!(target: "rollup::db", "Clearing open fraud in database.");
                models::metadata::Entity::delete_by_id(Metadata::OPEN_FRAUD.to_owned())
                    .exec(self.get_connection())
                    .await?;
                Ok(())
            }
        }
    }

    /// Get the next [`VerificationCandidate`]: the lowest batch above the last verified batch,
    /// once every transition of it has both a committed and a computed root.
    async fn get_next_verification_candidate(
        &self,
    ) -> Result<Option<VerificationCandidate>, DatabaseError> {
        let mut query = models::state_root::Entity::find();
        if let Some(last) = self.get_last_verified_batch().await? {
            query = query.filter(models::state_root::Column::BatchNumber.gt(last as i64));
        }
        let Some(batch_number) = query
            .select_only()
            .column(models::state_root::Column::BatchNumber)
            .order_by_asc(models::state_root::Column::BatchNumber)
            .into_tuple::<i64>()
            .one(self.get_connection())
            .await?
        else {
            return Ok(None);
        };

        let rows = models::state_root::Entity::find()
            .filter(models::state_root::Column::BatchNumber.eq(batch_number))
            .order_by_asc(models::state_root::Column::BatchIndex)
            .all(self.get_connection())
            .await?;

        let mut roots = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match row.roots() {
                Some((committed, computed)) if row.batch_index == index as i64 => {
                    roots.push(StateRootPair::new(committed, computed))
                }
                _ => return Ok(None),
            }
        }

        Ok(Some(VerificationCandidate { batch_number: batch_number as u64, roots }))
    }
}

impl<T> DatabaseOperations for T where T: DatabaseConnectionProvider + Sync {}

/// Upserts the roots of the batch into `column`, leaving the other root column untouched.
async fn upsert_state_roots<C: sea_orm::ConnectionTrait>(
    connection: &C,
    batch_number: u64,
    start_index: u64,
    roots: Vec<B256>,
    column: models::state_root::Column,
) -> Result<(), DatabaseError> {
    if roots.is_empty() {
        return Ok(());
    }

    let models = roots.into_iter().enumerate().map(|(i, root)| {
        let root = ActiveValue::Set(Some(root.to_vec()));
        let (committed_root, computed_root) = match column {
            models::state_root::Column::CommittedRoot => (root, ActiveValue::NotSet),
            _ => (ActiveValue::NotSet, root),
        };
        models::state_root::ActiveModel {
            batch_number: ActiveValue::Set(batch_number as i64),
            batch_index: ActiveValue::Set((start_index + i as u64) as i64),
            committed_root,
            computed_root,
        }
    });

    models::state_root::Entity::insert_many(models)
        .on_conflict(
            OnConflict::columns([
                models::state_root::Column::BatchNumber,
                models::state_root::Column::BatchIndex,
            ])
            .update_column(column)
            .to_owned(),
        )
        .exec_without_returning(connection)
        .await?;
    Ok(())
}

fn parse_u64(key: String, value: String) -> Result<u64, DatabaseError> {
    value.parse().map_err(|_| DatabaseError::InvalidMetadata { key, value })
}
