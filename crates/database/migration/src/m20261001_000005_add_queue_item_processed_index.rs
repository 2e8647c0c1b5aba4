use crate::m20261001_000002_create_queue_item_table::QueueItem;

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Add index on `(queue_key, processed)` for the `queue_item` table.
        manager
            .create_index(
                Index::create()
                    .name("idx_queue_item_queue_key_processed")
                    .col(QueueItem::QueueKey)
                    .col(QueueItem::Processed)
                    .table(QueueItem::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_queue_item_queue_key_processed")
                    .table(QueueItem::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
