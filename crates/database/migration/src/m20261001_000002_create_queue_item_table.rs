use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(QueueItem::Table)
                    .if_not_exists()
                    .col(string(QueueItem::QueueKey))
                    .col(big_integer(QueueItem::ItemIndex))
                    .col(binary(QueueItem::Payload))
                    .col(boolean(QueueItem::Processed).default(false))
                    .primary_key(Index::create().col(QueueItem::QueueKey).col(QueueItem::ItemIndex))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(QueueItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum QueueItem {
    Table,
    QueueKey,
    ItemIndex,
    Payload,
    Processed,
}
