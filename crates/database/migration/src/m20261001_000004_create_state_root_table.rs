use sea_orm_migration::{prelude::*, schema::*};

const HASH_LENGTH: u32 = 32;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StateRoot::Table)
                    .if_not_exists()
                    .col(big_integer(StateRoot::BatchNumber))
                    .col(big_integer(StateRoot::BatchIndex))
                    .col(binary_len_null(StateRoot::CommittedRoot, HASH_LENGTH))
                    .col(binary_len_null(StateRoot::ComputedRoot, HASH_LENGTH))
                    .primary_key(Index::create().col(StateRoot::BatchNumber).col(StateRoot::BatchIndex))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StateRoot::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum StateRoot {
    Table,
    BatchNumber,
    BatchIndex,
    CommittedRoot,
    ComputedRoot,
}
