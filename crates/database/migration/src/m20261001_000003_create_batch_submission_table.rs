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
                    .table(BatchSubmission::Table)
                    .if_not_exists()
                    .col(big_integer(BatchSubmission::BatchNumber).primary_key())
                    .col(string(BatchSubmission::Status))
                    .col(binary(BatchSubmission::BatchData))
                    .col(binary_len_null(BatchSubmission::SubmissionTxHash, HASH_LENGTH))
                    .to_owned(),
            )
            .await?;

        // Add index on `status` for the `batch_submission` table.
        manager
            .create_index(
                Index::create()
                    .name("idx_batch_submission_status")
                    .col(BatchSubmission::Status)
                    .table(BatchSubmission::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(BatchSubmission::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum BatchSubmission {
    Table,
    BatchNumber,
    Status,
    BatchData,
    SubmissionTxHash,
}
