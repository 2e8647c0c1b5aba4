pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_metadata_table;
mod m20261001_000002_create_queue_item_table;
mod m20261001_000003_create_batch_submission_table;
mod m20261001_000004_create_state_root_table;
mod m20261001_000005_add_queue_item_processed_index;

#[derive(Debug)]
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_metadata_table::Migration),
            Box::new(m20261001_000002_create_queue_item_table::Migration),
            Box::new(m20261001_000003_create_batch_submission_table::Migration),
            Box::new(m20261001_000004_create_state_root_table::Migration),
            Box::new(m20261001_000005_add_queue_item_processed_index::Migration),
        ]
    }
}
