use rollup_node_primitives::QueueItem;
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents an item of an ordered persistent queue.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "queue_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    queue_key: String,
    #[sea_orm(primary_key, auto_increment = false)]
    item_index: i64,
    payload: Vec<u8>,
    processed: bool,
}

/// The relation for the queue item model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the queue item model.
impl ActiveModelBehavior for ActiveModel {}

impl From<QueueItem<Vec<u8>>> for ActiveModel {
    fn from(value: QueueItem<Vec<u8>>) -> Self {
        Self {
            queue_key: ActiveValue::Set(value.queue_key),
            item_index: ActiveValue::Set(value.index as i64),
            payload: ActiveValue::Set(value.payload),
            processed: ActiveValue::Set(value.processed),
        }
    }
}

impl From<Model> for QueueItem<Vec<u8>> {
    fn from(value: Model) -> Self {
        Self {
            queue_key: value.queue_key,
            index: value.item_index as u64,
            payload: value.payload,
            processed: value.processed,
        }
    }
}
