use crate::DatabaseError;

use alloy_primitives::B256;
use rollup_codec::BatchCodec;
use rollup_node_primitives::{BatchSubmission, BatchSubmissionStatus};
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents an outgoing batch and its submission state.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "batch_submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    batch_number: i64,
    status: String,
    batch_data: Vec<u8>,
    submission_tx_hash: Option<Vec<u8>>,
}

/// The relation for the batch submission model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the batch submission model.
impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&BatchSubmission> for ActiveModel {
    type Error = DatabaseError;

    fn try_from(value: &BatchSubmission) -> Result<Self, Self::Error> {
        Ok(Self {
            batch_number: ActiveValue::Set(value.batch_number as i64),
            status: ActiveValue::Set(value.status.as_str().to_owned()),
            batch_data: ActiveValue::Set(BatchCodec::encode(&value.batch)?.to_vec()),
            submission_tx_hash: ActiveValue::Set(value.submission_tx_hash.map(|h| h.to_vec())),
        })
    }
}

impl TryFrom<Model> for BatchSubmission {
    type Error = DatabaseError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            batch_number: value.batch_number as u64,
            status: value.status.parse::<BatchSubmissionStatus>()?,
            batch: BatchCodec::decode(&value.batch_data)?,
            submission_tx_hash: value.submission_tx_hash.map(|h| B256::from_slice(&h)),
        })
    }
}
