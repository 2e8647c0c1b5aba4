use alloy_primitives::B256;
use sea_orm::entity::prelude::*;

/// A database model that represents the committed and computed state roots of one transition of
/// a batch.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "state_root")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub(crate) batch_number: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub(crate) batch_index: i64,
    pub(crate) committed_root: Option<Vec<u8>>,
    pub(crate) computed_root: Option<Vec<u8>>,
}

impl Model {
    /// Returns the committed and computed roots if both are known.
    pub(crate) fn roots(&self) -> Option<(B256, B256)> {
        let committed = self.committed_root.as_deref().map(B256::from_slice)?;
        let computed = self.computed_root.as_deref().map(B256::from_slice)?;
        Some((committed, computed))
    }
}

/// The relation for the state root model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the state root model.
impl ActiveModelBehavior for ActiveModel {}
