use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{referral_entry, referral_entry::ReferralStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referral_transactions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub entry_id: i64,
  pub amount: i64,
  pub commission: i64,
  pub description: String,
  pub status: ReferralStatus,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "referral_entry::Entity",
    from = "Column::EntryId",
    to = "referral_entry::Column::Id"
  )]
  Entry,
}

impl Related<referral_entry::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Entry.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
