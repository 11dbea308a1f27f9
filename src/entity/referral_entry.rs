use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{actor, actor::ActorKind, referral_transaction};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "completed")]
  Completed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referral_entries")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub referrer_id: i64,
  pub referred_id: i64,
  pub referred_kind: ActorKind,
  /// Sum of the commission of all transactions of this entry
  pub commission: i64,
  pub status: ReferralStatus,
  pub is_paid: bool,
  pub paid_at: Option<DateTime>,
  pub created_at: DateTime,
}

impl Model {
  pub fn referred(&self) -> actor::ActorRef {
    actor::ActorRef::new(self.referred_kind, self.referred_id)
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "actor::Entity",
    from = "Column::ReferrerId",
    to = "actor::Column::Id"
  )]
  Referrer,
  #[sea_orm(has_many = "referral_transaction::Entity")]
  Transactions,
}

impl Related<actor::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Referrer.def()
  }
}

impl Related<referral_transaction::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Transactions.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
