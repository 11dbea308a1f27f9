use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::actor;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryType {
  #[sea_orm(string_value = "commission")]
  #[default]
  Commission,
  #[sea_orm(string_value = "withdrawal")]
  Withdrawal,
  #[sea_orm(string_value = "debit")]
  Debit,
}

/// Every balance movement of an actor; credits positive, debits negative.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub actor_id: i64,
  pub amount: i64,
  pub entry_type: LedgerEntryType,
  pub description: Option<String>,
  pub reference: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "actor::Entity",
    from = "Column::ActorId",
    to = "actor::Column::Id"
  )]
  Actor,
}

impl Related<actor::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Actor.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
