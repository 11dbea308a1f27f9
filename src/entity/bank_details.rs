use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::actor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
  #[sea_orm(string_value = "savings")]
  Savings,
  #[sea_orm(string_value = "current")]
  Current,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_details")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub actor_id: i64,
  pub bank_name: String,
  pub account_number: String,
  pub account_name: String,
  pub account_type: Option<AccountType>,
  pub verified_at: Option<DateTime>,
}

impl Model {
  pub fn is_verified(&self) -> bool {
    self.verified_at.is_some() && !self.account_number.is_empty()
  }
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
