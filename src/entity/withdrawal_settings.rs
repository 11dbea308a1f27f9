use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{actor, withdrawal::WithdrawalType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawal_settings")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub agent_id: i64,
  pub preferred_type: WithdrawalType,
  pub minimum_amount: i64,
  pub maximum_amount: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "actor::Entity",
    from = "Column::AgentId",
    to = "actor::Column::Id"
  )]
  Agent,
}

impl Related<actor::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Agent.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
