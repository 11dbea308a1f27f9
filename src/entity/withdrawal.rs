use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::actor;

/// `Pending` is the only state a request can leave.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "completed")]
  Completed,
  #[sea_orm(string_value = "failed")]
  Failed,
  #[sea_orm(string_value = "cancelled")]
  Cancelled,
}

impl fmt::Display for WithdrawalStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      WithdrawalStatus::Pending => "pending",
      WithdrawalStatus::Completed => "completed",
      WithdrawalStatus::Failed => "failed",
      WithdrawalStatus::Cancelled => "cancelled",
    })
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalType {
  #[sea_orm(string_value = "partial")]
  #[default]
  Partial,
  #[sea_orm(string_value = "quarterly")]
  Quarterly,
  #[sea_orm(string_value = "biannual")]
  Biannual,
  #[sea_orm(string_value = "annual")]
  Annual,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub agent_id: i64,
  pub amount: i64,
  pub status: WithdrawalStatus,
  pub withdrawal_type: WithdrawalType,
  #[sea_orm(unique)]
  pub reference: String,
  pub requested_at: DateTime,
  pub processed_at: Option<DateTime>,
  pub processed_by: Option<i64>,
  pub remarks: Option<String>,
  pub failure_reason: Option<String>,
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
