use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::commission_tier_rate;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ConfigStatus {
  #[sea_orm(string_value = "active")]
  #[default]
  Active,
  #[sea_orm(string_value = "inactive")]
  Inactive,
}

/// Commission rate table. Rates are basis points (1% = 100).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commission_configs")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub base_rate_bps: i32,
  pub monthly_multiplier: i32,
  pub quarterly_multiplier: i32,
  pub biannual_multiplier: i32,
  pub annual_multiplier: i32,
  pub status: ConfigStatus,
  pub effective_date: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "commission_tier_rate::Entity")]
  TierRates,
}

impl Related<commission_tier_rate::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::TierRates.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
