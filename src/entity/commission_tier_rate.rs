use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::commission_config;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commission_tier_rates")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub config_id: i64,
  pub min_amount: i64,
  /// Inclusive; `None` is unbounded
  pub max_amount: Option<i64>,
  pub rate_bps: i32,
}

impl Model {
  pub fn contains(&self, amount: i64) -> bool {
    amount >= self.min_amount && self.max_amount.is_none_or(|max| amount <= max)
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "commission_config::Entity",
    from = "Column::ConfigId",
    to = "commission_config::Column::Id"
  )]
  Config,
}

impl Related<commission_config::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Config.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
