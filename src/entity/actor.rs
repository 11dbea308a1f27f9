use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{bank_details, ledger_entry, withdrawal};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
  #[sea_orm(string_value = "agent")]
  #[default]
  Agent,
  #[sea_orm(string_value = "landlord")]
  Landlord,
  #[sea_orm(string_value = "tenant")]
  Tenant,
}

impl ActorKind {
  pub fn code_prefix(&self) -> &'static str {
    match self {
      ActorKind::Agent => "AG",
      ActorKind::Landlord => "LL",
      ActorKind::Tenant => "TN",
    }
  }
}

impl fmt::Display for ActorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ActorKind::Agent => "Agent",
      ActorKind::Landlord => "Landlord",
      ActorKind::Tenant => "Tenant",
    })
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ActorStatus {
  #[sea_orm(string_value = "active")]
  #[default]
  Active,
  #[sea_orm(string_value = "suspended")]
  Suspended,
}

/// Tagged reference to an actor of a known kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorRef {
  pub kind: ActorKind,
  pub id: i64,
}

impl ActorRef {
  pub fn new(kind: ActorKind, id: i64) -> Self {
    Self { kind, id }
  }

  pub fn agent(id: i64) -> Self {
    Self::new(ActorKind::Agent, id)
  }

  pub fn landlord(id: i64) -> Self {
    Self::new(ActorKind::Landlord, id)
  }

  pub fn tenant(id: i64) -> Self {
    Self::new(ActorKind::Tenant, id)
  }
}

impl fmt::Display for ActorRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}#{}", self.kind, self.id)
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "actors")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub kind: ActorKind,
  pub name: String,
  pub email: String,
  pub status: ActorStatus,
  #[sea_orm(unique)]
  pub referral_code: String,
  pub referred_by: Option<i64>,
  pub referrer_kind: Option<ActorKind>,
  pub balance: i64,
  pub total_earned: i64,
  pub last_withdrawal: Option<DateTime>,
  pub created_at: DateTime,
}

impl Model {
  pub fn actor_ref(&self) -> ActorRef {
    ActorRef::new(self.kind, self.id)
  }

  pub fn referrer(&self) -> Option<ActorRef> {
    Some(ActorRef::new(self.referrer_kind?, self.referred_by?))
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_one = "bank_details::Entity")]
  BankDetails,
  #[sea_orm(has_many = "withdrawal::Entity")]
  Withdrawals,
  #[sea_orm(has_many = "ledger_entry::Entity")]
  LedgerEntries,
}

impl Related<bank_details::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::BankDetails.def()
  }
}

impl Related<withdrawal::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Withdrawals.def()
  }
}

impl Related<ledger_entry::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::LedgerEntries.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
