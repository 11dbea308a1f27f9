pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_actors;
mod m20261001_000002_create_referrals;
mod m20261001_000003_create_ledger_entries;
mod m20261001_000004_create_withdrawals;
mod m20261001_000005_create_commission_configs;
mod m20261001_000006_create_ranking_tiers;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20261001_000001_create_actors::Migration),
      Box::new(m20261001_000002_create_referrals::Migration),
      Box::new(m20261001_000003_create_ledger_entries::Migration),
      Box::new(m20261001_000004_create_withdrawals::Migration),
      Box::new(m20261001_000005_create_commission_configs::Migration),
      Box::new(m20261001_000006_create_ranking_tiers::Migration),
    ]
  }
}
