use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(CommissionConfigs::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(CommissionConfigs::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(CommissionConfigs::BaseRateBps)
              .integer()
              .not_null()
              .default(1000),
          )
          .col(
            ColumnDef::new(CommissionConfigs::MonthlyMultiplier)
              .integer()
              .not_null()
              .default(1),
          )
          .col(
            ColumnDef::new(CommissionConfigs::QuarterlyMultiplier)
              .integer()
              .not_null()
              .default(3),
          )
          .col(
            ColumnDef::new(CommissionConfigs::BiannualMultiplier)
              .integer()
              .not_null()
              .default(6),
          )
          .col(
            ColumnDef::new(CommissionConfigs::AnnualMultiplier)
              .integer()
              .not_null()
              .default(1),
          )
          .col(
            ColumnDef::new(CommissionConfigs::Status)
              .string()
              .not_null()
              .default("active"),
          )
          .col(
            ColumnDef::new(CommissionConfigs::EffectiveDate)
              .date_time()
              .not_null(),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(CommissionTierRates::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(CommissionTierRates::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(CommissionTierRates::ConfigId)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(CommissionTierRates::MinAmount)
              .big_integer()
              .not_null(),
          )
          .col(ColumnDef::new(CommissionTierRates::MaxAmount).big_integer().null())
          .col(ColumnDef::new(CommissionTierRates::RateBps).integer().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_commission_tier_rates_config")
              .from(CommissionTierRates::Table, CommissionTierRates::ConfigId)
              .to(CommissionConfigs::Table, CommissionConfigs::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(CommissionTierRates::Table).to_owned())
      .await?;

    manager
      .drop_table(Table::drop().table(CommissionConfigs::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
enum CommissionConfigs {
  Table,
  Id,
  BaseRateBps,
  MonthlyMultiplier,
  QuarterlyMultiplier,
  BiannualMultiplier,
  AnnualMultiplier,
  Status,
  EffectiveDate,
}

#[derive(DeriveIden)]
enum CommissionTierRates {
  Table,
  Id,
  ConfigId,
  MinAmount,
  MaxAmount,
  RateBps,
}
