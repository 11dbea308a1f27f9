use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(RankingTiers::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(RankingTiers::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(RankingTiers::Name).string().not_null())
          .col(
            ColumnDef::new(RankingTiers::MinimumEarnings)
              .big_integer()
              .not_null(),
          )
          .col(ColumnDef::new(RankingTiers::BonusBps).integer().not_null())
          .col(
            ColumnDef::new(RankingTiers::Color)
              .string()
              .not_null()
              .default("bg-gray-500"),
          )
          .col(ColumnDef::new(RankingTiers::RankOrder).integer().not_null())
          .col(ColumnDef::new(RankingTiers::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_ranking_tiers_name")
          .table(RankingTiers::Table)
          .col(RankingTiers::Name)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(RankingTiers::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
enum RankingTiers {
  Table,
  Id,
  Name,
  MinimumEarnings,
  BonusBps,
  Color,
  RankOrder,
  CreatedAt,
}
