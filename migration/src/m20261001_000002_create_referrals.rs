use sea_orm_migration::prelude::*;

use super::m20261001_000001_create_actors::Actors;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(ReferralEntries::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(ReferralEntries::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(ReferralEntries::ReferrerId)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(ReferralEntries::ReferredId)
              .big_integer()
              .not_null(),
          )
          .col(ColumnDef::new(ReferralEntries::ReferredKind).string().not_null())
          .col(
            ColumnDef::new(ReferralEntries::Commission)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(ReferralEntries::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(
            ColumnDef::new(ReferralEntries::IsPaid)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(ReferralEntries::PaidAt).date_time().null())
          .col(ColumnDef::new(ReferralEntries::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_referral_entries_referrer")
              .from(ReferralEntries::Table, ReferralEntries::ReferrerId)
              .to(Actors::Table, Actors::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_referral_entries_referred")
              .from(ReferralEntries::Table, ReferralEntries::ReferredId)
              .to(Actors::Table, Actors::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    // One entry per (referrer, referred) pair
    manager
      .create_index(
        Index::create()
          .name("idx_referral_entries_pair")
          .table(ReferralEntries::Table)
          .col(ReferralEntries::ReferrerId)
          .col(ReferralEntries::ReferredId)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(ReferralTransactions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(ReferralTransactions::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(ReferralTransactions::EntryId)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(ReferralTransactions::Amount)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(ReferralTransactions::Commission)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(ReferralTransactions::Description)
              .string()
              .not_null(),
          )
          .col(
            ColumnDef::new(ReferralTransactions::Status)
              .string()
              .not_null()
              .default("completed"),
          )
          .col(
            ColumnDef::new(ReferralTransactions::CreatedAt)
              .date_time()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_referral_transactions_entry")
              .from(ReferralTransactions::Table, ReferralTransactions::EntryId)
              .to(ReferralEntries::Table, ReferralEntries::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_referral_transactions_entry")
          .table(ReferralTransactions::Table)
          .col(ReferralTransactions::EntryId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ReferralTransactions::Table).to_owned())
      .await?;

    manager
      .drop_table(Table::drop().table(ReferralEntries::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
enum ReferralEntries {
  Table,
  Id,
  ReferrerId,
  ReferredId,
  ReferredKind,
  Commission,
  Status,
  IsPaid,
  PaidAt,
  CreatedAt,
}

#[derive(DeriveIden)]
enum ReferralTransactions {
  Table,
  Id,
  EntryId,
  Amount,
  Commission,
  Description,
  Status,
  CreatedAt,
}
