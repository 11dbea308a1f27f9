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
          .table(LedgerEntries::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(LedgerEntries::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(LedgerEntries::ActorId).big_integer().not_null())
          .col(ColumnDef::new(LedgerEntries::Amount).big_integer().not_null())
          .col(ColumnDef::new(LedgerEntries::EntryType).string().not_null())
          .col(ColumnDef::new(LedgerEntries::Description).string().null())
          .col(ColumnDef::new(LedgerEntries::Reference).string().null())
          .col(ColumnDef::new(LedgerEntries::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_ledger_entries_actor")
              .from(LedgerEntries::Table, LedgerEntries::ActorId)
              .to(Actors::Table, Actors::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_ledger_entries_actor")
          .table(LedgerEntries::Table)
          .col(LedgerEntries::ActorId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
enum LedgerEntries {
  Table,
  Id,
  ActorId,
  Amount,
  EntryType,
  Description,
  Reference,
  CreatedAt,
}
