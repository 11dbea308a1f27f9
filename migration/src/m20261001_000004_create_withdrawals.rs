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
          .table(Withdrawals::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Withdrawals::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Withdrawals::AgentId).big_integer().not_null())
          .col(ColumnDef::new(Withdrawals::Amount).big_integer().not_null())
          .col(
            ColumnDef::new(Withdrawals::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(Withdrawals::WithdrawalType).string().not_null())
          .col(ColumnDef::new(Withdrawals::Reference).string().not_null())
          .col(ColumnDef::new(Withdrawals::RequestedAt).date_time().not_null())
          .col(ColumnDef::new(Withdrawals::ProcessedAt).date_time().null())
          .col(ColumnDef::new(Withdrawals::ProcessedBy).big_integer().null())
          .col(ColumnDef::new(Withdrawals::Remarks).string().null())
          .col(ColumnDef::new(Withdrawals::FailureReason).string().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_withdrawals_agent")
              .from(Withdrawals::Table, Withdrawals::AgentId)
              .to(Actors::Table, Actors::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_withdrawals_reference")
          .table(Withdrawals::Table)
          .col(Withdrawals::Reference)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_withdrawals_agent")
          .table(Withdrawals::Table)
          .col(Withdrawals::AgentId)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_withdrawals_status")
          .table(Withdrawals::Table)
          .col(Withdrawals::Status)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Withdrawals::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
enum Withdrawals {
  Table,
  Id,
  AgentId,
  Amount,
  Status,
  WithdrawalType,
  Reference,
  RequestedAt,
  ProcessedAt,
  ProcessedBy,
  Remarks,
  FailureReason,
}
