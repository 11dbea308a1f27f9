use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Actors::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Actors::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Actors::Kind).string().not_null())
          .col(ColumnDef::new(Actors::Name).string().not_null())
          .col(ColumnDef::new(Actors::Email).string().not_null())
          .col(
            ColumnDef::new(Actors::Status)
              .string()
              .not_null()
              .default("active"),
          )
          .col(ColumnDef::new(Actors::ReferralCode).string().not_null())
          .col(ColumnDef::new(Actors::ReferredBy).big_integer().null())
          .col(ColumnDef::new(Actors::ReferrerKind).string().null())
          .col(
            ColumnDef::new(Actors::Balance)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Actors::TotalEarned)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Actors::LastWithdrawal).date_time().null())
          .col(ColumnDef::new(Actors::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_actors_referred_by")
              .from(Actors::Table, Actors::ReferredBy)
              .to(Actors::Table, Actors::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_actors_referral_code")
          .table(Actors::Table)
          .col(Actors::ReferralCode)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_actors_kind_total_earned")
          .table(Actors::Table)
          .col(Actors::Kind)
          .col(Actors::TotalEarned)
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(BankDetails::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(BankDetails::ActorId)
              .big_integer()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(BankDetails::BankName).string().not_null())
          .col(ColumnDef::new(BankDetails::AccountNumber).string().not_null())
          .col(ColumnDef::new(BankDetails::AccountName).string().not_null())
          .col(ColumnDef::new(BankDetails::AccountType).string().null())
          .col(ColumnDef::new(BankDetails::VerifiedAt).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_bank_details_actor")
              .from(BankDetails::Table, BankDetails::ActorId)
              .to(Actors::Table, Actors::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(WithdrawalSettings::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(WithdrawalSettings::AgentId)
              .big_integer()
              .not_null()
              .primary_key(),
          )
          .col(
            ColumnDef::new(WithdrawalSettings::PreferredType)
              .string()
              .not_null()
              .default("partial"),
          )
          .col(
            ColumnDef::new(WithdrawalSettings::MinimumAmount)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(WithdrawalSettings::MaximumAmount)
              .big_integer()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_withdrawal_settings_agent")
              .from(WithdrawalSettings::Table, WithdrawalSettings::AgentId)
              .to(Actors::Table, Actors::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(WithdrawalSettings::Table).to_owned())
      .await?;

    manager
      .drop_table(Table::drop().table(BankDetails::Table).to_owned())
      .await?;

    manager.drop_table(Table::drop().table(Actors::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Actors {
  Table,
  Id,
  Kind,
  Name,
  Email,
  Status,
  ReferralCode,
  ReferredBy,
  ReferrerKind,
  Balance,
  TotalEarned,
  LastWithdrawal,
  CreatedAt,
}

#[derive(DeriveIden)]
enum BankDetails {
  Table,
  ActorId,
  BankName,
  AccountNumber,
  AccountName,
  AccountType,
  VerifiedAt,
}

#[derive(DeriveIden)]
enum WithdrawalSettings {
  Table,
  AgentId,
  PreferredType,
  MinimumAmount,
  MaximumAmount,
}
