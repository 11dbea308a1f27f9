use sea_orm::sea_query::Expr;
use serde::Serialize;

use crate::{
  entity::{ActorRef, LedgerEntryType, actor, ledger_entry},
  prelude::*,
  sv::actor::resolve,
  utils,
};

pub struct Ledger<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
  pub actor: ActorRef,
  pub balance: i64,
  pub total_earned: i64,
  pub withdrawn: i64,
  pub spent: i64,
  pub last_withdrawal: Option<DateTime>,
}

/// Balance recomputed from the ledger next to the stored counters.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerAudit {
  pub actor: ActorRef,
  pub balance: i64,
  pub total_earned: i64,
  pub credited: i64,
  pub withdrawn: i64,
  pub debited: i64,
}

impl LedgerAudit {
  pub fn expected_balance(&self) -> i64 {
    self.credited - self.withdrawn - self.debited
  }

  pub fn is_consistent(&self) -> bool {
    self.balance == self.expected_balance()
      && self.total_earned == self.credited
      && (0..=self.total_earned).contains(&self.balance)
  }
}

impl<'a> Ledger<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn summary(&self, actor: ActorRef) -> Result<LedgerSummary> {
    let model = resolve(self.db, actor).await?;
    let totals = totals(self.db, model.id).await?;

    Ok(LedgerSummary {
      actor,
      balance: model.balance,
      total_earned: model.total_earned,
      withdrawn: totals.get(&LedgerEntryType::Withdrawal).copied().unwrap_or(0),
      spent: totals.get(&LedgerEntryType::Debit).copied().unwrap_or(0),
      last_withdrawal: model.last_withdrawal,
    })
  }

  /// Spend from the balance outside of a withdrawal.
  /// Returns the new balance.
  pub async fn spend(
    &self,
    actor: ActorRef,
    amount: i64,
    description: Option<String>,
  ) -> Result<i64> {
    if amount <= 0 {
      return Err(Error::InvalidArgs("Spend amount must be positive".into()));
    }

    let txn = self.db.begin().await?;

    let model = resolve(&txn, actor).await?;
    let balance = debit(
      &txn,
      model.id,
      amount,
      LedgerEntryType::Debit,
      description,
      None,
    )
    .await?;

    txn.commit().await?;

    debug!("{actor} spent {amount}, balance {balance}");
    Ok(balance)
  }

  pub async fn entries(
    &self,
    actor: ActorRef,
    limit: u64,
  ) -> Result<Vec<ledger_entry::Model>> {
    let model = resolve(self.db, actor).await?;

    Ok(
      ledger_entry::Entity::find()
        .filter(ledger_entry::Column::ActorId.eq(model.id))
        .order_by_desc(ledger_entry::Column::CreatedAt)
        .order_by_desc(ledger_entry::Column::Id)
        .limit(limit)
        .all(self.db)
        .await?,
    )
  }

  pub async fn audit(&self, actor: ActorRef) -> Result<LedgerAudit> {
    let model = resolve(self.db, actor).await?;
    let totals = totals(self.db, model.id).await?;
    let total = |ty| totals.get(&ty).copied().unwrap_or(0);

    let audit = LedgerAudit {
      actor,
      balance: model.balance,
      total_earned: model.total_earned,
      credited: total(LedgerEntryType::Commission),
      withdrawn: total(LedgerEntryType::Withdrawal),
      debited: total(LedgerEntryType::Debit),
    };

    if !audit.is_consistent() {
      error!(
        "Ledger mismatch for {actor}: balance {} (expected {}), earned {} (credited {})",
        audit.balance,
        audit.expected_balance(),
        audit.total_earned,
        audit.credited
      );
    }

    Ok(audit)
  }
}

/// Absolute amount moved per entry type.
async fn totals<C: ConnectionTrait>(
  conn: &C,
  actor_id: i64,
) -> Result<HashMap<LedgerEntryType, i64>> {
  let rows: Vec<(LedgerEntryType, Option<i64>)> = ledger_entry::Entity::find()
    .select_only()
    .column(ledger_entry::Column::EntryType)
    .column_as(Expr::col(ledger_entry::Column::Amount).sum(), "total")
    .filter(ledger_entry::Column::ActorId.eq(actor_id))
    .group_by(ledger_entry::Column::EntryType)
    .into_tuple()
    .all(conn)
    .await?;

  Ok(
    rows
      .into_iter()
      .map(|(ty, sum)| (ty, sum.unwrap_or(0).abs()))
      .collect(),
  )
}

/// Add `amount` to both balance and total earned, and record it.
pub(crate) async fn credit<C: ConnectionTrait>(
  conn: &C,
  actor_id: i64,
  amount: i64,
  description: Option<String>,
  reference: Option<String>,
) -> Result<()> {
  let updated = actor::Entity::update_many()
    .col_expr(actor::Column::Balance, Expr::col(actor::Column::Balance).add(amount))
    .col_expr(
      actor::Column::TotalEarned,
      Expr::col(actor::Column::TotalEarned).add(amount),
    )
    .filter(actor::Column::Id.eq(actor_id))
    .exec(conn)
    .await?;

  if updated.rows_affected == 0 {
    return Err(Error::ActorNotFound);
  }

  record(conn, actor_id, amount, LedgerEntryType::Commission, description, reference)
    .await
}

/// Take `amount` from the balance only if it is covered.
/// Returns the new balance.
pub(crate) async fn debit<C: ConnectionTrait>(
  conn: &C,
  actor_id: i64,
  amount: i64,
  entry_type: LedgerEntryType,
  description: Option<String>,
  reference: Option<String>,
) -> Result<i64> {
  let updated = actor::Entity::update_many()
    .col_expr(actor::Column::Balance, Expr::col(actor::Column::Balance).sub(amount))
    .filter(actor::Column::Id.eq(actor_id))
    .filter(actor::Column::Balance.gte(amount))
    .exec(conn)
    .await?;

  let model = actor::Entity::find_by_id(actor_id)
    .one(conn)
    .await?
    .ok_or(Error::ActorNotFound)?;

  if updated.rows_affected == 0 {
    return Err(Error::InsufficientBalance {
      balance: model.balance,
      requested: amount,
    });
  }

  record(conn, actor_id, -amount, entry_type, description, reference).await?;
  Ok(model.balance)
}

async fn record<C: ConnectionTrait>(
  conn: &C,
  actor_id: i64,
  amount: i64,
  entry_type: LedgerEntryType,
  description: Option<String>,
  reference: Option<String>,
) -> Result<()> {
  ledger_entry::ActiveModel {
    id: NotSet,
    actor_id: Set(actor_id),
    amount: Set(amount),
    entry_type: Set(entry_type),
    description: Set(description),
    reference: Set(reference),
    created_at: Set(utils::now()),
  }
  .insert(conn)
  .await?;

  Ok(())
}
