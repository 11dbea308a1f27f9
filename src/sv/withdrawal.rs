use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};

use crate::{
  entity::{
    ActorKind, ActorRef, ActorStatus, LedgerEntryType, WithdrawalStatus,
    WithdrawalType, actor, bank_details, withdrawal, withdrawal_settings,
  },
  prelude::*,
  sv::{
    actor::resolve,
    ledger,
    notify::{self, Notification, NotificationKind, Notifier},
  },
  utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalLimits {
  pub minimum: i64,
  pub maximum: i64,
}

impl Default for WithdrawalLimits {
  fn default() -> Self {
    Self { minimum: 10_000, maximum: 1_000_000 }
  }
}

impl WithdrawalLimits {
  fn validate(&self) -> Result<()> {
    if self.minimum <= 0 || self.minimum > self.maximum {
      return Err(Error::InvalidArgs(format!(
        "Invalid withdrawal limits {}..={}",
        self.minimum, self.maximum
      )));
    }
    Ok(())
  }

  fn check(&self, amount: i64) -> Result<()> {
    if amount < self.minimum || amount > self.maximum {
      return Err(Error::AmountOutOfRange {
        amount,
        min: self.minimum,
        max: self.maximum,
      });
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusTotal {
  pub status: WithdrawalStatus,
  pub count: i64,
  pub amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalStats {
  pub by_status: Vec<StatusTotal>,
  pub total: i64,
  pub pending_amount: i64,
}

pub struct Withdrawal<'a> {
  db: &'a DatabaseConnection,
  notifier: &'a dyn Notifier,
  limits: WithdrawalLimits,
}

impl<'a> Withdrawal<'a> {
  pub fn new(db: &'a DatabaseConnection, notifier: &'a dyn Notifier) -> Self {
    Self { db, notifier, limits: WithdrawalLimits::default() }
  }

  /// Limits given to agents without their own settings.
  pub fn with_limits(self, limits: WithdrawalLimits) -> Self {
    Self { limits, ..self }
  }

  /// File a pending request. The balance is only debited on approval.
  pub async fn request_withdrawal(
    &self,
    agent: ActorRef,
    amount: i64,
    withdrawal_type: Option<WithdrawalType>,
  ) -> Result<withdrawal::Model> {
    if agent.kind != ActorKind::Agent {
      return Err(Error::WithdrawalNotAllowed);
    }

    let agent = resolve(self.db, agent).await?;
    if agent.status == ActorStatus::Suspended {
      return Err(Error::ActorSuspended);
    }

    let verified = bank_details::Entity::find_by_id(agent.id)
      .one(self.db)
      .await?
      .is_some_and(|details| details.is_verified());
    if !verified {
      return Err(Error::BankDetailsMissing);
    }

    let settings = settings_for(self.db, agent.id, self.limits).await?;
    WithdrawalLimits {
      minimum: settings.minimum_amount,
      maximum: settings.maximum_amount,
    }
    .check(amount)?;

    if amount > agent.balance {
      return Err(Error::InsufficientBalance {
        balance: agent.balance,
        requested: amount,
      });
    }

    let request = withdrawal::ActiveModel {
      id: NotSet,
      agent_id: Set(agent.id),
      amount: Set(amount),
      status: Set(WithdrawalStatus::Pending),
      withdrawal_type: Set(withdrawal_type.unwrap_or(settings.preferred_type)),
      reference: Set(utils::random_code("WTH", 10)),
      requested_at: Set(utils::now()),
      processed_at: Set(None),
      processed_by: Set(None),
      remarks: Set(None),
      failure_reason: Set(None),
    }
    .insert(self.db)
    .await?;

    info!(
      "{} requested withdrawal {} of {amount}",
      agent.actor_ref(),
      request.reference
    );
    Ok(request)
  }

  /// Complete a pending request and debit the agent in one transaction.
  pub async fn approve_withdrawal(
    &self,
    id: i64,
    processed_by: i64,
    remarks: Option<String>,
  ) -> Result<withdrawal::Model> {
    let txn = self.db.begin().await?;
    let now = utils::now();

    let request = transition(
      &txn,
      id,
      None,
      withdrawal::ActiveModel {
        status: Set(WithdrawalStatus::Completed),
        processed_at: Set(Some(now)),
        processed_by: Set(Some(processed_by)),
        remarks: Set(remarks),
        ..Default::default()
      },
    )
    .await?;

    let balance = ledger::debit(
      &txn,
      request.agent_id,
      request.amount,
      LedgerEntryType::Withdrawal,
      Some(format!("Withdrawal {}", request.reference)),
      Some(request.reference.clone()),
    )
    .await?;

    actor::Entity::update_many()
      .col_expr(actor::Column::LastWithdrawal, Expr::value(Some(now)))
      .filter(actor::Column::Id.eq(request.agent_id))
      .exec(&txn)
      .await?;

    txn.commit().await?;

    info!(
      "Withdrawal {} approved by #{processed_by}, agent balance {balance}",
      request.reference
    );

    notify::deliver(
      self.notifier,
      Notification {
        recipient: request.agent_id,
        kind: NotificationKind::WithdrawalApproved,
        template: "withdrawal_approved",
        data: json::json!({
          "amount": request.amount,
          "reference": request.reference,
          "status": "approved",
          "date": now,
        }),
      },
    )
    .await;

    Ok(request)
  }

  /// Fail a pending request. The balance is untouched.
  pub async fn reject_withdrawal(
    &self,
    id: i64,
    processed_by: i64,
    reason: &str,
  ) -> Result<withdrawal::Model> {
    let now = utils::now();

    let request = transition(
      self.db,
      id,
      None,
      withdrawal::ActiveModel {
        status: Set(WithdrawalStatus::Failed),
        processed_at: Set(Some(now)),
        processed_by: Set(Some(processed_by)),
        failure_reason: Set(Some(reason.to_string())),
        ..Default::default()
      },
    )
    .await?;

    info!("Withdrawal {} rejected: {reason}", request.reference);

    notify::deliver(
      self.notifier,
      Notification {
        recipient: request.agent_id,
        kind: NotificationKind::WithdrawalRejected,
        template: "withdrawal_rejected",
        data: json::json!({
          "amount": request.amount,
          "reference": request.reference,
          "status": "rejected",
          "reason": reason,
          "date": now,
        }),
      },
    )
    .await;

    Ok(request)
  }

  /// The agent withdraws its own pending request.
  pub async fn cancel_withdrawal(
    &self,
    agent: ActorRef,
    id: i64,
  ) -> Result<withdrawal::Model> {
    let agent = resolve(self.db, agent).await?;

    let request = transition(
      self.db,
      id,
      Some(agent.id),
      withdrawal::ActiveModel {
        status: Set(WithdrawalStatus::Cancelled),
        processed_at: Set(Some(utils::now())),
        ..Default::default()
      },
    )
    .await?;

    debug!("{} cancelled withdrawal {}", agent.actor_ref(), request.reference);
    Ok(request)
  }

  pub async fn history(
    &self,
    agent: ActorRef,
    limit: u64,
  ) -> Result<Vec<withdrawal::Model>> {
    let agent = resolve(self.db, agent).await?;

    Ok(
      withdrawal::Entity::find()
        .filter(withdrawal::Column::AgentId.eq(agent.id))
        .order_by_desc(withdrawal::Column::RequestedAt)
        .order_by_desc(withdrawal::Column::Id)
        .limit(limit)
        .all(self.db)
        .await?,
    )
  }

  /// Pending requests, oldest first.
  pub async fn pending(&self) -> Result<Vec<withdrawal::Model>> {
    Ok(
      withdrawal::Entity::find()
        .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Pending))
        .order_by_asc(withdrawal::Column::RequestedAt)
        .order_by_asc(withdrawal::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn statistics(&self) -> Result<WithdrawalStats> {
    let rows: Vec<(WithdrawalStatus, i64, Option<i64>)> =
      withdrawal::Entity::find()
        .select_only()
        .column(withdrawal::Column::Status)
        .column_as(Expr::col(withdrawal::Column::Id).count(), "count")
        .column_as(Expr::col(withdrawal::Column::Amount).sum(), "amount")
        .group_by(withdrawal::Column::Status)
        .into_tuple()
        .all(self.db)
        .await?;

    let by_status: Vec<_> = rows
      .into_iter()
      .map(|(status, count, amount)| StatusTotal {
        status,
        count,
        amount: amount.unwrap_or(0),
      })
      .collect();

    Ok(WithdrawalStats {
      total: by_status.iter().map(|s| s.count).sum(),
      pending_amount: by_status
        .iter()
        .find(|s| s.status == WithdrawalStatus::Pending)
        .map_or(0, |s| s.amount),
      by_status,
    })
  }

  pub async fn settings(
    &self,
    agent: ActorRef,
  ) -> Result<withdrawal_settings::Model> {
    let agent = resolve_agent(self.db, agent).await?;
    settings_for(self.db, agent.id, self.limits).await
  }

  pub async fn set_preferred_type(
    &self,
    agent: ActorRef,
    preferred: WithdrawalType,
  ) -> Result<withdrawal_settings::Model> {
    let settings = self.settings(agent).await?;

    Ok(
      withdrawal_settings::ActiveModel {
        preferred_type: Set(preferred),
        ..settings.into()
      }
      .update(self.db)
      .await?,
    )
  }

  pub async fn set_limits(
    &self,
    agent: ActorRef,
    limits: WithdrawalLimits,
  ) -> Result<withdrawal_settings::Model> {
    limits.validate()?;
    let settings = self.settings(agent).await?;

    let settings = withdrawal_settings::ActiveModel {
      minimum_amount: Set(limits.minimum),
      maximum_amount: Set(limits.maximum),
      ..settings.into()
    }
    .update(self.db)
    .await?;

    info!(
      "Withdrawal limits of agent #{} set to {}..={}",
      settings.agent_id, limits.minimum, limits.maximum
    );
    Ok(settings)
  }
}

async fn resolve_agent<C: ConnectionTrait>(
  conn: &C,
  agent: ActorRef,
) -> Result<actor::Model> {
  if agent.kind != ActorKind::Agent {
    return Err(Error::WithdrawalNotAllowed);
  }
  resolve(conn, agent).await
}

async fn settings_for<C: ConnectionTrait>(
  conn: &C,
  agent_id: i64,
  defaults: WithdrawalLimits,
) -> Result<withdrawal_settings::Model> {
  if let Some(settings) =
    withdrawal_settings::Entity::find_by_id(agent_id).one(conn).await?
  {
    return Ok(settings);
  }

  Ok(
    withdrawal_settings::ActiveModel {
      agent_id: Set(agent_id),
      preferred_type: Set(WithdrawalType::default()),
      minimum_amount: Set(defaults.minimum),
      maximum_amount: Set(defaults.maximum),
    }
    .insert(conn)
    .await?,
  )
}

/// Apply `change` only while the request is still pending.
async fn transition<C: ConnectionTrait>(
  conn: &C,
  id: i64,
  owner: Option<i64>,
  change: withdrawal::ActiveModel,
) -> Result<withdrawal::Model> {
  let mut update = withdrawal::Entity::update_many()
    .set(change)
    .filter(withdrawal::Column::Id.eq(id))
    .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Pending));
  if let Some(agent_id) = owner {
    update = update.filter(withdrawal::Column::AgentId.eq(agent_id));
  }
  let updated = update.exec(conn).await?;

  let request = withdrawal::Entity::find_by_id(id)
    .one(conn)
    .await?
    .filter(|request| owner.is_none_or(|agent_id| request.agent_id == agent_id))
    .ok_or(Error::WithdrawalNotFound)?;

  if updated.rows_affected == 0 {
    return Err(Error::AlreadyProcessed { status: request.status });
  }

  Ok(request)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{
    Ledger,
    ledger::credit,
    notify::LogNotifier,
    test_utils::{self, FailingNotifier, RecordingNotifier, test_db},
  };

  const SCENARIO: WithdrawalLimits =
    WithdrawalLimits { minimum: 1_000, maximum: 1_000_000 };

  /// Agent with verified bank details and `balance` earned through the ledger.
  async fn funded_agent(db: &DatabaseConnection, balance: i64) -> actor::Model {
    let agent = test_utils::agent(db, 0).await;
    test_utils::verified_bank(db, agent.id).await;
    if balance > 0 {
      credit(db, agent.id, balance, None, None).await.unwrap();
    }
    test_utils::reload(db, agent.id).await
  }

  #[tokio::test]
  async fn test_request_and_approve() {
    let db = test_db::setup().await;
    let notifier = RecordingNotifier::default();
    let sv = Withdrawal::new(&db, &notifier).with_limits(SCENARIO);
    let agent = funded_agent(&db, 20_000).await;

    let request =
      sv.request_withdrawal(agent.actor_ref(), 15_000, None).await.unwrap();
    assert_eq!(request.status, WithdrawalStatus::Pending);
    assert_eq!(request.withdrawal_type, WithdrawalType::Partial);
    assert!(request.reference.starts_with("WTH"));
    assert_eq!(request.reference.len(), 13);
    // nothing is debited until approval
    assert_eq!(test_utils::reload(&db, agent.id).await.balance, 20_000);

    let approved = sv.approve_withdrawal(request.id, 1, None).await.unwrap();
    assert_eq!(approved.status, WithdrawalStatus::Completed);
    assert_eq!(approved.processed_by, Some(1));

    let reloaded = test_utils::reload(&db, agent.id).await;
    assert_eq!(reloaded.balance, 5_000);
    assert!(reloaded.last_withdrawal.is_some());

    let again = sv.approve_withdrawal(request.id, 1, None).await;
    assert!(matches!(
      again,
      Err(Error::AlreadyProcessed { status: WithdrawalStatus::Completed })
    ));
    assert_eq!(test_utils::reload(&db, agent.id).await.balance, 5_000);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::WithdrawalApproved);
    assert_eq!(sent[0].data["reference"], request.reference.as_str());

    let audit = Ledger::new(&db).audit(agent.actor_ref()).await.unwrap();
    assert!(audit.is_consistent());
    assert_eq!(audit.withdrawn, 15_000);
  }

  #[tokio::test]
  async fn test_amount_limits_are_inclusive() {
    let db = test_db::setup().await;
    let notifier = RecordingNotifier::default();
    let sv = Withdrawal::new(&db, &notifier).with_limits(SCENARIO);
    let agent = funded_agent(&db, 2_000_000).await;

    assert!(sv.request_withdrawal(agent.actor_ref(), 1_000_000, None).await.is_ok());
    assert!(sv.request_withdrawal(agent.actor_ref(), 1_000, None).await.is_ok());
    assert!(matches!(
      sv.request_withdrawal(agent.actor_ref(), 1_000_001, None).await,
      Err(Error::AmountOutOfRange { amount: 1_000_001, min: 1_000, max: 1_000_000 })
    ));
    assert!(matches!(
      sv.request_withdrawal(agent.actor_ref(), 999, None).await,
      Err(Error::AmountOutOfRange { .. })
    ));
  }

  #[tokio::test]
  async fn test_maximum_with_exact_balance() {
    let db = test_db::setup().await;
    let notifier = RecordingNotifier::default();
    let sv = Withdrawal::new(&db, &notifier).with_limits(SCENARIO);
    let agent = funded_agent(&db, SCENARIO.maximum).await;

    assert!(matches!(
      sv.request_withdrawal(agent.actor_ref(), SCENARIO.maximum + 1, None).await,
      Err(Error::AmountOutOfRange { .. })
    ));

    let request = sv
      .request_withdrawal(agent.actor_ref(), SCENARIO.maximum, None)
      .await
      .unwrap();
    sv.approve_withdrawal(request.id, 1, None).await.unwrap();
    assert_eq!(test_utils::reload(&db, agent.id).await.balance, 0);
  }

  /// Approve every id from its own task and collect the outcomes.
  async fn approve_all(
    db: &DatabaseConnection,
    ids: &[i64],
  ) -> Vec<Result<withdrawal::Model>> {
    let handles: Vec<_> = ids
      .iter()
      .map(|&id| {
        let db = db.clone();
        tokio::spawn(async move {
          Withdrawal::new(&db, &LogNotifier).approve_withdrawal(id, 1, None).await
        })
      })
      .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
      results.push(handle.await.unwrap());
    }
    results
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_concurrent_approvals_debit_once() {
    let shared = test_db::file().await;
    let db = &shared.db;
    let agent = funded_agent(db, 20_000).await;
    let request = Withdrawal::new(db, &LogNotifier)
      .with_limits(SCENARIO)
      .request_withdrawal(agent.actor_ref(), 15_000, None)
      .await
      .unwrap();

    let results = approve_all(db, &[request.id; 4]).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
      results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(Error::AlreadyProcessed { .. })))
    );

    assert_eq!(test_utils::reload(db, agent.id).await.balance, 5_000);
    let audit = Ledger::new(db).audit(agent.actor_ref()).await.unwrap();
    assert!(audit.is_consistent());
    assert_eq!(audit.withdrawn, 15_000);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_concurrent_approvals_respect_balance() {
    let shared = test_db::file().await;
    let db = &shared.db;
    let agent = funded_agent(db, 20_000).await;
    let sv = Withdrawal::new(db, &LogNotifier).with_limits(SCENARIO);

    let first =
      sv.request_withdrawal(agent.actor_ref(), 15_000, None).await.unwrap();
    let second =
      sv.request_withdrawal(agent.actor_ref(), 15_000, None).await.unwrap();

    let results = approve_all(db, &[first.id, second.id]).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
      r,
      Err(Error::InsufficientBalance { balance: 5_000, requested: 15_000 })
    )));

    let agent = test_utils::reload(db, agent.id).await;
    assert_eq!(agent.balance, 5_000);
    assert_eq!(sv.pending().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_request_preconditions() {
    let db = test_db::setup().await;
    let notifier = RecordingNotifier::default();
    let sv = Withdrawal::new(&db, &notifier).with_limits(SCENARIO);

    let landlord = test_utils::actor(&db, ActorKind::Landlord, 50_000, 50_000).await;
    assert!(matches!(
      sv.request_withdrawal(landlord.actor_ref(), 5_000, None).await,
      Err(Error::WithdrawalNotAllowed)
    ));

    let unbanked = test_utils::agent(&db, 50_000).await;
    assert!(matches!(
      sv.request_withdrawal(unbanked.actor_ref(), 5_000, None).await,
      Err(Error::BankDetailsMissing)
    ));

    let poor = funded_agent(&db, 2_000).await;
    assert!(matches!(
      sv.request_withdrawal(poor.actor_ref(), 5_000, None).await,
      Err(Error::InsufficientBalance { balance: 2_000, requested: 5_000 })
    ));

    let suspended = funded_agent(&db, 50_000).await;
    crate::sv::Actor::new(&db)
      .set_status(suspended.actor_ref(), ActorStatus::Suspended)
      .await
      .unwrap();
    assert!(matches!(
      sv.request_withdrawal(suspended.actor_ref(), 5_000, None).await,
      Err(Error::ActorSuspended)
    ));

    assert_eq!(withdrawal::Entity::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_reject_keeps_balance() {
    let db = test_db::setup().await;
    let notifier = RecordingNotifier::default();
    let sv = Withdrawal::new(&db, &notifier).with_limits(SCENARIO);
    let agent = funded_agent(&db, 20_000).await;

    let request =
      sv.request_withdrawal(agent.actor_ref(), 15_000, None).await.unwrap();
    let rejected =
      sv.reject_withdrawal(request.id, 1, "Account name mismatch").await.unwrap();

    assert_eq!(rejected.status, WithdrawalStatus::Failed);
    assert_eq!(rejected.failure_reason.as_deref(), Some("Account name mismatch"));
    assert_eq!(test_utils::reload(&db, agent.id).await.balance, 20_000);

    assert!(matches!(
      sv.approve_withdrawal(request.id, 1, None).await,
      Err(Error::AlreadyProcessed { status: WithdrawalStatus::Failed })
    ));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::WithdrawalRejected);
  }

  #[tokio::test]
  async fn test_approval_rolls_back_when_balance_is_gone() {
    let db = test_db::setup().await;
    let notifier = RecordingNotifier::default();
    let sv = Withdrawal::new(&db, &notifier).with_limits(SCENARIO);
    let agent = funded_agent(&db, 20_000).await;

    let first =
      sv.request_withdrawal(agent.actor_ref(), 15_000, None).await.unwrap();
    let second =
      sv.request_withdrawal(agent.actor_ref(), 15_000, None).await.unwrap();

    sv.approve_withdrawal(first.id, 1, None).await.unwrap();
    assert!(matches!(
      sv.approve_withdrawal(second.id, 1, None).await,
      Err(Error::InsufficientBalance { balance: 5_000, requested: 15_000 })
    ));

    // status change rolled back with the failed debit
    let second = withdrawal::Entity::find_by_id(second.id)
      .one(&db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(second.status, WithdrawalStatus::Pending);
    assert_eq!(test_utils::reload(&db, agent.id).await.balance, 5_000);
  }

  #[tokio::test]
  async fn test_cancel_own_request() {
    let db = test_db::setup().await;
    let notifier = RecordingNotifier::default();
    let sv = Withdrawal::new(&db, &notifier).with_limits(SCENARIO);
    let agent = funded_agent(&db, 20_000).await;
    let other = funded_agent(&db, 20_000).await;

    let request =
      sv.request_withdrawal(agent.actor_ref(), 5_000, None).await.unwrap();

    assert!(matches!(
      sv.cancel_withdrawal(other.actor_ref(), request.id).await,
      Err(Error::WithdrawalNotFound)
    ));

    let cancelled =
      sv.cancel_withdrawal(agent.actor_ref(), request.id).await.unwrap();
    assert_eq!(cancelled.status, WithdrawalStatus::Cancelled);
    assert!(sv.pending().await.unwrap().is_empty());

    assert!(matches!(
      sv.cancel_withdrawal(agent.actor_ref(), request.id).await,
      Err(Error::AlreadyProcessed { status: WithdrawalStatus::Cancelled })
    ));
    assert!(matches!(
      sv.approve_withdrawal(9999, 1, None).await,
      Err(Error::WithdrawalNotFound)
    ));
  }

  #[tokio::test]
  async fn test_failed_notification_does_not_fail_approval() {
    let db = test_db::setup().await;
    let sv = Withdrawal::new(&db, &FailingNotifier).with_limits(SCENARIO);
    let agent = funded_agent(&db, 20_000).await;

    let request =
      sv.request_withdrawal(agent.actor_ref(), 10_000, None).await.unwrap();
    let approved = sv.approve_withdrawal(request.id, 1, None).await.unwrap();
    assert_eq!(approved.status, WithdrawalStatus::Completed);
  }

  #[tokio::test]
  async fn test_settings_history_and_statistics() {
    let db = test_db::setup().await;
    let notifier = RecordingNotifier::default();
    let sv = Withdrawal::new(&db, &notifier);
    let agent = funded_agent(&db, 100_000).await;

    let settings = sv.settings(agent.actor_ref()).await.unwrap();
    assert_eq!(settings.minimum_amount, 10_000);
    assert_eq!(settings.maximum_amount, 1_000_000);

    sv.set_preferred_type(agent.actor_ref(), WithdrawalType::Quarterly)
      .await
      .unwrap();
    assert!(matches!(
      sv.set_limits(agent.actor_ref(), WithdrawalLimits { minimum: 5, maximum: 1 })
        .await,
      Err(Error::InvalidArgs(_))
    ));
    sv.set_limits(agent.actor_ref(), WithdrawalLimits { minimum: 500, maximum: 50_000 })
      .await
      .unwrap();

    let small = sv.request_withdrawal(agent.actor_ref(), 500, None).await.unwrap();
    assert_eq!(small.withdrawal_type, WithdrawalType::Quarterly);
    let big = sv
      .request_withdrawal(agent.actor_ref(), 40_000, Some(WithdrawalType::Annual))
      .await
      .unwrap();
    sv.approve_withdrawal(big.id, 1, Some("Paid".into())).await.unwrap();

    let history = sv.history(agent.actor_ref(), 10).await.unwrap();
    assert_eq!(history.len(), 2);

    let stats = sv.statistics().await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.pending_amount, 500);
    let completed = stats
      .by_status
      .iter()
      .find(|s| s.status == WithdrawalStatus::Completed)
      .unwrap();
    assert_eq!((completed.count, completed.amount), (1, 40_000));
  }
}
