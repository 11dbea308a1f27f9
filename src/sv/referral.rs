use sea_orm::sea_query::Expr;
use serde::Serialize;

use crate::{
  entity::{
    ActorRef, ReferralStatus, actor, referral_entry, referral_transaction,
  },
  prelude::*,
  sv::{
    Commission, actor::resolve, commission::PaymentFrequency, ledger,
    notify::{self, Notification, NotificationKind, Notifier},
  },
  utils,
};

pub struct Referral<'a> {
  db: &'a DatabaseConnection,
  notifier: Option<&'a dyn Notifier>,
}

/// A referral entry with the referred actor and its transactions.
#[derive(Debug, Clone, Serialize)]
pub struct ReferralRecord {
  pub entry: referral_entry::Model,
  pub referred: actor::Model,
  pub transactions: Vec<referral_transaction::Model>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ReferralStats {
  pub referrals: u64,
  pub completed: u64,
  pub total_commission: i64,
  pub unpaid_commission: i64,
}

impl<'a> Referral<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db, notifier: None }
  }

  pub fn with_notifier(self, notifier: &'a dyn Notifier) -> Self {
    Self { notifier: Some(notifier), ..self }
  }

  /// Link `referred` to `referrer`. Calling it again for the same pair
  /// returns the existing entry.
  pub async fn record_referral(
    &self,
    referrer: ActorRef,
    referred: ActorRef,
  ) -> Result<referral_entry::Model> {
    let txn = self.db.begin().await?;

    let (referrer, referred) = resolve_pair(&txn, referrer, referred).await?;
    let entry = ensure_entry(&txn, referrer.id, referred.actor_ref()).await?;

    // first referrer wins
    actor::Entity::update_many()
      .col_expr(actor::Column::ReferredBy, Expr::value(referrer.id))
      .col_expr(actor::Column::ReferrerKind, Expr::value(referrer.kind))
      .filter(actor::Column::Id.eq(referred.id))
      .filter(actor::Column::ReferredBy.is_null())
      .exec(&txn)
      .await?;

    txn.commit().await?;
    Ok(entry)
  }

  /// Record a commission-earning transaction and credit the referrer.
  /// Returns the updated entry.
  pub async fn add_transaction(
    &self,
    referrer: ActorRef,
    referred: ActorRef,
    amount: i64,
    commission: i64,
    description: &str,
  ) -> Result<referral_entry::Model> {
    if amount <= 0 {
      return Err(Error::InvalidArgs("Transaction amount must be positive".into()));
    }
    if commission < 0 {
      return Err(Error::InvalidArgs("Commission cannot be negative".into()));
    }

    let txn = self.db.begin().await?;

    let (referrer, referred) = resolve_pair(&txn, referrer, referred).await?;
    let entry = ensure_entry(&txn, referrer.id, referred.actor_ref()).await?;
    let now = utils::now();

    referral_transaction::ActiveModel {
      id: NotSet,
      entry_id: Set(entry.id),
      amount: Set(amount),
      commission: Set(commission),
      description: Set(description.to_string()),
      status: Set(ReferralStatus::Completed),
      created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    referral_entry::Entity::update_many()
      .col_expr(
        referral_entry::Column::Commission,
        Expr::col(referral_entry::Column::Commission).add(commission),
      )
      .col_expr(
        referral_entry::Column::Status,
        Expr::value(ReferralStatus::Completed),
      )
      .filter(referral_entry::Column::Id.eq(entry.id))
      .exec(&txn)
      .await?;

    if commission > 0 {
      ledger::credit(
        &txn,
        referrer.id,
        commission,
        Some(format!("Referral commission: {description}")),
        Some(format!("REF-{}", entry.id)),
      )
      .await?;
    }

    let entry = referral_entry::Entity::find_by_id(entry.id)
      .one(&txn)
      .await?
      .ok_or(Error::ReferralNotFound)?;

    txn.commit().await?;

    info!(
      "{} earned {commission} from {} ({description})",
      referrer.actor_ref(),
      referred.actor_ref()
    );

    if let Some(notifier) = self.notifier.filter(|_| commission > 0) {
      notify::deliver(
        notifier,
        Notification {
          recipient: referrer.id,
          kind: NotificationKind::ReferralCommission,
          template: "referral_commission",
          data: json::json!({
            "referred": referred.actor_ref(),
            "amount": amount,
            "commission": commission,
            "description": description,
          }),
        },
      )
      .await;
    }

    Ok(entry)
  }

  /// Mark the commission of an entry as paid out.
  pub async fn settle_referral(
    &self,
    referrer: ActorRef,
    referred: ActorRef,
  ) -> Result<referral_entry::Model> {
    let entry = self
      .entry(referrer, referred)
      .await?
      .ok_or(Error::ReferralNotFound)?;

    if entry.is_paid {
      return Ok(entry);
    }

    let entry = referral_entry::ActiveModel {
      is_paid: Set(true),
      paid_at: Set(Some(utils::now())),
      ..entry.into()
    }
    .update(self.db)
    .await?;

    Ok(entry)
  }

  pub async fn entry(
    &self,
    referrer: ActorRef,
    referred: ActorRef,
  ) -> Result<Option<referral_entry::Model>> {
    let (referrer, referred) = resolve_pair(self.db, referrer, referred).await?;

    Ok(
      referral_entry::Entity::find()
        .filter(referral_entry::Column::ReferrerId.eq(referrer.id))
        .filter(referral_entry::Column::ReferredId.eq(referred.id))
        .filter(referral_entry::Column::ReferredKind.eq(referred.kind))
        .one(self.db)
        .await?,
    )
  }

  pub async fn history(&self, referrer: ActorRef) -> Result<Vec<ReferralRecord>> {
    let referrer = resolve_referrer(self.db, referrer).await?;

    let entries = referral_entry::Entity::find()
      .filter(referral_entry::Column::ReferrerId.eq(referrer.id))
      .order_by_desc(referral_entry::Column::CreatedAt)
      .find_with_related(referral_transaction::Entity)
      .all(self.db)
      .await?;

    let mut records = Vec::with_capacity(entries.len());
    for (entry, transactions) in entries {
      let referred = resolve(self.db, entry.referred()).await?;
      records.push(ReferralRecord { entry, referred, transactions });
    }

    Ok(records)
  }

  pub async fn stats(&self, referrer: ActorRef) -> Result<ReferralStats> {
    let referrer = resolve_referrer(self.db, referrer).await?;

    let entries = referral_entry::Entity::find()
      .filter(referral_entry::Column::ReferrerId.eq(referrer.id))
      .all(self.db)
      .await?;

    Ok(entries.iter().fold(ReferralStats::default(), |mut stats, entry| {
      stats.referrals += 1;
      stats.total_commission += entry.commission;
      if entry.status == ReferralStatus::Completed {
        stats.completed += 1;
      }
      if !entry.is_paid {
        stats.unpaid_commission += entry.commission;
      }
      stats
    }))
  }

  /// Pay the referrer of `referred` its commission on a revenue event.
  /// `None` when there is no referrer or nothing to pay.
  pub async fn process_revenue(
    &self,
    referred: ActorRef,
    base_amount: i64,
    frequency: PaymentFrequency,
    description: &str,
  ) -> Result<Option<referral_entry::Model>> {
    let model = resolve(self.db, referred).await?;
    let Some(referrer) = model.referrer() else {
      debug!("{referred} has no referrer, no commission");
      return Ok(None);
    };

    let commission = Commission::new(self.db)
      .calculate_commission(base_amount, frequency)
      .await?;
    if commission == 0 {
      return Ok(None);
    }

    self
      .add_transaction(referrer, referred, base_amount, commission, description)
      .await
      .map(Some)
  }
}

/// Find the entry for the pair or create a pending one.
pub(crate) async fn ensure_entry<C: ConnectionTrait>(
  conn: &C,
  referrer_id: i64,
  referred: ActorRef,
) -> Result<referral_entry::Model> {
  let existing = referral_entry::Entity::find()
    .filter(referral_entry::Column::ReferrerId.eq(referrer_id))
    .filter(referral_entry::Column::ReferredId.eq(referred.id))
    .one(conn)
    .await?;

  if let Some(entry) = existing {
    return Ok(entry);
  }

  let entry = referral_entry::ActiveModel {
    id: NotSet,
    referrer_id: Set(referrer_id),
    referred_id: Set(referred.id),
    referred_kind: Set(referred.kind),
    commission: Set(0),
    status: Set(ReferralStatus::Pending),
    is_paid: Set(false),
    paid_at: Set(None),
    created_at: Set(utils::now()),
  }
  .insert(conn)
  .await?;

  debug!("New referral entry #{} for {referred}", entry.id);
  Ok(entry)
}

async fn resolve_referrer<C: ConnectionTrait>(
  conn: &C,
  referrer: ActorRef,
) -> Result<actor::Model> {
  resolve(conn, referrer).await.map_err(|err| match err {
    Error::ActorNotFound => Error::ReferrerNotFound,
    err => err,
  })
}

async fn resolve_pair<C: ConnectionTrait>(
  conn: &C,
  referrer: ActorRef,
  referred: ActorRef,
) -> Result<(actor::Model, actor::Model)> {
  if referrer.id == referred.id {
    return Err(Error::InvalidArgs("An actor cannot refer itself".into()));
  }

  let referrer = resolve_referrer(conn, referrer).await?;
  let referred = resolve(conn, referred).await?;
  Ok((referrer, referred))
}
