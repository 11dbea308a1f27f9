use serde::{Deserialize, Serialize};

use crate::{
  entity::{ActorKind, ActorRef, ActorStatus, AccountType, actor, bank_details},
  prelude::*,
  sv::referral,
  utils,
};

const CODE_ATTEMPTS: usize = 5;

pub struct Actor<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankDetailsInput {
  pub bank_name: String,
  pub account_number: String,
  pub account_name: String,
  pub account_type: Option<AccountType>,
}

impl<'a> Actor<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Register a new actor, optionally under the owner of `referral_code`.
  /// The referral entry for the new actor is created in the same transaction.
  pub async fn register(
    &self,
    kind: ActorKind,
    name: &str,
    email: &str,
    referral_code: Option<&str>,
  ) -> Result<actor::Model> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() {
      return Err(Error::InvalidArgs("Name is required".into()));
    }
    if !email.contains('@') {
      return Err(Error::InvalidArgs(format!("Invalid email `{email}`")));
    }

    let txn = self.db.begin().await?;

    let referrer = match referral_code.map(str::trim) {
      Some(code) if !code.is_empty() => Some(
        by_code(&txn, code)
          .await?
          .ok_or_else(|| Error::InvalidReferralCode(code.to_string()))?,
      ),
      _ => None,
    };

    let code = unique_code(&txn, kind).await?;
    let now = utils::now();

    let actor = actor::ActiveModel {
      id: NotSet,
      kind: Set(kind),
      name: Set(name.to_string()),
      email: Set(email.to_string()),
      status: Set(ActorStatus::Active),
      referral_code: Set(code),
      referred_by: Set(referrer.as_ref().map(|r| r.id)),
      referrer_kind: Set(referrer.as_ref().map(|r| r.kind)),
      balance: Set(0),
      total_earned: Set(0),
      last_withdrawal: Set(None),
      created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    if let Some(referrer) = &referrer {
      referral::ensure_entry(&txn, referrer.id, actor.actor_ref()).await?;
    }

    txn.commit().await?;

    info!(
      "Registered {} `{}` with code {}{}",
      actor.actor_ref(),
      actor.name,
      actor.referral_code,
      referrer
        .map(|r| format!(", referred by {}", r.actor_ref()))
        .unwrap_or_default()
    );

    Ok(actor)
  }

  pub async fn by_id(&self, id: i64) -> Result<Option<actor::Model>> {
    Ok(actor::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn resolve(&self, actor: ActorRef) -> Result<actor::Model> {
    resolve(self.db, actor).await
  }

  pub async fn by_referral_code(
    &self,
    code: &str,
  ) -> Result<Option<actor::Model>> {
    by_code(self.db, code.trim()).await
  }

  /// Actors directly referred by `actor`.
  pub async fn referred(&self, actor: ActorRef) -> Result<Vec<actor::Model>> {
    let actor = self.resolve(actor).await?;
    Ok(
      actor::Entity::find()
        .filter(actor::Column::ReferredBy.eq(actor.id))
        .order_by_asc(actor::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }

  pub async fn set_status(
    &self,
    actor: ActorRef,
    status: ActorStatus,
  ) -> Result<actor::Model> {
    let actor = self.resolve(actor).await?;
    if actor.status == status {
      return Ok(actor);
    }

    let actor = actor::ActiveModel { status: Set(status), ..actor.into() }
      .update(self.db)
      .await?;

    info!("{} is now {:?}", actor.actor_ref(), status);
    Ok(actor)
  }

  /// Store bank details; a well-formed account number marks them verified.
  pub async fn set_bank_details(
    &self,
    actor: ActorRef,
    input: BankDetailsInput,
  ) -> Result<bank_details::Model> {
    let account_number = input.account_number.trim().to_string();
    if account_number.len() != 10
      || !account_number.chars().all(|c| c.is_ascii_digit())
    {
      return Err(Error::InvalidArgs(
        "Account number must be exactly 10 digits".into(),
      ));
    }
    if input.bank_name.trim().is_empty() || input.account_name.trim().is_empty()
    {
      return Err(Error::InvalidArgs(
        "Bank name and account name are required".into(),
      ));
    }

    let actor = self.resolve(actor).await?;
    let now = utils::now();

    let model = bank_details::ActiveModel {
      actor_id: Set(actor.id),
      bank_name: Set(input.bank_name.trim().to_string()),
      account_number: Set(account_number),
      account_name: Set(input.account_name.trim().to_string()),
      account_type: Set(input.account_type),
      verified_at: Set(Some(now)),
    };

    let existing =
      bank_details::Entity::find_by_id(actor.id).one(self.db).await?;

    let details = match existing {
      Some(_) => model.update(self.db).await?,
      None => model.insert(self.db).await?,
    };

    Ok(details)
  }

  pub async fn bank_details(
    &self,
    actor: ActorRef,
  ) -> Result<Option<bank_details::Model>> {
    let actor = self.resolve(actor).await?;
    Ok(bank_details::Entity::find_by_id(actor.id).one(self.db).await?)
  }
}

/// Load the actor behind a tagged reference, checking the tag.
pub(crate) async fn resolve<C: ConnectionTrait>(
  conn: &C,
  actor: ActorRef,
) -> Result<actor::Model> {
  let model = actor::Entity::find_by_id(actor.id)
    .one(conn)
    .await?
    .ok_or(Error::ActorNotFound)?;

  if model.kind != actor.kind {
    return Err(Error::KindMismatch { expected: actor.kind, found: model.kind });
  }

  Ok(model)
}

async fn by_code<C: ConnectionTrait>(
  conn: &C,
  code: &str,
) -> Result<Option<actor::Model>> {
  Ok(
    actor::Entity::find()
      .filter(actor::Column::ReferralCode.eq(code.to_uppercase()))
      .one(conn)
      .await?,
  )
}

async fn unique_code<C: ConnectionTrait>(
  conn: &C,
  kind: ActorKind,
) -> Result<String> {
  for _ in 0..CODE_ATTEMPTS {
    let code = utils::random_code(kind.code_prefix(), 8);
    if by_code(conn, &code).await?.is_none() {
      return Ok(code);
    }
    debug!("Referral code {code} collided, retrying");
  }

  Err(Error::Internal("Could not allocate a unique referral code".into()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::{ReferralStatus, referral_entry},
    sv::test_utils::{self, test_db},
  };

  fn bank() -> BankDetailsInput {
    BankDetailsInput {
      bank_name: "Access Bank".into(),
      account_number: "0123456789".into(),
      account_name: "Ada Obi".into(),
      account_type: Some(AccountType::Current),
    }
  }

  #[tokio::test]
  async fn test_register_generates_prefixed_code() {
    let db = test_db::setup().await;
    let sv = Actor::new(&db);

    let agent =
      sv.register(ActorKind::Agent, "Ada", "ada@example.com", None).await.unwrap();
    let landlord = sv
      .register(ActorKind::Landlord, "Bola", "bola@example.com", None)
      .await
      .unwrap();
    let tenant = sv
      .register(ActorKind::Tenant, "Chi", "chi@example.com", None)
      .await
      .unwrap();

    assert!(agent.referral_code.starts_with("AG"));
    assert!(landlord.referral_code.starts_with("LL"));
    assert!(tenant.referral_code.starts_with("TN"));
    assert_eq!(agent.referral_code.len(), 10);
    assert_eq!(agent.balance, 0);
    assert_eq!(agent.referred_by, None);
  }

  #[tokio::test]
  async fn test_register_with_referral_code() {
    let db = test_db::setup().await;
    let sv = Actor::new(&db);

    let agent =
      sv.register(ActorKind::Agent, "Ada", "ada@example.com", None).await.unwrap();
    let code = agent.referral_code.to_lowercase();

    let landlord = sv
      .register(ActorKind::Landlord, "Bola", "bola@example.com", Some(&code))
      .await
      .unwrap();

    assert_eq!(landlord.referrer(), Some(ActorRef::agent(agent.id)));

    let entries = referral_entry::Entity::find()
      .filter(referral_entry::Column::ReferrerId.eq(agent.id))
      .all(&db)
      .await
      .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].referred(), landlord.actor_ref());
    assert_eq!(entries[0].status, ReferralStatus::Pending);
    assert_eq!(entries[0].commission, 0);

    let downline = sv.referred(agent.actor_ref()).await.unwrap();
    assert_eq!(downline.len(), 1);
    assert_eq!(downline[0].id, landlord.id);
  }

  #[tokio::test]
  async fn test_register_unknown_code_creates_nothing() {
    let db = test_db::setup().await;
    let sv = Actor::new(&db);

    let result = sv
      .register(ActorKind::Tenant, "Chi", "chi@example.com", Some("AGNOPE0000"))
      .await;
    assert!(matches!(result, Err(Error::InvalidReferralCode(_))));
    assert_eq!(actor::Entity::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_resolve_checks_kind() {
    let db = test_db::setup().await;
    let landlord =
      test_utils::actor(&db, ActorKind::Landlord, 0, 0).await;
    let sv = Actor::new(&db);

    assert!(sv.resolve(ActorRef::landlord(landlord.id)).await.is_ok());
    assert!(matches!(
      sv.resolve(ActorRef::tenant(landlord.id)).await,
      Err(Error::KindMismatch {
        expected: ActorKind::Tenant,
        found: ActorKind::Landlord
      })
    ));
    assert!(matches!(
      sv.resolve(ActorRef::agent(9999)).await,
      Err(Error::ActorNotFound)
    ));
  }

  #[tokio::test]
  async fn test_bank_details_validation_and_upsert() {
    let db = test_db::setup().await;
    let agent = test_utils::agent(&db, 0).await;
    let sv = Actor::new(&db);

    let mut bad = bank();
    bad.account_number = "12345".into();
    assert!(matches!(
      sv.set_bank_details(agent.actor_ref(), bad).await,
      Err(Error::InvalidArgs(_))
    ));

    let details = sv.set_bank_details(agent.actor_ref(), bank()).await.unwrap();
    assert!(details.is_verified());

    let mut changed = bank();
    changed.bank_name = "Zenith".into();
    sv.set_bank_details(agent.actor_ref(), changed).await.unwrap();

    let stored = sv.bank_details(agent.actor_ref()).await.unwrap().unwrap();
    assert_eq!(stored.bank_name, "Zenith");
  }

  #[tokio::test]
  async fn test_set_status() {
    let db = test_db::setup().await;
    let agent = test_utils::agent(&db, 0).await;

    let updated = Actor::new(&db)
      .set_status(agent.actor_ref(), ActorStatus::Suspended)
      .await
      .unwrap();
    assert_eq!(updated.status, ActorStatus::Suspended);
  }
}
