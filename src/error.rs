use sea_orm::{ConnAcquireErr, DbErr, RuntimeErr, sqlx};

use crate::entity::{ActorKind, WithdrawalStatus};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  NotFound,
  Conflict,
  InsufficientBalance,
  Configuration,
  Storage,
  Transient,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Db(DbErr),
  #[error("Database did not respond in time: {0}")]
  Transient(DbErr),

  #[error("Invalid arguments: {0}")]
  InvalidArgs(String),
  #[error("Amount {amount} is outside the allowed range {min}..={max}")]
  AmountOutOfRange { amount: i64, min: i64, max: i64 },
  #[error("Verified bank details are required")]
  BankDetailsMissing,
  #[error("Referral code `{0}` does not exist")]
  InvalidReferralCode(String),
  #[error("Expected {expected}, found {found}")]
  KindMismatch { expected: ActorKind, found: ActorKind },
  #[error("Actor is suspended")]
  ActorSuspended,
  #[error("Only agents can request withdrawals")]
  WithdrawalNotAllowed,

  #[error("Actor not found")]
  ActorNotFound,
  #[error("Referrer not found")]
  ReferrerNotFound,
  #[error("Referral entry not found")]
  ReferralNotFound,
  #[error("Ranking tier not found")]
  TierNotFound,
  #[error("Withdrawal request not found")]
  WithdrawalNotFound,

  #[error("Withdrawal was already processed (status: {status})")]
  AlreadyProcessed { status: WithdrawalStatus },
  #[error("Tier is held by {agents} active agent(s)")]
  TierInUse { agents: u64 },
  #[error("Ranking tier `{0}` already exists")]
  TierExists(String),

  #[error("Insufficient balance: {balance} available, {requested} requested")]
  InsufficientBalance { balance: i64, requested: i64 },

  #[error("No active commission configuration")]
  ConfigurationMissing,
  #[error("No ranking tiers configured")]
  NoRankingTiers,

  #[error("Internal error: {0}")]
  Internal(String),
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

impl From<DbErr> for Error {
  fn from(err: DbErr) -> Self {
    match err {
      DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => Error::Transient(err),
      err if is_busy(&err) => Error::Transient(err),
      err => Error::Db(err),
    }
  }
}

/// The database gave up waiting for a lock held by another writer.
fn is_busy(err: &DbErr) -> bool {
  let (DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(err)))
  | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(err)))
  | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(err)))) = err
  else {
    return false;
  };
  err.code().is_some_and(|code| is_busy_code(&code))
}

/// Extended result codes keep the primary code in the low byte.
fn is_busy_code(code: &str) -> bool {
  code
    .parse::<i32>()
    .is_ok_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::InvalidArgs(_)
      | Error::AmountOutOfRange { .. }
      | Error::BankDetailsMissing
      | Error::InvalidReferralCode(_)
      | Error::KindMismatch { .. }
      | Error::ActorSuspended
      | Error::WithdrawalNotAllowed => ErrorKind::Validation,

      Error::ActorNotFound
      | Error::ReferrerNotFound
      | Error::ReferralNotFound
      | Error::TierNotFound
      | Error::WithdrawalNotFound => ErrorKind::NotFound,

      Error::AlreadyProcessed { .. }
      | Error::TierInUse { .. }
      | Error::TierExists(_) => ErrorKind::Conflict,

      Error::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,

      Error::ConfigurationMissing | Error::NoRankingTiers => {
        ErrorKind::Configuration
      }

      Error::Transient(_) => ErrorKind::Transient,
      Error::Db(_) | Error::Internal(_) => ErrorKind::Storage,
    }
  }

  pub fn is_transient(&self) -> bool {
    self.kind() == ErrorKind::Transient
  }

  /// Message safe to show to the caller; storage details stay in the logs.
  pub fn user_message(&self) -> String {
    match self.kind() {
      ErrorKind::Storage => "Internal error, please try again later".into(),
      ErrorKind::Transient => "Service is busy, please retry".into(),
      _ => self.to_string(),
    }
  }
}
