//! Shared test utilities for database setup

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
  entity::*,
  prelude::*,
  sv::notify::{Notification, Notifier},
};

pub mod test_db {
  use std::path::PathBuf;

  use sea_orm::{Database, DatabaseConnection};

  use crate::prelude::{Migrator, MigratorTrait};

  /// Creates an in-memory SQLite database with the full schema
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
  }

  /// On-disk database, removed on drop. Clone `db` into spawned tasks.
  pub struct FileDb {
    pub db: DatabaseConnection,
    path: PathBuf,
  }

  impl Drop for FileDb {
    fn drop(&mut self) {
      for suffix in ["", "-wal", "-shm", "-journal"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
      }
    }
  }

  pub async fn file() -> FileDb {
    let path = std::env::temp_dir()
      .join(format!("estate-ledger-{}.db", uuid::Uuid::new_v4()));
    let db = Database::connect(format!("sqlite:{}?mode=rwc", path.display()))
      .await
      .unwrap();
    Migrator::up(&db, None).await.unwrap();
    FileDb { db, path }
  }
}

/// Inserts an active actor with the given ledger state.
pub async fn actor(
  db: &DatabaseConnection,
  kind: ActorKind,
  balance: i64,
  total_earned: i64,
) -> actor::Model {
  let now = Utc::now().naive_utc();
  let code = crate::utils::random_code(kind.code_prefix(), 8);

  actor::ActiveModel {
    id: NotSet,
    kind: Set(kind),
    name: Set(format!("{kind} {code}")),
    email: Set(format!("{}@example.com", code.to_lowercase())),
    status: Set(ActorStatus::Active),
    referral_code: Set(code),
    referred_by: Set(None),
    referrer_kind: Set(None),
    balance: Set(balance),
    total_earned: Set(total_earned),
    last_withdrawal: Set(None),
    created_at: Set(now),
  }
  .insert(db)
  .await
  .unwrap()
}

pub async fn agent(db: &DatabaseConnection, balance: i64) -> actor::Model {
  actor(db, ActorKind::Agent, balance, balance).await
}

pub async fn verified_bank(db: &DatabaseConnection, actor_id: i64) {
  bank_details::ActiveModel {
    actor_id: Set(actor_id),
    bank_name: Set("First Bank".into()),
    account_number: Set("0123456789".into()),
    account_name: Set("Test Account".into()),
    account_type: Set(Some(AccountType::Savings)),
    verified_at: Set(Some(Utc::now().naive_utc())),
  }
  .insert(db)
  .await
  .unwrap();
}

pub async fn reload(db: &DatabaseConnection, id: i64) -> actor::Model {
  actor::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
}

#[derive(Default)]
pub struct RecordingNotifier {
  sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
  pub fn sent(&self) -> Vec<Notification> {
    self.sent.lock().unwrap().clone()
  }
}

#[async_trait]
impl Notifier for RecordingNotifier {
  async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
    self.sent.lock().unwrap().push(notification.clone());
    Ok(())
  }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
  async fn send(&self, _: &Notification) -> anyhow::Result<()> {
    anyhow::bail!("smtp relay unreachable")
  }
}
