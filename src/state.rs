use std::env;

use anyhow::Context;
use sea_orm::{ConnectOptions, Database};

use crate::{
  prelude::*,
  sv::{
    self,
    notify::{LogNotifier, Notifier, WebhookNotifier},
    withdrawal::WithdrawalLimits,
  },
};

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub db_timeout_secs: u64,
  pub notify_webhook_url: Option<String>,
  pub withdrawal_limits: WithdrawalLimits,
  pub seed_defaults: bool,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let defaults = WithdrawalLimits::default();

    let config = Self {
      database_url: env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:ledger.db?mode=rwc".into()),
      port: parse_var("PORT", 3000)?,
      db_timeout_secs: parse_var("DB_TIMEOUT_SECS", 5)?,
      notify_webhook_url: env::var("NOTIFY_WEBHOOK_URL")
        .ok()
        .filter(|url| !url.trim().is_empty()),
      withdrawal_limits: WithdrawalLimits {
        minimum: parse_var("MIN_WITHDRAWAL", defaults.minimum)?,
        maximum: parse_var("MAX_WITHDRAWAL", defaults.maximum)?,
      },
      seed_defaults: parse_var("SEED_DEFAULTS", true)?,
    };

    if config.withdrawal_limits.minimum <= 0
      || config.withdrawal_limits.minimum > config.withdrawal_limits.maximum
    {
      anyhow::bail!(
        "Invalid withdrawal limits: {}..={}",
        config.withdrawal_limits.minimum,
        config.withdrawal_limits.maximum
      );
    }

    Ok(config)
  }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
  T: std::str::FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match env::var(name) {
    Ok(raw) if !raw.trim().is_empty() => {
      raw.trim().parse().with_context(|| format!("Invalid {name}: `{raw}`"))
    }
    _ => Ok(default),
  }
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub notifier: Arc<dyn Notifier>,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let timeout = Duration::from_secs(config.db_timeout_secs);

    let mut options = ConnectOptions::new(config.database_url.clone());
    options
      .connect_timeout(timeout)
      .acquire_timeout(timeout)
      .sqlx_logging(false);

    let db = Database::connect(options)
      .await
      .with_context(|| format!("Failed to connect to {}", config.database_url))?;

    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
      Some(url) => {
        info!("Notifications go to webhook {url}");
        Arc::new(WebhookNotifier::new(url.clone(), timeout)?)
      }
      None => {
        warn!("NOTIFY_WEBHOOK_URL not set, notifications are only logged");
        Arc::new(LogNotifier)
      }
    };

    Ok(Self { db, config, notifier })
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      actor: sv::Actor::new(&self.db),
      ledger: sv::Ledger::new(&self.db),
      referral: sv::Referral::new(&self.db)
        .with_notifier(self.notifier.as_ref()),
      commission: sv::Commission::new(&self.db),
      ranking: sv::Ranking::new(&self.db),
      withdrawal: sv::Withdrawal::new(&self.db, self.notifier.as_ref())
        .with_limits(self.config.withdrawal_limits),
    }
  }

  /// Installs the default commission table and ranking tiers when empty.
  pub async fn seed_defaults(&self) -> Result<()> {
    let sv = self.sv();

    if sv.commission.seed_default().await? {
      info!("Seeded default commission configuration");
    }
    if sv.ranking.seed_default().await? {
      info!("Seeded default ranking tiers");
    }

    Ok(())
  }

  pub async fn ping(&self) -> Result<()> {
    Ok(self.db.ping().await?)
  }
}

pub struct Services<'a> {
  pub actor: sv::Actor<'a>,
  pub ledger: sv::Ledger<'a>,
  pub referral: sv::Referral<'a>,
  pub commission: sv::Commission<'a>,
  pub ranking: sv::Ranking<'a>,
  pub withdrawal: sv::Withdrawal<'a>,
}
