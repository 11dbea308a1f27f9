//! Tiered commission rates.
//!
//! A revenue amount is first normalized by the multiplier of its payment
//! frequency, then priced with the rate of the tier containing it, falling
//! back to the base rate when no tier does.

use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};

use crate::{
  entity::{ConfigStatus, commission_config, commission_tier_rate},
  prelude::*,
  utils,
};

const MAX_BPS: i32 = 10_000;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
  #[default]
  Monthly,
  Quarterly,
  Biannual,
  Annual,
}

/// Unknown spellings are priced as monthly.
impl From<&str> for PaymentFrequency {
  fn from(raw: &str) -> Self {
    match raw.trim().to_ascii_lowercase().as_str() {
      "monthly" => Self::Monthly,
      "quarterly" => Self::Quarterly,
      "biannual" | "biannually" | "semiannual" => Self::Biannual,
      "annual" | "annually" | "yearly" => Self::Annual,
      other => {
        warn!("Unknown payment frequency `{other}`, using monthly");
        Self::Monthly
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multipliers {
  pub monthly: i32,
  pub quarterly: i32,
  pub biannual: i32,
  pub annual: i32,
}

impl Default for Multipliers {
  fn default() -> Self {
    Self { monthly: 1, quarterly: 3, biannual: 6, annual: 1 }
  }
}

impl Multipliers {
  pub fn get(&self, frequency: PaymentFrequency) -> i32 {
    match frequency {
      PaymentFrequency::Monthly => self.monthly,
      PaymentFrequency::Quarterly => self.quarterly,
      PaymentFrequency::Biannual => self.biannual,
      PaymentFrequency::Annual => self.annual,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRateInput {
  pub min_amount: i64,
  pub max_amount: Option<i64>,
  pub rate_bps: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConfig {
  pub base_rate_bps: i32,
  pub tiers: Vec<TierRateInput>,
  #[serde(default)]
  pub multipliers: Multipliers,
}

impl NewConfig {
  fn validate(&self) -> Result<()> {
    check_bps("Base rate", self.base_rate_bps)?;

    let m = self.multipliers;
    if [m.monthly, m.quarterly, m.biannual, m.annual].iter().any(|&x| x < 1) {
      return Err(Error::InvalidArgs("Multipliers must be at least 1".into()));
    }

    let mut tiers = self.tiers.clone();
    tiers.sort_by_key(|tier| tier.min_amount);

    for tier in &tiers {
      check_bps("Tier rate", tier.rate_bps)?;
      if tier.min_amount < 0 {
        return Err(Error::InvalidArgs("Tier minimum cannot be negative".into()));
      }
      if tier.max_amount.is_some_and(|max| max < tier.min_amount) {
        return Err(Error::InvalidArgs(format!(
          "Tier starting at {} ends before it starts",
          tier.min_amount
        )));
      }
    }

    for pair in tiers.windows(2) {
      let overlaps = pair[0].max_amount.is_none_or(|max| pair[1].min_amount <= max);
      if overlaps {
        return Err(Error::InvalidArgs(format!(
          "Tiers starting at {} and {} overlap",
          pair[0].min_amount, pair[1].min_amount
        )));
      }
    }

    Ok(())
  }

  fn defaults() -> Self {
    let tier = |min_amount, max_amount, rate_bps| TierRateInput {
      min_amount,
      max_amount,
      rate_bps,
    };

    Self {
      base_rate_bps: 1000,
      tiers: vec![
        tier(0, Some(100_000), 700),
        tier(100_001, Some(500_000), 1000),
        tier(500_001, Some(1_000_000), 1200),
        tier(1_000_001, None, 1500),
      ],
      multipliers: Multipliers::default(),
    }
  }
}

fn check_bps(what: &str, bps: i32) -> Result<()> {
  if !(0..=MAX_BPS).contains(&bps) {
    return Err(Error::InvalidArgs(format!(
      "{what} must be between 0 and {MAX_BPS} bps, got {bps}"
    )));
  }
  Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommissionQuote {
  pub base_amount: i64,
  pub frequency: PaymentFrequency,
  pub normalized: i64,
  pub rate_bps: i32,
  pub commission: i64,
}

/// Price `amount` against a rate table. Tiers need not be sorted.
pub fn quote(
  config: &commission_config::Model,
  tiers: &[commission_tier_rate::Model],
  amount: i64,
  frequency: PaymentFrequency,
) -> CommissionQuote {
  let multipliers = Multipliers {
    monthly: config.monthly_multiplier,
    quarterly: config.quarterly_multiplier,
    biannual: config.biannual_multiplier,
    annual: config.annual_multiplier,
  };
  let normalized = amount.saturating_mul(multipliers.get(frequency) as i64);

  let rate_bps = tiers
    .iter()
    .filter(|tier| tier.contains(normalized))
    .min_by_key(|tier| tier.min_amount)
    .map_or(config.base_rate_bps, |tier| tier.rate_bps);

  CommissionQuote {
    base_amount: amount,
    frequency,
    normalized,
    rate_bps,
    commission: utils::apply_bps(normalized, rate_bps),
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct RateTable {
  pub config: commission_config::Model,
  pub tiers: Vec<commission_tier_rate::Model>,
}

impl RateTable {
  pub fn quote(&self, amount: i64, frequency: PaymentFrequency) -> CommissionQuote {
    quote(&self.config, &self.tiers, amount, frequency)
  }
}

pub struct Commission<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Commission<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// The active rate table with the latest effective date.
  pub async fn active_config(&self) -> Result<RateTable> {
    let config = commission_config::Entity::find()
      .filter(commission_config::Column::Status.eq(ConfigStatus::Active))
      .order_by_desc(commission_config::Column::EffectiveDate)
      .order_by_desc(commission_config::Column::Id)
      .one(self.db)
      .await?
      .ok_or(Error::ConfigurationMissing)?;

    let tiers = commission_tier_rate::Entity::find()
      .filter(commission_tier_rate::Column::ConfigId.eq(config.id))
      .order_by_asc(commission_tier_rate::Column::MinAmount)
      .all(self.db)
      .await?;

    Ok(RateTable { config, tiers })
  }

  pub async fn quote(
    &self,
    base_amount: i64,
    frequency: PaymentFrequency,
  ) -> Result<CommissionQuote> {
    if base_amount <= 0 {
      return Err(Error::InvalidArgs("Base amount must be positive".into()));
    }

    Ok(self.active_config().await?.quote(base_amount, frequency))
  }

  pub async fn calculate_commission(
    &self,
    base_amount: i64,
    frequency: PaymentFrequency,
  ) -> Result<i64> {
    let quote = self.quote(base_amount, frequency).await?;
    trace!("{quote:?}");
    Ok(quote.commission)
  }

  /// Install `new` as the only active configuration.
  pub async fn create_config(&self, new: NewConfig) -> Result<RateTable> {
    new.validate()?;

    let txn = self.db.begin().await?;

    commission_config::Entity::update_many()
      .col_expr(
        commission_config::Column::Status,
        Expr::value(ConfigStatus::Inactive),
      )
      .filter(commission_config::Column::Status.eq(ConfigStatus::Active))
      .exec(&txn)
      .await?;

    let config = commission_config::ActiveModel {
      id: NotSet,
      base_rate_bps: Set(new.base_rate_bps),
      monthly_multiplier: Set(new.multipliers.monthly),
      quarterly_multiplier: Set(new.multipliers.quarterly),
      biannual_multiplier: Set(new.multipliers.biannual),
      annual_multiplier: Set(new.multipliers.annual),
      status: Set(ConfigStatus::Active),
      effective_date: Set(utils::now()),
    }
    .insert(&txn)
    .await?;

    let mut tiers = Vec::with_capacity(new.tiers.len());
    for tier in &new.tiers {
      let tier = commission_tier_rate::ActiveModel {
        id: NotSet,
        config_id: Set(config.id),
        min_amount: Set(tier.min_amount),
        max_amount: Set(tier.max_amount),
        rate_bps: Set(tier.rate_bps),
      }
      .insert(&txn)
      .await?;
      tiers.push(tier);
    }
    tiers.sort_by_key(|tier| tier.min_amount);

    txn.commit().await?;

    info!(
      "Commission config #{} active: base {}, {} tier(s)",
      config.id,
      utils::format_bps(config.base_rate_bps),
      tiers.len()
    );

    Ok(RateTable { config, tiers })
  }

  /// Returns whether anything was installed.
  pub async fn seed_default(&self) -> Result<bool> {
    if commission_config::Entity::find().count(self.db).await? > 0 {
      return Ok(false);
    }

    self.create_config(NewConfig::defaults()).await?;
    Ok(true)
  }
}
