use serde::{Deserialize, Serialize};

use crate::{
  entity::{ActorKind, ActorRef, ActorStatus, actor, ranking_tier},
  prelude::*,
  sv::actor::resolve,
  utils,
};

const DEFAULT_COLOR: &str = "bg-gray-500";

/// Tiers from the highest threshold down. Ties keep display order.
pub fn sorted_desc(tiers: &[ranking_tier::Model]) -> Vec<&ranking_tier::Model> {
  let mut sorted: Vec<_> = tiers.iter().collect();
  sorted.sort_by(|a, b| {
    b.minimum_earnings
      .cmp(&a.minimum_earnings)
      .then(a.rank_order.cmp(&b.rank_order))
  });
  sorted
}

fn position(total_earned: i64, sorted: &[&ranking_tier::Model]) -> Option<usize> {
  if sorted.is_empty() {
    return None;
  }
  Some(
    sorted
      .iter()
      .position(|tier| total_earned >= tier.minimum_earnings)
      .unwrap_or(sorted.len() - 1),
  )
}

/// Highest tier whose threshold is met; the lowest tier when none is.
pub fn resolve_tier(
  total_earned: i64,
  tiers: &[ranking_tier::Model],
) -> Option<&ranking_tier::Model> {
  let sorted = sorted_desc(tiers);
  position(total_earned, &sorted).map(|at| sorted[at])
}

/// The tier right above the one `total_earned` resolves to.
pub fn next_tier(
  total_earned: i64,
  tiers: &[ranking_tier::Model],
) -> Option<&ranking_tier::Model> {
  let sorted = sorted_desc(tiers);
  match position(total_earned, &sorted)? {
    0 => None,
    at => Some(sorted[at - 1]),
  }
}

/// Percent of the way from the current tier threshold to the next one,
/// in `0.0..=100.0`.
pub fn progress_to_next_tier(
  total_earned: i64,
  tiers: &[ranking_tier::Model],
) -> f64 {
  let (Some(current), Some(next)) =
    (resolve_tier(total_earned, tiers), next_tier(total_earned, tiers))
  else {
    return 100.0;
  };

  let span = next.minimum_earnings - current.minimum_earnings;
  if span <= 0 {
    return 100.0;
  }

  let progress =
    (total_earned - current.minimum_earnings) as f64 / span as f64 * 100.0;
  progress.clamp(0.0, 100.0)
}

pub fn total_bonus(total_earned: i64, tier: &ranking_tier::Model) -> i64 {
  utils::apply_bps(total_earned, tier.bonus_bps)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTier {
  pub name: String,
  pub minimum_earnings: i64,
  pub bonus_bps: i32,
  pub color: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TierUpdate {
  pub name: Option<String>,
  pub minimum_earnings: Option<i64>,
  pub bonus_bps: Option<i32>,
  pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Standing {
  pub agent: ActorRef,
  pub total_earned: i64,
  pub tier: ranking_tier::Model,
  pub next_tier: Option<ranking_tier::Model>,
  pub progress: f64,
  pub bonus: i64,
}

impl Standing {
  fn new(agent: &actor::Model, tiers: &[ranking_tier::Model]) -> Option<Self> {
    let tier = resolve_tier(agent.total_earned, tiers)?;
    Some(Self {
      agent: agent.actor_ref(),
      total_earned: agent.total_earned,
      tier: tier.clone(),
      next_tier: next_tier(agent.total_earned, tiers).cloned(),
      progress: progress_to_next_tier(agent.total_earned, tiers),
      bonus: total_bonus(agent.total_earned, tier),
    })
  }

  pub fn remaining_to_next(&self) -> Option<i64> {
    let next = self.next_tier.as_ref()?;
    Some((next.minimum_earnings - self.total_earned).max(0))
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
  pub position: usize,
  pub name: String,
  pub email: String,
  pub standing: Standing,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierStats {
  pub tier: String,
  pub agents: u64,
  pub total_bonus: i64,
}

pub struct Ranking<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Ranking<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// All tiers in display order.
  pub async fn tiers(&self) -> Result<Vec<ranking_tier::Model>> {
    Ok(
      ranking_tier::Entity::find()
        .order_by_asc(ranking_tier::Column::RankOrder)
        .all(self.db)
        .await?,
    )
  }

  async fn tier(&self, id: i64) -> Result<ranking_tier::Model> {
    ranking_tier::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::TierNotFound)
  }

  async fn ensure_unique_name(&self, name: &str, except: Option<i64>) -> Result<()> {
    let mut query =
      ranking_tier::Entity::find().filter(ranking_tier::Column::Name.eq(name));
    if let Some(id) = except {
      query = query.filter(ranking_tier::Column::Id.ne(id));
    }

    if query.one(self.db).await?.is_some() {
      return Err(Error::TierExists(name.to_string()));
    }
    Ok(())
  }

  /// Append a tier after the last display position.
  pub async fn create(&self, new: NewTier) -> Result<ranking_tier::Model> {
    let name = new.name.trim().to_string();
    validate(&name, new.minimum_earnings, new.bonus_bps)?;
    self.ensure_unique_name(&name, None).await?;

    let last = ranking_tier::Entity::find()
      .order_by_desc(ranking_tier::Column::RankOrder)
      .one(self.db)
      .await?;

    let tier = ranking_tier::ActiveModel {
      id: NotSet,
      name: Set(name),
      minimum_earnings: Set(new.minimum_earnings),
      bonus_bps: Set(new.bonus_bps),
      color: Set(new.color.unwrap_or_else(|| DEFAULT_COLOR.into())),
      rank_order: Set(last.map_or(0, |tier| tier.rank_order) + 1),
      created_at: Set(utils::now()),
    }
    .insert(self.db)
    .await?;

    info!(
      "Created ranking tier `{}` from {} at {}",
      tier.name,
      tier.minimum_earnings,
      utils::format_bps(tier.bonus_bps)
    );
    Ok(tier)
  }

  pub async fn update(
    &self,
    id: i64,
    update: TierUpdate,
  ) -> Result<ranking_tier::Model> {
    let tier = self.tier(id).await?;

    let name = update.name.map(|name| name.trim().to_string());
    validate(
      name.as_deref().unwrap_or(&tier.name),
      update.minimum_earnings.unwrap_or(tier.minimum_earnings),
      update.bonus_bps.unwrap_or(tier.bonus_bps),
    )?;
    if let Some(name) = &name {
      self.ensure_unique_name(name, Some(id)).await?;
    }

    let mut model: ranking_tier::ActiveModel = tier.into();
    if let Some(name) = name {
      model.name = Set(name);
    }
    if let Some(minimum) = update.minimum_earnings {
      model.minimum_earnings = Set(minimum);
    }
    if let Some(bonus) = update.bonus_bps {
      model.bonus_bps = Set(bonus);
    }
    if let Some(color) = update.color {
      model.color = Set(color);
    }

    Ok(model.update(self.db).await?)
  }

  /// Delete a tier no active agent has reached, then renumber the rest.
  pub async fn delete(&self, id: i64) -> Result<()> {
    let txn = self.db.begin().await?;

    let tier = ranking_tier::Entity::find_by_id(id)
      .one(&txn)
      .await?
      .ok_or(Error::TierNotFound)?;

    let agents = actor::Entity::find()
      .filter(actor::Column::Kind.eq(ActorKind::Agent))
      .filter(actor::Column::Status.eq(ActorStatus::Active))
      .filter(actor::Column::TotalEarned.gte(tier.minimum_earnings))
      .count(&txn)
      .await?;
    if agents > 0 {
      return Err(Error::TierInUse { agents });
    }

    ranking_tier::Entity::delete_by_id(id).exec(&txn).await?;

    let remaining = ranking_tier::Entity::find()
      .order_by_desc(ranking_tier::Column::MinimumEarnings)
      .order_by_asc(ranking_tier::Column::RankOrder)
      .all(&txn)
      .await?;
    let ids: Vec<_> = remaining.iter().map(|tier| tier.id).collect();
    assign_order(&txn, remaining, &ids).await?;

    txn.commit().await?;

    info!("Deleted ranking tier `{}`", tier.name);
    Ok(())
  }

  /// Set display order from an explicit permutation of all tier ids.
  pub async fn reorder(&self, ids: &[i64]) -> Result<Vec<ranking_tier::Model>> {
    let txn = self.db.begin().await?;

    let tiers = ranking_tier::Entity::find().all(&txn).await?;

    let known: HashSet<i64> = tiers.iter().map(|tier| tier.id).collect();
    let given: HashSet<i64> = ids.iter().copied().collect();
    if given.len() != ids.len() || given != known {
      return Err(Error::InvalidArgs(
        "Reorder must list every tier exactly once".into(),
      ));
    }

    assign_order(&txn, tiers, ids).await?;
    txn.commit().await?;

    self.tiers().await
  }

  async fn all_or_missing(&self) -> Result<Vec<ranking_tier::Model>> {
    let tiers = self.tiers().await?;
    if tiers.is_empty() {
      return Err(Error::NoRankingTiers);
    }
    Ok(tiers)
  }

  pub async fn standing(&self, agent: ActorRef) -> Result<Standing> {
    let model = resolve(self.db, agent).await?;
    if model.kind != ActorKind::Agent {
      return Err(Error::KindMismatch {
        expected: ActorKind::Agent,
        found: model.kind,
      });
    }

    let tiers = self.all_or_missing().await?;
    Standing::new(&model, &tiers).ok_or(Error::NoRankingTiers)
  }

  /// Active agents ranked by total earned.
  pub async fn leaderboard(&self, limit: u64) -> Result<Vec<LeaderboardRow>> {
    let tiers = self.all_or_missing().await?;

    let agents = active_agents()
      .order_by_desc(actor::Column::TotalEarned)
      .order_by_asc(actor::Column::Id)
      .limit(limit)
      .all(self.db)
      .await?;

    Ok(
      agents
        .into_iter()
        .enumerate()
        .filter_map(|(at, agent)| {
          Some(LeaderboardRow {
            position: at + 1,
            standing: Standing::new(&agent, &tiers)?,
            name: agent.name,
            email: agent.email,
          })
        })
        .collect(),
    )
  }

  /// Active agents and bonus per tier, highest tier first.
  pub async fn statistics(&self) -> Result<Vec<TierStats>> {
    let tiers = self.all_or_missing().await?;

    let earnings: Vec<i64> = active_agents()
      .select_only()
      .column(actor::Column::TotalEarned)
      .into_tuple()
      .all(self.db)
      .await?;

    let mut stats: HashMap<i64, TierStats> = tiers
      .iter()
      .map(|tier| {
        (tier.id, TierStats { tier: tier.name.clone(), agents: 0, total_bonus: 0 })
      })
      .collect();

    for earned in earnings {
      if let Some(tier) = resolve_tier(earned, &tiers)
        && let Some(entry) = stats.get_mut(&tier.id)
      {
        entry.agents += 1;
        entry.total_bonus += total_bonus(earned, tier);
      }
    }

    Ok(
      sorted_desc(&tiers)
        .into_iter()
        .filter_map(|tier| stats.remove(&tier.id))
        .collect(),
    )
  }

  /// Returns whether anything was installed.
  pub async fn seed_default(&self) -> Result<bool> {
    if ranking_tier::Entity::find().count(self.db).await? > 0 {
      return Ok(false);
    }

    let defaults = [
      ("Diamond", 10_000_000, 1500, "bg-cyan-500"),
      ("Platinum", 5_000_000, 1000, "bg-slate-400"),
      ("Gold", 2_000_000, 750, "bg-yellow-500"),
      ("Silver", 1_000_000, 500, "bg-gray-400"),
      ("Bronze", 500_000, 250, "bg-amber-700"),
    ];

    let txn = self.db.begin().await?;
    let now = utils::now();

    for (order, (name, minimum, bonus, color)) in defaults.into_iter().enumerate() {
      ranking_tier::ActiveModel {
        id: NotSet,
        name: Set(name.into()),
        minimum_earnings: Set(minimum),
        bonus_bps: Set(bonus),
        color: Set(color.into()),
        rank_order: Set(order as i32 + 1),
        created_at: Set(now),
      }
      .insert(&txn)
      .await?;
    }

    txn.commit().await?;
    Ok(true)
  }
}

fn validate(name: &str, minimum_earnings: i64, bonus_bps: i32) -> Result<()> {
  if name.is_empty() {
    return Err(Error::InvalidArgs("Tier name is required".into()));
  }
  if minimum_earnings < 0 {
    return Err(Error::InvalidArgs("Minimum earnings cannot be negative".into()));
  }
  if !(0..=10_000).contains(&bonus_bps) {
    return Err(Error::InvalidArgs("Bonus must be between 0% and 100%".into()));
  }
  Ok(())
}

fn active_agents() -> sea_orm::Select<actor::Entity> {
  actor::Entity::find()
    .filter(actor::Column::Kind.eq(ActorKind::Agent))
    .filter(actor::Column::Status.eq(ActorStatus::Active))
}

/// Give `ids[i]` display position `i + 1`.
async fn assign_order<C: ConnectionTrait>(
  conn: &C,
  tiers: Vec<ranking_tier::Model>,
  ids: &[i64],
) -> Result<()> {
  let order: HashMap<i64, i32> =
    ids.iter().enumerate().map(|(at, &id)| (id, at as i32 + 1)).collect();

  for tier in tiers {
    let Some(&rank_order) = order.get(&tier.id) else { continue };
    if tier.rank_order == rank_order {
      continue;
    }

    ranking_tier::ActiveModel { rank_order: Set(rank_order), ..tier.into() }
      .update(conn)
      .await?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::{self, test_db};

  fn tier(id: i64, name: &str, minimum: i64, bonus_bps: i32) -> ranking_tier::Model {
    ranking_tier::Model {
      id,
      name: name.into(),
      minimum_earnings: minimum,
      bonus_bps,
      color: DEFAULT_COLOR.into(),
      rank_order: id as i32,
      created_at: utils::now(),
    }
  }

  fn bronze_silver() -> Vec<ranking_tier::Model> {
    vec![tier(1, "Bronze", 500_000, 250), tier(2, "Silver", 1_000_000, 500)]
  }

  #[test]
  fn test_resolve_and_progress() {
    let tiers = bronze_silver();

    assert_eq!(resolve_tier(750_000, &tiers).unwrap().name, "Bronze");
    assert_eq!(next_tier(750_000, &tiers).unwrap().name, "Silver");
    assert_eq!(progress_to_next_tier(750_000, &tiers), 50.0);
    assert_eq!(total_bonus(750_000, resolve_tier(750_000, &tiers).unwrap()), 18_750);

    assert_eq!(resolve_tier(2_000_000, &tiers).unwrap().name, "Silver");
    assert!(next_tier(2_000_000, &tiers).is_none());
    assert_eq!(progress_to_next_tier(2_000_000, &tiers), 100.0);
  }

  #[test]
  fn test_below_lowest_threshold() {
    let tiers = bronze_silver();

    assert_eq!(resolve_tier(0, &tiers).unwrap().name, "Bronze");
    assert_eq!(progress_to_next_tier(0, &tiers), 0.0);
    assert!(resolve_tier(0, &[]).is_none());
    assert_eq!(progress_to_next_tier(0, &[]), 100.0);
  }

  #[test]
  fn test_equal_thresholds() {
    let tiers = vec![tier(1, "A", 1_000, 100), tier(2, "B", 1_000, 200)];
    assert_eq!(progress_to_next_tier(500, &tiers), 100.0);
  }

  #[test]
  fn test_resolution_is_monotonic() {
    let tiers = vec![
      tier(1, "Diamond", 10_000_000, 1500),
      tier(2, "Platinum", 5_000_000, 1000),
      tier(3, "Gold", 2_000_000, 750),
      tier(4, "Silver", 1_000_000, 500),
      tier(5, "Bronze", 500_000, 250),
    ];

    let mut last = i64::MIN;
    for earned in (0..=12_000_000).step_by(250_000) {
      let minimum = resolve_tier(earned, &tiers).unwrap().minimum_earnings;
      assert!(minimum >= last, "tier dropped at {earned}");
      last = minimum;

      let progress = progress_to_next_tier(earned, &tiers);
      assert!((0.0..=100.0).contains(&progress));
    }
  }

  async fn seeded() -> DatabaseConnection {
    let db = test_db::setup().await;
    assert!(Ranking::new(&db).seed_default().await.unwrap());
    db
  }

  #[tokio::test]
  async fn test_standing() {
    let db = seeded().await;
    let agent = test_utils::actor(&db, ActorKind::Agent, 0, 750_000).await;
    let tenant = test_utils::actor(&db, ActorKind::Tenant, 0, 0).await;
    let sv = Ranking::new(&db);

    let standing = sv.standing(agent.actor_ref()).await.unwrap();
    assert_eq!(standing.tier.name, "Bronze");
    assert_eq!(standing.next_tier.as_ref().unwrap().name, "Silver");
    assert_eq!(standing.progress, 50.0);
    assert_eq!(standing.bonus, 18_750);
    assert_eq!(standing.remaining_to_next(), Some(250_000));

    assert!(matches!(
      sv.standing(tenant.actor_ref()).await,
      Err(Error::KindMismatch { expected: ActorKind::Agent, .. })
    ));
  }

  #[tokio::test]
  async fn test_no_tiers() {
    let db = test_db::setup().await;
    let agent = test_utils::agent(&db, 0).await;

    assert!(matches!(
      Ranking::new(&db).standing(agent.actor_ref()).await,
      Err(Error::NoRankingTiers)
    ));
  }

  #[tokio::test]
  async fn test_create_appends_and_rejects_duplicates() {
    let db = seeded().await;
    let sv = Ranking::new(&db);

    let elite = sv
      .create(NewTier {
        name: "Elite".into(),
        minimum_earnings: 50_000_000,
        bonus_bps: 2000,
        color: None,
      })
      .await
      .unwrap();
    assert_eq!(elite.rank_order, 6);
    assert_eq!(elite.color, DEFAULT_COLOR);

    let duplicate = sv
      .create(NewTier {
        name: "Gold".into(),
        minimum_earnings: 1,
        bonus_bps: 1,
        color: None,
      })
      .await;
    assert!(matches!(duplicate, Err(Error::TierExists(_))));
  }

  #[tokio::test]
  async fn test_update() {
    let db = seeded().await;
    let sv = Ranking::new(&db);
    let gold = sv.tiers().await.unwrap().into_iter().find(|t| t.name == "Gold").unwrap();

    let updated = sv
      .update(
        gold.id,
        TierUpdate { bonus_bps: Some(800), ..Default::default() },
      )
      .await
      .unwrap();
    assert_eq!(updated.bonus_bps, 800);
    assert_eq!(updated.name, "Gold");

    let clash = sv
      .update(gold.id, TierUpdate { name: Some("Silver".into()), ..Default::default() })
      .await;
    assert!(matches!(clash, Err(Error::TierExists(_))));

    assert!(matches!(
      sv.update(999, TierUpdate::default()).await,
      Err(Error::TierNotFound)
    ));
  }

  #[tokio::test]
  async fn test_delete_in_use_and_renumber() {
    let db = seeded().await;
    let sv = Ranking::new(&db);
    test_utils::actor(&db, ActorKind::Agent, 0, 2_500_000).await;

    let by_name = |tiers: &[ranking_tier::Model], name: &str| {
      tiers.iter().find(|t| t.name == name).unwrap().id
    };
    let tiers = sv.tiers().await.unwrap();

    let gold = by_name(&tiers, "Gold");
    assert!(matches!(sv.delete(gold).await, Err(Error::TierInUse { agents: 1 })));

    let platinum = by_name(&tiers, "Platinum");
    sv.delete(platinum).await.unwrap();

    let remaining = sv.tiers().await.unwrap();
    let names: Vec<_> = remaining.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Diamond", "Gold", "Silver", "Bronze"]);
    let orders: Vec<_> = remaining.iter().map(|t| t.rank_order).collect();
    assert_eq!(orders, [1, 2, 3, 4]);
  }

  #[tokio::test]
  async fn test_reorder() {
    let db = seeded().await;
    let sv = Ranking::new(&db);

    let mut ids: Vec<_> = sv.tiers().await.unwrap().iter().map(|t| t.id).collect();
    ids.reverse();

    let tiers = sv.reorder(&ids).await.unwrap();
    assert_eq!(tiers[0].name, "Bronze");
    assert_eq!(tiers[4].name, "Diamond");

    assert!(matches!(sv.reorder(&ids[1..]).await, Err(Error::InvalidArgs(_))));
    let doubled = [ids[0], ids[0], ids[1], ids[2], ids[3]];
    assert!(matches!(sv.reorder(&doubled).await, Err(Error::InvalidArgs(_))));
  }

  #[tokio::test]
  async fn test_leaderboard_and_statistics() {
    let db = seeded().await;
    let top = test_utils::actor(&db, ActorKind::Agent, 0, 6_000_000).await;
    test_utils::actor(&db, ActorKind::Agent, 0, 1_200_000).await;
    test_utils::actor(&db, ActorKind::Agent, 0, 1_000_000).await;
    test_utils::actor(&db, ActorKind::Landlord, 0, 99_000_000).await;
    let sv = Ranking::new(&db);

    let board = sv.leaderboard(2).await.unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].position, 1);
    assert_eq!(board[0].standing.agent, top.actor_ref());
    assert_eq!(board[0].standing.tier.name, "Platinum");
    assert_eq!(board[1].standing.tier.name, "Silver");

    let stats = sv.statistics().await.unwrap();
    let names: Vec<_> = stats.iter().map(|s| s.tier.as_str()).collect();
    assert_eq!(names, ["Diamond", "Platinum", "Gold", "Silver", "Bronze"]);
    assert_eq!(stats[1].agents, 1);
    assert_eq!(stats[1].total_bonus, 600_000);
    assert_eq!(stats[3].agents, 2);
    assert_eq!(stats[3].total_bonus, 60_000 + 50_000);
    assert_eq!(stats[0].agents, 0);
  }
}
