use uuid::Uuid;

use crate::prelude::*;

pub fn now() -> DateTime {
  Utc::now().naive_utc()
}

/// `prefix` followed by `len` uppercase characters of a fresh v4 UUID.
pub fn random_code(prefix: &str, len: usize) -> String {
  let suffix: String = Uuid::new_v4()
    .simple()
    .to_string()
    .chars()
    .take(len)
    .collect::<String>()
    .to_uppercase();
  format!("{prefix}{suffix}")
}

/// `amount * bps / 10_000`, floored, without intermediate overflow.
pub fn apply_bps(amount: i64, bps: i32) -> i64 {
  (amount as i128 * bps as i128 / 10_000) as i64
}

pub fn format_bps(bps: i32) -> String {
  if bps % 100 == 0 {
    format!("{}%", bps / 100)
  } else {
    format!("{:.2}%", bps as f64 / 100.0)
  }
}
