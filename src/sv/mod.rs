pub mod actor;
pub mod commission;
pub mod ledger;
pub mod notify;
pub mod ranking;
pub mod referral;
#[cfg(test)]
pub mod test_utils;
pub mod withdrawal;

pub use actor::Actor;
pub use commission::Commission;
pub use ledger::Ledger;
pub use ranking::Ranking;
pub use referral::Referral;
pub use withdrawal::Withdrawal;
