pub mod actor;
pub mod bank_details;
pub mod commission_config;
pub mod commission_tier_rate;
pub mod ledger_entry;
pub mod ranking_tier;
pub mod referral_entry;
pub mod referral_transaction;
pub mod withdrawal;
pub mod withdrawal_settings;

pub use actor::{ActorKind, ActorRef, ActorStatus};
pub use bank_details::AccountType;
pub use commission_config::ConfigStatus;
pub use ledger_entry::LedgerEntryType;
pub use referral_entry::ReferralStatus;
pub use withdrawal::{WithdrawalStatus, WithdrawalType};
