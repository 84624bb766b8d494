pub mod admin;
pub mod buy;
pub mod claim_tokens;
pub mod initialize;
pub mod referral;
pub mod staking;
pub mod vesting;

pub use admin::*;
pub use buy::*;
pub use claim_tokens::*;
pub use initialize::*;
pub use referral::*;
pub use staking::*;
pub use vesting::*;
