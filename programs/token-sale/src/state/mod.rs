pub mod allocation;
pub mod claim_gate;
pub mod referral;
pub mod sale;
pub mod stage;
pub mod staking;
pub mod vesting;

pub use allocation::*;
pub use claim_gate::*;
pub use referral::*;
pub use sale::*;
pub use stage::*;
pub use staking::*;
pub use vesting::*;
