use anchor_lang::prelude::*;

use crate::state::PaymentCurrency;

#[event]
pub struct SaleInitialized {
    pub admin: Pubkey,
    pub token_mint: Pubkey,
    pub stable_mint: Pubkey,
    pub treasury: Pubkey,
    pub stage_count: u8,
    pub sale_start: i64,
    pub first_price_usd: u128,
}

#[event]
pub struct TokensPurchased {
    pub buyer: Pubkey,
    pub tokens: u128,
    /// Payment in base units of `currency`.
    pub cost: u128,
    pub usd_value: u128,
    pub currency: PaymentCurrency,
    pub stage: u8,
}

#[event]
pub struct ReferralAccrued {
    pub referrer: Pubkey,
    pub buyer: Pubkey,
    pub bonus: u128,
    pub earnings: u128,
}

#[event]
pub struct ReferralClaimed {
    pub referrer: Pubkey,
    pub amount: u128,
}

#[event]
pub struct StageAdvanced {
    pub index: u8,
    pub price_usd: u128,
    pub start_time: i64,
}

#[event]
pub struct ClaimingEnabled {
    pub admin: Pubkey,
}

#[event]
pub struct LaunchTimeSet {
    pub launch_time: i64,
    pub unlock_time: i64,
}

#[event]
pub struct TokensClaimed {
    pub buyer: Pubkey,
    pub amount: u128,
    pub total_claimed: u128,
    pub total_purchased: u128,
}

#[event]
pub struct SaleStatusChanged {
    pub is_active: bool,
}

#[event]
pub struct PurchaseBoundsUpdated {
    pub min_buy_usd: u128,
    pub max_buy_usd: u128,
}

#[event]
pub struct SaleVaultFunded {
    pub admin: Pubkey,
    pub amount: u64,
}

#[event]
pub struct VestingGrantCreated {
    pub beneficiary: Pubkey,
    pub start: i64,
    pub cliff: i64,
    pub duration: i64,
    pub total_amount: u128,
}

#[event]
pub struct Released {
    pub beneficiary: Pubkey,
    pub amount: u128,
    pub total_released: u128,
}

#[event]
pub struct StakePoolInitialized {
    pub authority: Pubkey,
    pub stake_mint: Pubkey,
    pub reward_mint: Pubkey,
}

#[event]
pub struct Staked {
    pub owner: Pubkey,
    pub amount: u128,
    pub principal: u128,
    pub total_principal: u128,
}

#[event]
pub struct Unstaked {
    pub owner: Pubkey,
    pub amount: u128,
    pub principal: u128,
    pub total_principal: u128,
}

#[event]
pub struct RewardClaimed {
    pub owner: Pubkey,
    pub amount: u128,
}

#[event]
pub struct RevenueDeposited {
    pub amount: u128,
    pub total_principal: u128,
    pub acc_reward_per_share: u128,
    pub unattributed_revenue: u128,
}
