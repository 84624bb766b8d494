use anchor_lang::prelude::*;

#[constant]
pub const SEED_SALE: &[u8] = b"sale";
#[constant]
pub const SEED_SALE_VAULT: &[u8] = b"sale_vault";
#[constant]
pub const SEED_ALLOCATION: &[u8] = b"allocation";
#[constant]
pub const SEED_REFERRAL: &[u8] = b"referral";
#[constant]
pub const SEED_VESTING: &[u8] = b"vesting";
#[constant]
pub const SEED_VESTING_VAULT: &[u8] = b"vesting_vault";
#[constant]
pub const SEED_STAKE_POOL: &[u8] = b"stake_pool";
#[constant]
pub const SEED_STAKE_VAULT: &[u8] = b"stake_vault";
#[constant]
pub const SEED_REWARD_VAULT: &[u8] = b"reward_vault";
#[constant]
pub const SEED_STAKE_POSITION: &[u8] = b"stake";

/// USD values and stage prices are 18-decimal fixed point.
pub const USD_DECIMALS: u32 = 18;
pub const USD_PRECISION: u128 = 1_000_000_000_000_000_000;

pub const BPS_DENOMINATOR: u128 = 10_000;

/// Scale of `StakePool::acc_reward_per_share`.
pub const ACC_PRECISION: u128 = 1_000_000_000_000_000_000;

pub const MAX_STAGES: usize = 10;
pub const SECONDS_PER_DAY: i64 = 86_400;
pub const DEFAULT_STAGE_DURATION: i64 = 10 * SECONDS_PER_DAY;

/// Referral payouts and purchased-token claims stay locked this long after launch.
pub const LOCK_PERIOD_SECONDS: i64 = 30 * SECONDS_PER_DAY;

pub const DEFAULT_REFERRAL_RATE_BPS: u16 = 1_000; // 10%
pub const MAX_REFERRAL_RATE_BPS: u16 = 5_000;

pub const DEFAULT_MIN_BUY_USD: u128 = 10 * USD_PRECISION;
pub const DEFAULT_MAX_BUY_USD: u128 = 10_000 * USD_PRECISION;

/// Oldest oracle quote accepted for pricing, in seconds.
pub const DEFAULT_ORACLE_MAX_AGE: u64 = 60;

