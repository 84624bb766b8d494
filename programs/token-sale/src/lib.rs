use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod oracle;
pub mod state;
pub mod transfer;

pub use instructions::*;
pub use oracle::OracleSource;
pub use state::{SaleParams, StageParams};

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

// ============================================================================
// PROGRAM
// ============================================================================

#[program]
pub mod token_sale {
    use super::*;

    /// Creates the sale config PDA and the sale vault.
    ///
    /// # Security
    /// - Can only be called once (config account is initialized)
    /// - Stage schedule, purchase bounds, referral rate and oracle source are validated
    pub fn initialize(ctx: Context<Initialize>, params: SaleParams) -> Result<()> {
        instructions::initialize::initialize(ctx, params)
    }

    pub fn set_sale_active(ctx: Context<AdminUpdate>, is_active: bool) -> Result<()> {
        instructions::admin::set_sale_active(ctx, is_active)
    }

    pub fn update_purchase_bounds(
        ctx: Context<AdminUpdate>,
        min_buy_usd: u128,
        max_buy_usd: u128,
    ) -> Result<()> {
        instructions::admin::update_purchase_bounds(ctx, min_buy_usd, max_buy_usd)
    }

    pub fn enable_claiming(ctx: Context<AdminUpdate>) -> Result<()> {
        instructions::admin::enable_claiming(ctx)
    }

    /// Fixes the launch time once; claims open `lock_period` seconds later.
    pub fn set_launch_time(ctx: Context<AdminUpdate>, launch_time: i64) -> Result<()> {
        instructions::admin::set_launch_time(ctx, launch_time)
    }

    pub fn fund_sale_vault(ctx: Context<FundSaleVault>, amount: u64) -> Result<()> {
        instructions::admin::fund_sale_vault(ctx, amount)
    }

    /// Purchases sale tokens with native SOL.
    ///
    /// The payment is valued in USD through the configured oracle, priced at the stage
    /// active at execution time, and credited to the buyer's allocation. Passing a
    /// referral ledger accrues the referrer's bonus.
    pub fn buy_with_gas_currency(ctx: Context<BuyWithGas>, lamports: u64) -> Result<()> {
        instructions::buy::buy_with_gas_currency(ctx, lamports)
    }

    /// Purchases sale tokens with the stable coin, one stable unit per USD.
    pub fn buy_with_stable_coin(ctx: Context<BuyWithStable>, amount: u64) -> Result<()> {
        instructions::buy::buy_with_stable_coin(ctx, amount)
    }

    pub fn open_referral_ledger(ctx: Context<OpenReferralLedger>) -> Result<()> {
        instructions::referral::open_referral_ledger(ctx)
    }

    pub fn claim_referral_rewards(ctx: Context<ClaimReferralRewards>) -> Result<()> {
        instructions::referral::claim_referral_rewards(ctx)
    }

    pub fn claim_tokens(ctx: Context<ClaimTokens>) -> Result<()> {
        instructions::claim_tokens::claim_tokens(ctx)
    }

    /// Locks team or advisor tokens under a cliff plus linear schedule.
    pub fn create_vesting_grant(
        ctx: Context<CreateVestingGrant>,
        beneficiary: Pubkey,
        start: i64,
        cliff: i64,
        duration: i64,
        total_amount: u64,
    ) -> Result<()> {
        instructions::vesting::create_vesting_grant(
            ctx,
            beneficiary,
            start,
            cliff,
            duration,
            total_amount,
        )
    }

    pub fn release_vested(ctx: Context<ReleaseVested>) -> Result<()> {
        instructions::vesting::release_vested(ctx)
    }

    pub fn initialize_stake_pool(ctx: Context<InitializeStakePool>) -> Result<()> {
        instructions::staking::initialize_stake_pool(ctx)
    }

    pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
        instructions::staking::stake(ctx, amount)
    }

    pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
        instructions::staking::unstake(ctx, amount)
    }

    pub fn claim_reward(ctx: Context<ClaimReward>) -> Result<()> {
        instructions::staking::claim_reward(ctx)
    }

    pub fn deposit_revenue(ctx: Context<DepositRevenue>, amount: u64) -> Result<()> {
        instructions::staking::deposit_revenue(ctx, amount)
    }
}
