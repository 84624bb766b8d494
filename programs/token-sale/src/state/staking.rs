//! Revenue-sharing stake pool.
//!
//! Stakers lock the sale token and receive revenue deposits pro rata to their principal
//! at the time of each deposit. Distribution uses a reward-per-share accumulator, so a
//! deposit costs O(1) regardless of the number of stakers:
//!
//! - `acc_reward_per_share` grows by `revenue * ACC_PRECISION / total_principal`;
//! - a position is owed `principal * acc_reward_per_share / ACC_PRECISION - reward_debt`;
//! - every principal change first settles what is owed into `pending_reward`.
//!
//! Revenue deposited while nothing is staked is held in `unattributed_revenue` and
//! folded into the accumulator for whoever stakes next. The part of a deposit lost to
//! flooring the per-share increment stays there too and joins the next deposit.

use anchor_lang::prelude::*;

use crate::constants::ACC_PRECISION;
use crate::errors::SaleError;
use crate::math::mul_div_floor;
use crate::transfer::TokenTransfer;

#[account]
#[derive(Default, Debug)]
pub struct StakePool {
    /// Only this key may deposit revenue.
    pub authority: Pubkey,
    pub stake_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub total_principal: u128,
    /// Scaled by `ACC_PRECISION`.
    pub acc_reward_per_share: u128,
    pub unattributed_revenue: u128,
    pub total_revenue_deposited: u128,
    pub total_rewards_paid: u128,
    pub bump: u8,
    pub stake_vault_bump: u8,
    pub reward_vault_bump: u8,
}

#[account]
#[derive(Default, Debug)]
pub struct StakePosition {
    pub owner: Pubkey,
    pub principal: u128,
    pub reward_debt: u128,
    /// Settled on principal changes, paid by `claim_reward`.
    pub pending_reward: u128,
    pub bump: u8,
}

impl StakePosition {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // owner
        16 +  // principal
        16 +  // reward_debt
        16 +  // pending_reward
        1;    // bump

    fn accumulated(&self, acc_reward_per_share: u128) -> Result<u128> {
        mul_div_floor(self.principal, acc_reward_per_share, ACC_PRECISION)
    }

    /// Moves everything earned since the last settlement into `pending_reward`.
    fn settle(&mut self, acc_reward_per_share: u128) -> Result<()> {
        let earned = self
            .accumulated(acc_reward_per_share)?
            .saturating_sub(self.reward_debt);
        self.pending_reward = self
            .pending_reward
            .checked_add(earned)
            .ok_or(SaleError::MathOverflow)?;
        self.reward_debt = self.accumulated(acc_reward_per_share)?;
        Ok(())
    }
}

impl StakePool {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // authority
        32 +  // stake_mint
        32 +  // reward_mint
        16 +  // total_principal
        16 +  // acc_reward_per_share
        16 +  // unattributed_revenue
        16 +  // total_revenue_deposited
        16 +  // total_rewards_paid
        1 +   // bump
        1 +   // stake_vault_bump
        1;    // reward_vault_bump

    /// Reward claimable by `position` right now.
    pub fn pending_reward(&self, position: &StakePosition) -> Result<u128> {
        let earned = position
            .accumulated(self.acc_reward_per_share)?
            .saturating_sub(position.reward_debt);
        position
            .pending_reward
            .checked_add(earned)
            .ok_or(error!(SaleError::MathOverflow))
    }

    pub fn stake(
        &mut self,
        position: &mut StakePosition,
        amount: u128,
        pull_principal: &impl TokenTransfer,
    ) -> Result<()> {
        require!(amount > 0, SaleError::ZeroAmount);

        let mut pool = self.clone();
        let mut pos = position.clone();
        pos.settle(pool.acc_reward_per_share)?;
        pos.principal = pos
            .principal
            .checked_add(amount)
            .ok_or(SaleError::MathOverflow)?;
        pool.total_principal = pool
            .total_principal
            .checked_add(amount)
            .ok_or(SaleError::MathOverflow)?;
        pos.reward_debt = pos.accumulated(pool.acc_reward_per_share)?;
        pool.flush_unattributed()?;

        pull_principal.transfer(amount)?;

        *self = pool;
        *position = pos;
        Ok(())
    }

    pub fn unstake(
        &mut self,
        position: &mut StakePosition,
        amount: u128,
        return_principal: &impl TokenTransfer,
    ) -> Result<()> {
        require!(amount > 0, SaleError::ZeroAmount);
        require!(amount <= position.principal, SaleError::InsufficientPrincipal);

        let mut pool = self.clone();
        let mut pos = position.clone();
        pos.settle(pool.acc_reward_per_share)?;
        pos.principal -= amount;
        pool.total_principal = pool
            .total_principal
            .checked_sub(amount)
            .ok_or(SaleError::MathOverflow)?;
        pos.reward_debt = pos.accumulated(pool.acc_reward_per_share)?;

        return_principal.transfer(amount)?;

        *self = pool;
        *position = pos;
        Ok(())
    }

    pub fn claim_reward(
        &mut self,
        position: &mut StakePosition,
        payout: &impl TokenTransfer,
    ) -> Result<u128> {
        let mut pos = position.clone();
        pos.settle(self.acc_reward_per_share)?;

        let amount = pos.pending_reward;
        require!(amount > 0, SaleError::NothingToClaim);
        let total_rewards_paid = self
            .total_rewards_paid
            .checked_add(amount)
            .ok_or(SaleError::MathOverflow)?;
        pos.pending_reward = 0;

        payout.transfer(amount)?;

        self.total_rewards_paid = total_rewards_paid;
        *position = pos;
        Ok(amount)
    }

    pub fn deposit_revenue(&mut self, amount: u128, funding: &impl TokenTransfer) -> Result<()> {
        require!(amount > 0, SaleError::ZeroAmount);

        let mut pool = self.clone();
        pool.total_revenue_deposited = pool
            .total_revenue_deposited
            .checked_add(amount)
            .ok_or(SaleError::MathOverflow)?;
        pool.unattributed_revenue = pool
            .unattributed_revenue
            .checked_add(amount)
            .ok_or(SaleError::MathOverflow)?;
        pool.flush_unattributed()?;

        funding.transfer(amount)?;

        *self = pool;
        Ok(())
    }

    fn flush_unattributed(&mut self) -> Result<()> {
        if self.total_principal == 0 || self.unattributed_revenue == 0 {
            return Ok(());
        }
        let per_share = mul_div_floor(self.unattributed_revenue, ACC_PRECISION, self.total_principal)?;
        let distributed = mul_div_floor(per_share, self.total_principal, ACC_PRECISION)?;
        self.acc_reward_per_share = self
            .acc_reward_per_share
            .checked_add(per_share)
            .ok_or(SaleError::MathOverflow)?;
        self.unattributed_revenue = self
            .unattributed_revenue
            .checked_sub(distributed)
            .ok_or(SaleError::MathOverflow)?;
        Ok(())
    }
}
