use anchor_lang::prelude::*;

use crate::errors::SaleError;
use crate::math::mul_div_floor;
use crate::transfer::TokenTransfer;

/// Cliff plus linear vesting grant for one beneficiary.
///
/// Tokens sit in the grant's vault PDA from creation; `released` tracks what has left it.
/// The linear curve is anchored at `start`, so the first amount visible at the cliff is
/// already `total * cliff / duration`.
#[account]
#[derive(Default, Debug)]
pub struct VestingGrant {
    pub beneficiary: Pubkey,
    pub start: i64,
    /// Seconds after `start` before anything vests.
    pub cliff: i64,
    pub duration: i64,
    pub total_amount: u128,
    pub released: u128,
    pub bump: u8,
    pub vault_bump: u8,
}

impl VestingGrant {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // beneficiary
        8 +   // start
        8 +   // cliff
        8 +   // duration
        16 +  // total_amount
        16 +  // released
        1 +   // bump
        1;    // vault_bump

    pub fn new(
        beneficiary: Pubkey,
        start: i64,
        cliff: i64,
        duration: i64,
        total_amount: u128,
    ) -> Result<Self> {
        require!(start >= 0, SaleError::InvalidVestingSchedule);
        require!(duration > 0, SaleError::InvalidVestingSchedule);
        require!(cliff >= 0 && cliff <= duration, SaleError::InvalidVestingSchedule);
        require!(total_amount > 0, SaleError::InvalidVestingSchedule);
        start
            .checked_add(duration)
            .ok_or(SaleError::InvalidVestingSchedule)?;

        Ok(Self {
            beneficiary,
            start,
            cliff,
            duration,
            total_amount,
            released: 0,
            bump: 0,
            vault_bump: 0,
        })
    }

    pub fn cliff_passed(&self, now: i64) -> bool {
        now >= self.start.saturating_add(self.cliff)
    }

    /// Tokens vested at `now`: zero before the cliff, then linear until `start + duration`.
    pub fn vested_amount(&self, now: i64) -> Result<u128> {
        if !self.cliff_passed(now) {
            return Ok(0);
        }
        let elapsed = now
            .checked_sub(self.start)
            .ok_or(SaleError::MathOverflow)?;
        if elapsed >= self.duration {
            return Ok(self.total_amount);
        }
        mul_div_floor(self.total_amount, elapsed as u128, self.duration as u128)
    }

    pub fn releasable(&self, now: i64) -> Result<u128> {
        Ok(self.vested_amount(now)?.saturating_sub(self.released))
    }

    pub fn release(&mut self, now: i64, payout: &impl TokenTransfer) -> Result<u128> {
        let amount = self.releasable(now)?;
        require!(amount > 0, SaleError::NothingVested);

        let released_before = self.released;
        self.released = released_before
            .checked_add(amount)
            .ok_or(SaleError::MathOverflow)?;
        if let Err(err) = payout.transfer(amount) {
            self.released = released_before;
            return Err(err);
        }

        Ok(amount)
    }
}
