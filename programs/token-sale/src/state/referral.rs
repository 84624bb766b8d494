use anchor_lang::prelude::*;

use crate::errors::SaleError;
use crate::math::bps_of;
use crate::state::ClaimGate;
use crate::transfer::TokenTransfer;

/// Referral earnings of one referrer.
///
/// `earnings` grows with every referred purchase and drops to zero on a successful
/// claim; the payout comes from the reserve allowance, not from the sale vault.
#[account]
#[derive(Default, Debug)]
pub struct ReferralLedger {
    pub referrer: Pubkey,
    pub earnings: u128,
    pub total_accrued: u128,
    pub total_claimed: u128,
    pub bump: u8,
}

impl ReferralLedger {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // referrer
        16 +  // earnings
        16 +  // total_accrued
        16 +  // total_claimed
        1;    // bump

    /// Bonus owed for a purchase of `purchase_tokens`, floored.
    pub fn bonus_for(purchase_tokens: u128, rate_bps: u16) -> Result<u128> {
        bps_of(purchase_tokens, rate_bps)
    }

    pub fn accrue(&mut self, purchase_tokens: u128, rate_bps: u16) -> Result<u128> {
        let bonus = Self::bonus_for(purchase_tokens, rate_bps)?;
        self.credit(bonus)?;
        Ok(bonus)
    }

    fn credit(&mut self, bonus: u128) -> Result<()> {
        let earnings = self
            .earnings
            .checked_add(bonus)
            .ok_or(SaleError::MathOverflow)?;
        let total_accrued = self
            .total_accrued
            .checked_add(bonus)
            .ok_or(SaleError::MathOverflow)?;
        self.earnings = earnings;
        self.total_accrued = total_accrued;
        Ok(())
    }

    pub fn claim(
        &mut self,
        gate: &ClaimGate,
        now: i64,
        payout: &impl TokenTransfer,
    ) -> Result<u128> {
        gate.ensure_open(now)?;

        let amount = self.earnings;
        require!(amount > 0, SaleError::NothingToClaim);
        let total_claimed = self
            .total_claimed
            .checked_add(amount)
            .ok_or(SaleError::MathOverflow)?;

        self.earnings = 0;
        if let Err(err) = payout.transfer(amount) {
            self.earnings = amount;
            return Err(err);
        }
        self.total_claimed = total_claimed;

        Ok(amount)
    }
}
