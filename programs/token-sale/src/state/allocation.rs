use anchor_lang::prelude::*;

use crate::errors::SaleError;
use crate::state::ClaimGate;
use crate::transfer::TokenTransfer;

/// Purchase ledger entry for one buyer.
///
/// `purchased_tokens` only ever grows; withdrawals are tracked in `claimed_tokens`.
#[account]
#[derive(Default, Debug)]
pub struct BuyerAllocation {
    pub buyer: Pubkey,
    pub purchased_tokens: u128,
    pub claimed_tokens: u128,
    /// 18-decimal USD
    pub usd_spent: u128,
    pub purchase_count: u32,
    pub last_purchase_at: i64,
    pub bump: u8,
}

impl BuyerAllocation {
    pub const LEN: usize = 8 +  // discriminator
        32 +  // buyer
        16 +  // purchased_tokens
        16 +  // claimed_tokens
        16 +  // usd_spent
        4 +   // purchase_count
        8 +   // last_purchase_at
        1;    // bump

    pub fn claimable(&self) -> u128 {
        self.purchased_tokens.saturating_sub(self.claimed_tokens)
    }

    /// Ledger state after crediting a purchase, without touching `self`.
    pub(crate) fn credited(&self, tokens: u128, usd_value: u128, now: i64) -> Result<Self> {
        Ok(Self {
            buyer: self.buyer,
            purchased_tokens: self
                .purchased_tokens
                .checked_add(tokens)
                .ok_or(SaleError::MathOverflow)?,
            claimed_tokens: self.claimed_tokens,
            usd_spent: self
                .usd_spent
                .checked_add(usd_value)
                .ok_or(SaleError::MathOverflow)?,
            purchase_count: self
                .purchase_count
                .checked_add(1)
                .ok_or(SaleError::MathOverflow)?,
            last_purchase_at: now,
            bump: self.bump,
        })
    }

    /// Withdraws everything purchased but not yet claimed, once the gate is open.
    pub fn claim(
        &mut self,
        gate: &ClaimGate,
        now: i64,
        payout: &impl TokenTransfer,
    ) -> Result<u128> {
        gate.ensure_open(now)?;

        let amount = self.claimable();
        require!(amount > 0, SaleError::NothingToClaim);

        let claimed_before = self.claimed_tokens;
        self.claimed_tokens = self.purchased_tokens;
        if let Err(err) = payout.transfer(amount) {
            self.claimed_tokens = claimed_before;
            return Err(err);
        }

        Ok(amount)
    }
}
