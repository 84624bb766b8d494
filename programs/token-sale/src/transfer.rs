use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::errors::SaleError;
use crate::math::to_token_amount;

/// A token movement bound to a fixed source and destination.
///
/// Ledgers debit themselves before calling `transfer` and restore the debit when it
/// fails, so a refused movement never leaves a balance double-booked.
pub trait TokenTransfer {
    fn transfer(&self, amount: u128) -> Result<()>;
}

/// SPL Token transfer, signed either by a wallet or by a program PDA.
pub struct SplTransfer<'a, 'info> {
    pub token_program: AccountInfo<'info>,
    pub from: AccountInfo<'info>,
    pub to: AccountInfo<'info>,
    pub authority: AccountInfo<'info>,
    pub signer_seeds: &'a [&'a [&'a [u8]]],
}

impl<'a, 'info> TokenTransfer for SplTransfer<'a, 'info> {
    fn transfer(&self, amount: u128) -> Result<()> {
        let amount = to_token_amount(amount)?;
        let cpi_ctx = CpiContext::new_with_signer(
            self.token_program.clone(),
            Transfer {
                from: self.from.clone(),
                to: self.to.clone(),
                authority: self.authority.clone(),
            },
            self.signer_seeds,
        );
        token::transfer(cpi_ctx, amount).map_err(|err| {
            msg!("SPL transfer of {} failed: {}", amount, err);
            error!(SaleError::TransferFailed)
        })
    }
}
