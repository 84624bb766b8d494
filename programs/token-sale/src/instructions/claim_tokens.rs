use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::constants::*;
use crate::errors::SaleError;
use crate::events::TokensClaimed;
use crate::state::*;
use crate::transfer::SplTransfer;

/// Withdraws every purchased but unclaimed token from the sale vault once the claim
/// gate is open. The vault PDA signs the transfer.
pub fn claim_tokens(ctx: Context<ClaimTokens>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = &mut *ctx.accounts;

    let sale_key = accounts.sale.key();
    let bump = [accounts.sale.vault_bump];
    let seeds: &[&[u8]] = &[SEED_SALE_VAULT, sale_key.as_ref(), &bump];
    let signer_seeds = &[seeds];
    let payout = SplTransfer {
        token_program: accounts.token_program.to_account_info(),
        from: accounts.sale_vault.to_account_info(),
        to: accounts.buyer_token_account.to_account_info(),
        authority: accounts.sale_vault.to_account_info(),
        signer_seeds,
    };

    let amount = accounts
        .allocation
        .claim(&accounts.sale.gate, now, &payout)?;

    emit!(TokensClaimed {
        buyer: accounts.buyer.key(),
        amount,
        total_claimed: accounts.allocation.claimed_tokens,
        total_purchased: accounts.allocation.purchased_tokens,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct ClaimTokens<'info> {
    #[account(mut)]
    pub buyer: Signer<'info>,

    #[account(
        seeds = [SEED_SALE],
        bump = sale.bump,
    )]
    pub sale: Account<'info, SaleConfig>,

    #[account(
        mut,
        seeds = [SEED_ALLOCATION, buyer.key().as_ref()],
        bump = allocation.bump,
        constraint = allocation.buyer == buyer.key() @ SaleError::Unauthorized,
    )]
    pub allocation: Account<'info, BuyerAllocation>,

    #[account(
        mut,
        seeds = [SEED_SALE_VAULT, sale.key().as_ref()],
        bump = sale.vault_bump,
    )]
    pub sale_vault: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = buyer,
        associated_token::mint = token_mint,
        associated_token::authority = buyer,
    )]
    pub buyer_token_account: Account<'info, TokenAccount>,

    #[account(
        constraint = token_mint.key() == sale.token_mint @ SaleError::InvalidTokenMint
    )]
    pub token_mint: Account<'info, Mint>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}
