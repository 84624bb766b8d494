use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::constants::*;
use crate::errors::SaleError;
use crate::events::ReferralClaimed;
use crate::state::*;
use crate::transfer::SplTransfer;

pub fn open_referral_ledger(ctx: Context<OpenReferralLedger>) -> Result<()> {
    let ledger = &mut ctx.accounts.referral_ledger;
    ledger.referrer = ctx.accounts.referrer.key();
    ledger.bump = ctx.bumps.referral_ledger;

    msg!("Referral ledger opened for {}", ledger.referrer);
    Ok(())
}

/// Pays out accrued referral earnings from the reserve account.
///
/// The reserve holder approves the sale PDA as delegate beforehand; the payout fails
/// with `TransferFailed` when the allowance or balance is short, and the earnings stay
/// claimable.
pub fn claim_referral_rewards(ctx: Context<ClaimReferralRewards>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = &mut *ctx.accounts;

    let bump = [accounts.sale.bump];
    let seeds: &[&[u8]] = &[SEED_SALE, &bump];
    let signer_seeds = &[seeds];
    let payout = SplTransfer {
        token_program: accounts.token_program.to_account_info(),
        from: accounts.reserve_token_account.to_account_info(),
        to: accounts.referrer_token_account.to_account_info(),
        authority: accounts.sale.to_account_info(),
        signer_seeds,
    };

    let amount = accounts
        .referral_ledger
        .claim(&accounts.sale.gate, now, &payout)?;

    msg!("Referral payout of {} to {}", amount, accounts.referrer.key());
    emit!(ReferralClaimed {
        referrer: accounts.referrer.key(),
        amount,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct OpenReferralLedger<'info> {
    #[account(mut)]
    pub referrer: Signer<'info>,

    #[account(
        init,
        payer = referrer,
        space = ReferralLedger::LEN,
        seeds = [SEED_REFERRAL, referrer.key().as_ref()],
        bump
    )]
    pub referral_ledger: Account<'info, ReferralLedger>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ClaimReferralRewards<'info> {
    #[account(mut)]
    pub referrer: Signer<'info>,

    #[account(
        seeds = [SEED_SALE],
        bump = sale.bump,
    )]
    pub sale: Account<'info, SaleConfig>,

    #[account(
        mut,
        seeds = [SEED_REFERRAL, referrer.key().as_ref()],
        bump = referral_ledger.bump,
        constraint = referral_ledger.referrer == referrer.key() @ SaleError::InvalidReferralLedger,
    )]
    pub referral_ledger: Account<'info, ReferralLedger>,

    #[account(
        mut,
        address = sale.reserve_token_account @ SaleError::InvalidTokenAccount,
        constraint = reserve_token_account.mint == sale.token_mint @ SaleError::InvalidTokenMint,
    )]
    pub reserve_token_account: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = referrer,
        associated_token::mint = token_mint,
        associated_token::authority = referrer,
    )]
    pub referrer_token_account: Account<'info, TokenAccount>,

    #[account(
        constraint = token_mint.key() == sale.token_mint @ SaleError::InvalidTokenMint
    )]
    pub token_mint: Account<'info, Mint>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}
