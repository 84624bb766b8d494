use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::constants::*;
use crate::errors::SaleError;
use crate::events::{Released, VestingGrantCreated};
use crate::state::*;
use crate::transfer::{SplTransfer, TokenTransfer};

/// Locks `total_amount` tokens from the admin into a per-beneficiary vault that
/// releases them on a cliff plus linear schedule.
pub fn create_vesting_grant(
    ctx: Context<CreateVestingGrant>,
    beneficiary: Pubkey,
    start: i64,
    cliff: i64,
    duration: i64,
    total_amount: u64,
) -> Result<()> {
    let mut grant = VestingGrant::new(beneficiary, start, cliff, duration, total_amount as u128)?;
    grant.bump = ctx.bumps.grant;
    grant.vault_bump = ctx.bumps.vesting_vault;

    SplTransfer {
        token_program: ctx.accounts.token_program.to_account_info(),
        from: ctx.accounts.admin_token_account.to_account_info(),
        to: ctx.accounts.vesting_vault.to_account_info(),
        authority: ctx.accounts.admin.to_account_info(),
        signer_seeds: &[],
    }
    .transfer(total_amount as u128)?;

    emit!(VestingGrantCreated {
        beneficiary,
        start,
        cliff,
        duration,
        total_amount: grant.total_amount,
    });

    ctx.accounts.grant.set_inner(grant);
    Ok(())
}

pub fn release_vested(ctx: Context<ReleaseVested>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = &mut *ctx.accounts;

    let grant_key = accounts.grant.key();
    let bump = [accounts.grant.vault_bump];
    let seeds: &[&[u8]] = &[SEED_VESTING_VAULT, grant_key.as_ref(), &bump];
    let signer_seeds = &[seeds];
    let payout = SplTransfer {
        token_program: accounts.token_program.to_account_info(),
        from: accounts.vesting_vault.to_account_info(),
        to: accounts.beneficiary_token_account.to_account_info(),
        authority: accounts.vesting_vault.to_account_info(),
        signer_seeds,
    };

    let amount = accounts.grant.release(now, &payout)?;

    msg!(
        "Released {} of {} vested tokens",
        amount,
        accounts.grant.total_amount
    );
    emit!(Released {
        beneficiary: accounts.beneficiary.key(),
        amount,
        total_released: accounts.grant.released,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(beneficiary: Pubkey)]
pub struct CreateVestingGrant<'info> {
    #[account(
        mut,
        constraint = admin.key() == sale.admin @ SaleError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [SEED_SALE],
        bump = sale.bump,
    )]
    pub sale: Account<'info, SaleConfig>,

    #[account(
        init,
        payer = admin,
        space = VestingGrant::LEN,
        seeds = [SEED_VESTING, beneficiary.as_ref()],
        bump
    )]
    pub grant: Account<'info, VestingGrant>,

    #[account(
        init,
        payer = admin,
        seeds = [SEED_VESTING_VAULT, grant.key().as_ref()],
        bump,
        token::mint = token_mint,
        token::authority = vesting_vault,
    )]
    pub vesting_vault: Account<'info, TokenAccount>,

    #[account(
        constraint = token_mint.key() == sale.token_mint @ SaleError::InvalidTokenMint
    )]
    pub token_mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = admin_token_account.owner == admin.key() @ SaleError::InvalidTokenAccount,
        constraint = admin_token_account.mint == token_mint.key() @ SaleError::InvalidTokenMint,
    )]
    pub admin_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct ReleaseVested<'info> {
    #[account(mut)]
    pub beneficiary: Signer<'info>,

    #[account(
        mut,
        seeds = [SEED_VESTING, beneficiary.key().as_ref()],
        bump = grant.bump,
        constraint = grant.beneficiary == beneficiary.key() @ SaleError::Unauthorized,
    )]
    pub grant: Account<'info, VestingGrant>,

    #[account(
        mut,
        seeds = [SEED_VESTING_VAULT, grant.key().as_ref()],
        bump = grant.vault_bump,
    )]
    pub vesting_vault: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = beneficiary,
        associated_token::mint = token_mint,
        associated_token::authority = beneficiary,
    )]
    pub beneficiary_token_account: Account<'info, TokenAccount>,

    #[account(
        constraint = token_mint.key() == vesting_vault.mint @ SaleError::InvalidTokenMint
    )]
    pub token_mint: Account<'info, Mint>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}
