use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::errors::SaleError;
use crate::events::*;
use crate::state::*;
use crate::transfer::{SplTransfer, TokenTransfer};

pub fn set_sale_active(ctx: Context<AdminUpdate>, is_active: bool) -> Result<()> {
    let sale = &mut ctx.accounts.sale;
    sale.is_active = is_active;

    msg!("Sale active: {}", is_active);
    emit!(SaleStatusChanged { is_active });
    Ok(())
}

pub fn update_purchase_bounds(
    ctx: Context<AdminUpdate>,
    min_buy_usd: u128,
    max_buy_usd: u128,
) -> Result<()> {
    ctx.accounts.sale.update_bounds(min_buy_usd, max_buy_usd)?;

    emit!(PurchaseBoundsUpdated {
        min_buy_usd,
        max_buy_usd,
    });
    Ok(())
}

/// Opens the claim gate. Claims still wait for the launch time plus the lock period.
pub fn enable_claiming(ctx: Context<AdminUpdate>) -> Result<()> {
    let sale = &mut ctx.accounts.sale;
    if !sale.gate.enable() {
        msg!("Claiming already enabled");
        return Ok(());
    }

    emit!(ClaimingEnabled {
        admin: ctx.accounts.admin.key(),
    });
    Ok(())
}

pub fn set_launch_time(ctx: Context<AdminUpdate>, launch_time: i64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let gate = &mut ctx.accounts.sale.gate;
    gate.set_launch_time(launch_time, now)?;
    let unlock_time = gate.unlock_time().ok_or(SaleError::MathOverflow)?;

    msg!("Launch time {}, claims unlock at {}", launch_time, unlock_time);
    emit!(LaunchTimeSet {
        launch_time,
        unlock_time,
    });
    Ok(())
}

/// Moves sale tokens from the admin into the vault that pays out purchased tokens.
pub fn fund_sale_vault(ctx: Context<FundSaleVault>, amount: u64) -> Result<()> {
    require!(amount > 0, SaleError::ZeroAmount);

    SplTransfer {
        token_program: ctx.accounts.token_program.to_account_info(),
        from: ctx.accounts.admin_token_account.to_account_info(),
        to: ctx.accounts.sale_vault.to_account_info(),
        authority: ctx.accounts.admin.to_account_info(),
        signer_seeds: &[],
    }
    .transfer(amount as u128)?;

    emit!(SaleVaultFunded {
        admin: ctx.accounts.admin.key(),
        amount,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct AdminUpdate<'info> {
    #[account(
        constraint = admin.key() == sale.admin @ SaleError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [SEED_SALE],
        bump = sale.bump
    )]
    pub sale: Account<'info, SaleConfig>,
}

#[derive(Accounts)]
pub struct FundSaleVault<'info> {
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
        mut,
        constraint = admin_token_account.owner == admin.key() @ SaleError::InvalidTokenAccount,
        constraint = admin_token_account.mint == sale.token_mint @ SaleError::InvalidTokenMint,
    )]
    pub admin_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [SEED_SALE_VAULT, sale.key().as_ref()],
        bump = sale.vault_bump,
    )]
    pub sale_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}
