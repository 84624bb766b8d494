use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::events::SaleInitialized;
use crate::state::*;

/// Creates the sale config and the vault that holds tokens owed to buyers.
///
/// The admin becomes the only signer allowed to pause the sale, change purchase
/// bounds, open claiming and fund the vault.
pub fn initialize(ctx: Context<Initialize>, params: SaleParams) -> Result<()> {
    let mints = SaleMints {
        token_mint: ctx.accounts.token_mint.key(),
        token_decimals: ctx.accounts.token_mint.decimals,
        stable_mint: ctx.accounts.stable_mint.key(),
        stable_decimals: ctx.accounts.stable_mint.decimals,
    };
    let sale = SaleConfig::new(
        ctx.accounts.admin.key(),
        mints,
        &params,
        ctx.bumps.sale,
        ctx.bumps.sale_vault,
    )?;

    msg!(
        "Sale initialized: {} stages from {}, first price {} (usd, 18 dec), supply {}",
        sale.schedule.stages.len(),
        sale.schedule.sale_start(),
        sale.schedule.current_price_usd(),
        sale.sale_supply
    );

    emit!(SaleInitialized {
        admin: sale.admin,
        token_mint: sale.token_mint,
        stable_mint: sale.stable_mint,
        treasury: sale.treasury,
        stage_count: sale.schedule.stages.len() as u8,
        sale_start: sale.schedule.sale_start(),
        first_price_usd: sale.schedule.current_price_usd(),
    });

    ctx.accounts.sale.set_inner(sale);
    Ok(())
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        space = SaleConfig::LEN,
        seeds = [SEED_SALE],
        bump
    )]
    pub sale: Account<'info, SaleConfig>,

    /// The sale token mint (must already exist)
    pub token_mint: Account<'info, Mint>,

    /// Stable coin accepted as payment
    pub stable_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = admin,
        seeds = [SEED_SALE_VAULT, sale.key().as_ref()],
        bump,
        token::mint = token_mint,
        token::authority = sale_vault,
    )]
    pub sale_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}
