use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use solana_program::{program::invoke, system_instruction};

use crate::constants::*;
use crate::errors::SaleError;
use crate::events::*;
use crate::state::*;
use crate::transfer::{SplTransfer, TokenTransfer};

/// Buys sale tokens with native SOL priced through the configured oracle.
/// Lamports go straight to the treasury; the program holds no payment funds.
pub fn buy_with_gas_currency(ctx: Context<BuyWithGas>, lamports: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let allocation_bump = ctx.bumps.allocation;
    let accounts = &mut *ctx.accounts;
    let buyer = accounts.buyer.key();
    accounts.allocation.bump = allocation_bump;

    let feed_info = accounts.price_feed.as_ref().map(|feed| feed.to_account_info());
    let oracle = accounts.sale.oracle.resolve(feed_info.as_ref())?;

    let purchase = accounts.sale.buy_with_gas_currency(
        buyer,
        &mut accounts.allocation,
        accounts.referral_ledger.as_deref_mut(),
        lamports as u128,
        &oracle,
        now,
    )?;

    invoke(
        &system_instruction::transfer(&buyer, &accounts.treasury.key(), lamports),
        &[
            accounts.buyer.to_account_info(),
            accounts.treasury.to_account_info(),
            accounts.system_program.to_account_info(),
        ],
    )?;

    record_purchase(&accounts.sale, &purchase, accounts.referral_ledger.as_deref());
    Ok(())
}

/// Buys sale tokens with the configured stable coin, valued one-to-one in USD.
pub fn buy_with_stable_coin(ctx: Context<BuyWithStable>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let allocation_bump = ctx.bumps.allocation;
    let accounts = &mut *ctx.accounts;
    let buyer = accounts.buyer.key();
    accounts.allocation.bump = allocation_bump;

    let purchase = accounts.sale.buy_with_stable_coin(
        buyer,
        &mut accounts.allocation,
        accounts.referral_ledger.as_deref_mut(),
        amount as u128,
        now,
    )?;

    SplTransfer {
        token_program: accounts.token_program.to_account_info(),
        from: accounts.buyer_stable_account.to_account_info(),
        to: accounts.treasury_stable_account.to_account_info(),
        authority: accounts.buyer.to_account_info(),
        signer_seeds: &[],
    }
    .transfer(amount as u128)?;

    record_purchase(&accounts.sale, &purchase, accounts.referral_ledger.as_deref());
    Ok(())
}

fn record_purchase(sale: &SaleConfig, purchase: &Purchase, referral: Option<&ReferralLedger>) {
    for index in (purchase.stage_before + 1)..=purchase.stage_after {
        let stage = &sale.schedule.stages[index as usize];
        msg!(
            "Stage {} active from {} at {} usd per token",
            stage.index,
            stage.start_time,
            stage.price_usd
        );
        emit!(StageAdvanced {
            index: stage.index,
            price_usd: stage.price_usd,
            start_time: stage.start_time,
        });
    }

    msg!(
        "Purchase: {} tokens for {} usd at stage {} (price {})",
        purchase.tokens,
        purchase.usd_value,
        purchase.stage_index,
        purchase.price_usd
    );
    emit!(TokensPurchased {
        buyer: purchase.buyer,
        tokens: purchase.tokens,
        cost: purchase.cost,
        usd_value: purchase.usd_value,
        currency: purchase.currency,
        stage: purchase.stage_index,
    });

    if let Some(ledger) = referral {
        if purchase.referral_bonus == 0 {
            msg!("Referral bonus skipped for referrer {}", ledger.referrer);
            return;
        }
        emit!(ReferralAccrued {
            referrer: ledger.referrer,
            buyer: purchase.buyer,
            bonus: purchase.referral_bonus,
            earnings: ledger.earnings,
        });
    }
}

#[derive(Accounts)]
pub struct BuyWithGas<'info> {
    #[account(mut)]
    pub buyer: Signer<'info>,

    #[account(
        mut,
        seeds = [SEED_SALE],
        bump = sale.bump,
    )]
    pub sale: Account<'info, SaleConfig>,

    #[account(
        init_if_needed,
        payer = buyer,
        space = BuyerAllocation::LEN,
        seeds = [SEED_ALLOCATION, buyer.key().as_ref()],
        bump
    )]
    pub allocation: Account<'info, BuyerAllocation>,

    /// Referrer's ledger; only this program creates accounts of this type.
    #[account(mut)]
    pub referral_ledger: Option<Account<'info, ReferralLedger>>,

    /// CHECK: Validated against sale.treasury
    #[account(
        mut,
        constraint = treasury.key() == sale.treasury @ SaleError::InvalidTokenAccount
    )]
    pub treasury: UncheckedAccount<'info>,

    /// CHECK: Matched against the configured Pyth feed before it is read
    pub price_feed: Option<UncheckedAccount<'info>>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct BuyWithStable<'info> {
    #[account(mut)]
    pub buyer: Signer<'info>,

    #[account(
        mut,
        seeds = [SEED_SALE],
        bump = sale.bump,
    )]
    pub sale: Account<'info, SaleConfig>,

    #[account(
        init_if_needed,
        payer = buyer,
        space = BuyerAllocation::LEN,
        seeds = [SEED_ALLOCATION, buyer.key().as_ref()],
        bump
    )]
    pub allocation: Account<'info, BuyerAllocation>,

    /// Referrer's ledger; only this program creates accounts of this type.
    #[account(mut)]
    pub referral_ledger: Option<Account<'info, ReferralLedger>>,

    #[account(
        mut,
        constraint = buyer_stable_account.owner == buyer.key() @ SaleError::InvalidTokenAccount,
        constraint = buyer_stable_account.mint == sale.stable_mint @ SaleError::InvalidTokenMint,
    )]
    pub buyer_stable_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = treasury_stable_account.owner == sale.treasury @ SaleError::InvalidTokenAccount,
        constraint = treasury_stable_account.mint == sale.stable_mint @ SaleError::InvalidTokenMint,
    )]
    pub treasury_stable_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}
