use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::SaleError;
use crate::events::*;
use crate::state::*;
use crate::transfer::SplTransfer;

pub fn initialize_stake_pool(ctx: Context<InitializeStakePool>) -> Result<()> {
    let pool = &mut ctx.accounts.pool;
    pool.authority = ctx.accounts.authority.key();
    pool.stake_mint = ctx.accounts.stake_mint.key();
    pool.reward_mint = ctx.accounts.reward_mint.key();
    pool.bump = ctx.bumps.pool;
    pool.stake_vault_bump = ctx.bumps.stake_vault;
    pool.reward_vault_bump = ctx.bumps.reward_vault;

    emit!(StakePoolInitialized {
        authority: pool.authority,
        stake_mint: pool.stake_mint,
        reward_mint: pool.reward_mint,
    });
    Ok(())
}

pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
    let position_bump = ctx.bumps.position;
    let accounts = &mut *ctx.accounts;
    let owner = accounts.owner.key();
    if accounts.position.owner == Pubkey::default() {
        accounts.position.owner = owner;
        accounts.position.bump = position_bump;
    }

    let pull = SplTransfer {
        token_program: accounts.token_program.to_account_info(),
        from: accounts.owner_token_account.to_account_info(),
        to: accounts.stake_vault.to_account_info(),
        authority: accounts.owner.to_account_info(),
        signer_seeds: &[],
    };
    accounts
        .pool
        .stake(&mut accounts.position, amount as u128, &pull)?;

    emit!(Staked {
        owner,
        amount: amount as u128,
        principal: accounts.position.principal,
        total_principal: accounts.pool.total_principal,
    });
    Ok(())
}

pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
    let accounts = &mut *ctx.accounts;

    let pool_key = accounts.pool.key();
    let bump = [accounts.pool.stake_vault_bump];
    let seeds: &[&[u8]] = &[SEED_STAKE_VAULT, pool_key.as_ref(), &bump];
    let signer_seeds = &[seeds];
    let payout = SplTransfer {
        token_program: accounts.token_program.to_account_info(),
        from: accounts.stake_vault.to_account_info(),
        to: accounts.owner_token_account.to_account_info(),
        authority: accounts.stake_vault.to_account_info(),
        signer_seeds,
    };
    accounts
        .pool
        .unstake(&mut accounts.position, amount as u128, &payout)?;

    emit!(Unstaked {
        owner: accounts.owner.key(),
        amount: amount as u128,
        principal: accounts.position.principal,
        total_principal: accounts.pool.total_principal,
    });
    Ok(())
}

pub fn claim_reward(ctx: Context<ClaimReward>) -> Result<()> {
    let accounts = &mut *ctx.accounts;

    let pool_key = accounts.pool.key();
    let bump = [accounts.pool.reward_vault_bump];
    let seeds: &[&[u8]] = &[SEED_REWARD_VAULT, pool_key.as_ref(), &bump];
    let signer_seeds = &[seeds];
    let payout = SplTransfer {
        token_program: accounts.token_program.to_account_info(),
        from: accounts.reward_vault.to_account_info(),
        to: accounts.owner_reward_account.to_account_info(),
        authority: accounts.reward_vault.to_account_info(),
        signer_seeds,
    };
    let amount = accounts
        .pool
        .claim_reward(&mut accounts.position, &payout)?;

    emit!(RewardClaimed {
        owner: accounts.owner.key(),
        amount,
    });
    Ok(())
}

/// Distributes `amount` reward tokens pro rata over the current principal.
pub fn deposit_revenue(ctx: Context<DepositRevenue>, amount: u64) -> Result<()> {
    let accounts = &mut *ctx.accounts;
    let funding = SplTransfer {
        token_program: accounts.token_program.to_account_info(),
        from: accounts.authority_reward_account.to_account_info(),
        to: accounts.reward_vault.to_account_info(),
        authority: accounts.authority.to_account_info(),
        signer_seeds: &[],
    };
    accounts.pool.deposit_revenue(amount as u128, &funding)?;

    if accounts.pool.total_principal == 0 {
        msg!("No stake yet, {} carried forward", accounts.pool.unattributed_revenue);
    }
    emit!(RevenueDeposited {
        amount: amount as u128,
        total_principal: accounts.pool.total_principal,
        acc_reward_per_share: accounts.pool.acc_reward_per_share,
        unattributed_revenue: accounts.pool.unattributed_revenue,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct InitializeStakePool<'info> {
    #[account(
        mut,
        constraint = authority.key() == sale.admin @ SaleError::Unauthorized
    )]
    pub authority: Signer<'info>,

    #[account(
        seeds = [SEED_SALE],
        bump = sale.bump,
    )]
    pub sale: Account<'info, SaleConfig>,

    #[account(
        init,
        payer = authority,
        space = StakePool::LEN,
        seeds = [SEED_STAKE_POOL],
        bump
    )]
    pub pool: Account<'info, StakePool>,

    #[account(
        constraint = stake_mint.key() == sale.token_mint @ SaleError::InvalidTokenMint
    )]
    pub stake_mint: Account<'info, Mint>,

    pub reward_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        seeds = [SEED_STAKE_VAULT, pool.key().as_ref()],
        bump,
        token::mint = stake_mint,
        token::authority = stake_vault,
    )]
    pub stake_vault: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = authority,
        seeds = [SEED_REWARD_VAULT, pool.key().as_ref()],
        bump,
        token::mint = reward_mint,
        token::authority = reward_vault,
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct Stake<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [SEED_STAKE_POOL],
        bump = pool.bump,
    )]
    pub pool: Account<'info, StakePool>,

    #[account(
        init_if_needed,
        payer = owner,
        space = StakePosition::LEN,
        seeds = [SEED_STAKE_POSITION, owner.key().as_ref()],
        bump
    )]
    pub position: Account<'info, StakePosition>,

    #[account(
        mut,
        constraint = owner_token_account.owner == owner.key() @ SaleError::InvalidTokenAccount,
        constraint = owner_token_account.mint == pool.stake_mint @ SaleError::InvalidTokenMint,
    )]
    pub owner_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [SEED_STAKE_VAULT, pool.key().as_ref()],
        bump = pool.stake_vault_bump,
    )]
    pub stake_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Unstake<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [SEED_STAKE_POOL],
        bump = pool.bump,
    )]
    pub pool: Account<'info, StakePool>,

    #[account(
        mut,
        seeds = [SEED_STAKE_POSITION, owner.key().as_ref()],
        bump = position.bump,
        constraint = position.owner == owner.key() @ SaleError::Unauthorized,
    )]
    pub position: Account<'info, StakePosition>,

    #[account(
        mut,
        constraint = owner_token_account.owner == owner.key() @ SaleError::InvalidTokenAccount,
        constraint = owner_token_account.mint == pool.stake_mint @ SaleError::InvalidTokenMint,
    )]
    pub owner_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [SEED_STAKE_VAULT, pool.key().as_ref()],
        bump = pool.stake_vault_bump,
    )]
    pub stake_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct ClaimReward<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [SEED_STAKE_POOL],
        bump = pool.bump,
    )]
    pub pool: Account<'info, StakePool>,

    #[account(
        mut,
        seeds = [SEED_STAKE_POSITION, owner.key().as_ref()],
        bump = position.bump,
        constraint = position.owner == owner.key() @ SaleError::Unauthorized,
    )]
    pub position: Account<'info, StakePosition>,

    #[account(
        mut,
        constraint = owner_reward_account.owner == owner.key() @ SaleError::InvalidTokenAccount,
        constraint = owner_reward_account.mint == pool.reward_mint @ SaleError::InvalidTokenMint,
    )]
    pub owner_reward_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [SEED_REWARD_VAULT, pool.key().as_ref()],
        bump = pool.reward_vault_bump,
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct DepositRevenue<'info> {
    #[account(
        constraint = authority.key() == pool.authority @ SaleError::Unauthorized
    )]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [SEED_STAKE_POOL],
        bump = pool.bump,
    )]
    pub pool: Account<'info, StakePool>,

    #[account(
        mut,
        constraint = authority_reward_account.owner == authority.key() @ SaleError::InvalidTokenAccount,
        constraint = authority_reward_account.mint == pool.reward_mint @ SaleError::InvalidTokenMint,
    )]
    pub authority_reward_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [SEED_REWARD_VAULT, pool.key().as_ref()],
        bump = pool.reward_vault_bump,
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}
