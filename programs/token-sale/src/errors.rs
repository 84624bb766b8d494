use anchor_lang::prelude::*;

#[error_code]
pub enum SaleError {
    #[msg("Purchase value is outside the allowed USD bounds")]
    BoundsViolation,
    #[msg("Nothing to claim")]
    NothingToClaim,
    #[msg("Nothing vested yet")]
    NothingVested,
    #[msg("Unstake amount exceeds staked principal")]
    InsufficientPrincipal,
    #[msg("Oracle price is stale")]
    StalePrice,
    #[msg("Oracle price feed is unavailable")]
    OracleUnavailable,
    #[msg("Oracle returned a non-positive price")]
    InvalidOraclePrice,
    #[msg("Claiming is not open yet")]
    GateClosed,
    #[msg("Token transfer failed")]
    TransferFailed,
    #[msg("Sale is not active")]
    SaleInactive,
    #[msg("Sale has not started")]
    SaleNotStarted,
    #[msg("Sale supply exceeded")]
    SupplyExceeded,
    #[msg("Amount must be greater than zero")]
    ZeroAmount,
    #[msg("Payment is too small to buy any tokens")]
    ZeroTokens,
    #[msg("Arithmetic overflow")]
    MathOverflow,
    #[msg("Stage schedule is invalid")]
    InvalidStageSchedule,
    #[msg("Minimum purchase must be positive and not exceed the maximum")]
    InvalidPurchaseBounds,
    #[msg("Referral rate is too high")]
    InvalidReferralRate,
    #[msg("Vesting schedule is invalid")]
    InvalidVestingSchedule,
    #[msg("Launch time is already set")]
    LaunchTimeAlreadySet,
    #[msg("Launch time cannot be in the past")]
    LaunchTimeInPast,
    #[msg("Referral ledger does not belong to the referrer")]
    InvalidReferralLedger,
    #[msg("Invalid token account")]
    InvalidTokenAccount,
    #[msg("Invalid token mint")]
    InvalidTokenMint,
    #[msg("Oracle account does not match the configured feed")]
    InvalidOracleAccount,
    #[msg("Unauthorized - admin only")]
    Unauthorized,
}
