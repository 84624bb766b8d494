use anchor_lang::prelude::*;

use crate::constants::{MAX_REFERRAL_RATE_BPS, USD_DECIMALS};
use crate::errors::SaleError;
use crate::math::{mul_div_floor, pow10, rescale};
use crate::oracle::{OracleSource, PriceOracle};
use crate::state::{BuyerAllocation, ClaimGate, ReferralLedger, StageParams, StageSchedule};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentCurrency {
    Gas,
    Stable,
}

/// Runtime configuration supplied once at initialization.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct SaleParams {
    /// Receives gas-currency payments; stable-coin payments go to its token account.
    pub treasury: Pubkey,
    /// Token account pre-approving the sale PDA as delegate for referral payouts.
    pub reserve_token_account: Pubkey,
    pub oracle: OracleSource,
    pub gas_decimals: u8,
    pub sale_start: i64,
    pub stages: Vec<StageParams>,
    pub min_buy_usd: u128,
    pub max_buy_usd: u128,
    pub referral_rate_bps: u16,
    pub sale_supply: u128,
    pub lock_period: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaleMints {
    pub token_mint: Pubkey,
    pub token_decimals: u8,
    pub stable_mint: Pubkey,
    pub stable_decimals: u8,
}

/// Outcome of a settled purchase, used by handlers for events and payment routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Purchase {
    pub buyer: Pubkey,
    pub tokens: u128,
    pub usd_value: u128,
    pub cost: u128,
    pub currency: PaymentCurrency,
    pub stage_index: u8,
    pub price_usd: u128,
    pub referral_bonus: u128,
    /// Stage active before the call; stages after it up to `stage_after` were activated.
    pub stage_before: u8,
    pub stage_after: u8,
}

impl Purchase {
    pub fn stages_advanced(&self) -> u8 {
        self.stage_after - self.stage_before
    }
}

/// Global sale state: configuration, stage schedule, claim gate and running totals.
#[account]
#[derive(Debug)]
pub struct SaleConfig {
    pub admin: Pubkey,
    pub token_mint: Pubkey,
    pub stable_mint: Pubkey,
    pub treasury: Pubkey,
    pub reserve_token_account: Pubkey,
    pub oracle: OracleSource,
    pub token_decimals: u8,
    pub gas_decimals: u8,
    pub stable_decimals: u8,
    pub min_buy_usd: u128,
    pub max_buy_usd: u128,
    pub referral_rate_bps: u16,
    pub sale_supply: u128,
    pub is_active: bool,
    pub schedule: StageSchedule,
    pub gate: ClaimGate,
    pub total_tokens_sold: u128,
    pub total_usd_raised: u128,
    pub total_gas_raised: u128,
    pub total_stable_raised: u128,
    pub bump: u8,
    pub vault_bump: u8,
}

impl SaleConfig {
    pub const LEN: usize = 8 +  // discriminator
        32 * 5 +                 // admin, token_mint, stable_mint, treasury, reserve_token_account
        OracleSource::LEN +
        3 +                      // token, gas and stable decimals
        16 * 2 +                 // min/max buy
        2 +                      // referral_rate_bps
        16 +                     // sale_supply
        1 +                      // is_active
        StageSchedule::LEN +
        ClaimGate::LEN +
        16 * 4 +                 // totals
        1 + 1;                   // bumps

    pub fn new(
        admin: Pubkey,
        mints: SaleMints,
        params: &SaleParams,
        bump: u8,
        vault_bump: u8,
    ) -> Result<Self> {
        validate_bounds(params.min_buy_usd, params.max_buy_usd)?;
        require!(
            params.referral_rate_bps <= MAX_REFERRAL_RATE_BPS,
            SaleError::InvalidReferralRate
        );
        require!(params.sale_supply > 0, SaleError::SupplyExceeded);
        require!(params.lock_period >= 0, SaleError::InvalidStageSchedule);
        params.oracle.validate()?;

        Ok(Self {
            admin,
            token_mint: mints.token_mint,
            stable_mint: mints.stable_mint,
            treasury: params.treasury,
            reserve_token_account: params.reserve_token_account,
            oracle: params.oracle,
            token_decimals: mints.token_decimals,
            gas_decimals: params.gas_decimals,
            stable_decimals: mints.stable_decimals,
            min_buy_usd: params.min_buy_usd,
            max_buy_usd: params.max_buy_usd,
            referral_rate_bps: params.referral_rate_bps,
            sale_supply: params.sale_supply,
            is_active: true,
            schedule: StageSchedule::new(&params.stages, params.sale_start)?,
            gate: ClaimGate::new(params.lock_period),
            total_tokens_sold: 0,
            total_usd_raised: 0,
            total_gas_raised: 0,
            total_stable_raised: 0,
            bump,
            vault_bump,
        })
    }

    pub fn update_bounds(&mut self, min_buy_usd: u128, max_buy_usd: u128) -> Result<()> {
        validate_bounds(min_buy_usd, max_buy_usd)?;
        self.min_buy_usd = min_buy_usd;
        self.max_buy_usd = max_buy_usd;
        Ok(())
    }

    /// USD value (18 decimals) of `gas_amount` base units at the oracle's quote.
    pub fn gas_usd_value(&self, gas_amount: u128, oracle: &impl PriceOracle, now: i64) -> Result<u128> {
        let quote = oracle.latest_price(now)?;
        let unit_price = quote.usd_fixed()?;
        require!(unit_price > 0, SaleError::InvalidOraclePrice);
        mul_div_floor(gas_amount, unit_price, pow10(self.gas_decimals as u32)?)
    }

    /// Stable-coin amounts are taken as USD one-to-one.
    pub fn stable_usd_value(&self, stable_amount: u128) -> Result<u128> {
        rescale(stable_amount, self.stable_decimals as u32, USD_DECIMALS)
    }

    pub fn buy_with_gas_currency(
        &mut self,
        payer: Pubkey,
        allocation: &mut BuyerAllocation,
        referral: Option<&mut ReferralLedger>,
        gas_amount: u128,
        oracle: &impl PriceOracle,
        now: i64,
    ) -> Result<Purchase> {
        require!(self.is_active, SaleError::SaleInactive);
        require!(gas_amount > 0, SaleError::ZeroAmount);
        let usd_value = self.gas_usd_value(gas_amount, oracle, now)?;
        self.settle_purchase(
            payer,
            allocation,
            referral,
            usd_value,
            gas_amount,
            PaymentCurrency::Gas,
            now,
        )
    }

    pub fn buy_with_stable_coin(
        &mut self,
        payer: Pubkey,
        allocation: &mut BuyerAllocation,
        referral: Option<&mut ReferralLedger>,
        stable_amount: u128,
        now: i64,
    ) -> Result<Purchase> {
        require!(self.is_active, SaleError::SaleInactive);
        require!(stable_amount > 0, SaleError::ZeroAmount);
        let usd_value = self.stable_usd_value(stable_amount)?;
        self.settle_purchase(
            payer,
            allocation,
            referral,
            usd_value,
            stable_amount,
            PaymentCurrency::Stable,
            now,
        )
    }

    /// Prices and records a purchase. Everything is computed on copies and committed
    /// only after every check passed, so a rejected purchase changes nothing.
    #[allow(clippy::too_many_arguments)]
    fn settle_purchase(
        &mut self,
        payer: Pubkey,
        allocation: &mut BuyerAllocation,
        referral: Option<&mut ReferralLedger>,
        usd_value: u128,
        cost: u128,
        currency: PaymentCurrency,
        now: i64,
    ) -> Result<Purchase> {
        require!(
            allocation.buyer == Pubkey::default() || allocation.buyer == payer,
            SaleError::Unauthorized
        );

        let mut schedule = self.schedule.clone();
        require!(now >= schedule.sale_start(), SaleError::SaleNotStarted);
        let stage_before = schedule.current;
        schedule.maybe_advance(now)?;

        require!(
            usd_value >= self.min_buy_usd && usd_value <= self.max_buy_usd,
            SaleError::BoundsViolation
        );

        let stage_index = schedule.current;
        let price_usd = schedule.current_price_usd();
        let tokens = mul_div_floor(usd_value, pow10(self.token_decimals as u32)?, price_usd)?;
        require!(tokens > 0, SaleError::ZeroTokens);

        let total_tokens_sold = self
            .total_tokens_sold
            .checked_add(tokens)
            .ok_or(SaleError::MathOverflow)?;
        require!(total_tokens_sold <= self.sale_supply, SaleError::SupplyExceeded);
        let total_usd_raised = self
            .total_usd_raised
            .checked_add(usd_value)
            .ok_or(SaleError::MathOverflow)?;
        let (total_gas_raised, total_stable_raised) = match currency {
            PaymentCurrency::Gas => (
                self.total_gas_raised
                    .checked_add(cost)
                    .ok_or(SaleError::MathOverflow)?,
                self.total_stable_raised,
            ),
            PaymentCurrency::Stable => (
                self.total_gas_raised,
                self.total_stable_raised
                    .checked_add(cost)
                    .ok_or(SaleError::MathOverflow)?,
            ),
        };

        schedule.record_sale(tokens)?;
        schedule.maybe_advance(now)?;

        let mut credited = allocation.credited(tokens, usd_value, now)?;
        credited.buyer = payer;

        // Self-referrals and the null account earn nothing.
        let mut referral_bonus = 0;
        if let Some(ledger) = referral {
            if ledger.referrer != payer && ledger.referrer != Pubkey::default() {
                referral_bonus = ledger.accrue(tokens, self.referral_rate_bps)?;
            }
        }

        let stage_after = schedule.current;
        self.schedule = schedule;
        self.total_tokens_sold = total_tokens_sold;
        self.total_usd_raised = total_usd_raised;
        self.total_gas_raised = total_gas_raised;
        self.total_stable_raised = total_stable_raised;
        *allocation = credited;

        Ok(Purchase {
            buyer: payer,
            tokens,
            usd_value,
            cost,
            currency,
            stage_index,
            price_usd,
            referral_bonus,
            stage_before,
            stage_after,
        })
    }
}

fn validate_bounds(min_buy_usd: u128, max_buy_usd: u128) -> Result<()> {
    require!(
        min_buy_usd > 0 && min_buy_usd <= max_buy_usd,
        SaleError::InvalidPurchaseBounds
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::oracle::{FixedPriceOracle, OracleQuote};

    const START: i64 = 1_700_000_000;
    const STAGE_ONE_PRICE: u128 = 120_000_000_000_000; // $0.00012
    const STAGE_TWO_PRICE: u128 = 150_000_000_000_000; // $0.00015

    struct Offline;

    impl PriceOracle for Offline {
        fn latest_price(&self, _now: i64) -> Result<OracleQuote> {
            err!(SaleError::OracleUnavailable)
        }
    }

    fn bnb_at_600() -> FixedPriceOracle {
        FixedPriceOracle { price: 60_000_000_000, decimals: 8 }
    }

    fn params(stages: Vec<StageParams>) -> SaleParams {
        SaleParams {
            treasury: Pubkey::new_unique(),
            reserve_token_account: Pubkey::new_unique(),
            oracle: OracleSource::Fixed { price: 60_000_000_000, decimals: 8 },
            gas_decimals: 18,
            sale_start: START,
            stages,
            min_buy_usd: DEFAULT_MIN_BUY_USD,
            max_buy_usd: DEFAULT_MAX_BUY_USD,
            referral_rate_bps: DEFAULT_REFERRAL_RATE_BPS,
            sale_supply: 3_500_000_000 * USD_PRECISION,
            lock_period: LOCK_PERIOD_SECONDS,
        }
    }

    fn two_stages() -> Vec<StageParams> {
        vec![
            StageParams { price_usd: STAGE_ONE_PRICE, duration: DEFAULT_STAGE_DURATION, token_cap: 0 },
            StageParams { price_usd: STAGE_TWO_PRICE, duration: DEFAULT_STAGE_DURATION, token_cap: 0 },
        ]
    }

    fn sale_with(stages: Vec<StageParams>) -> SaleConfig {
        let mints = SaleMints {
            token_mint: Pubkey::new_unique(),
            token_decimals: 18,
            stable_mint: Pubkey::new_unique(),
            stable_decimals: 18,
        };
        SaleConfig::new(Pubkey::new_unique(), mints, &params(stages), 255, 254).unwrap()
    }

    fn sale() -> SaleConfig {
        sale_with(two_stages())
    }

    fn referral_for(referrer: Pubkey) -> ReferralLedger {
        ReferralLedger { referrer, ..Default::default() }
    }

    fn error(e: SaleError) -> anchor_lang::error::Error {
        e.into()
    }

    #[test]
    fn one_gas_unit_at_600_buys_five_million() {
        let mut sale = sale();
        let buyer = Pubkey::new_unique();
        let mut allocation = BuyerAllocation::default();

        let purchase = sale
            .buy_with_gas_currency(buyer, &mut allocation, None, USD_PRECISION, &bnb_at_600(), START)
            .unwrap();

        assert_eq!(purchase.tokens, 5_000_000 * USD_PRECISION);
        assert_eq!(purchase.usd_value, 600 * USD_PRECISION);
        assert_eq!(purchase.currency, PaymentCurrency::Gas);
        assert_eq!(allocation.purchased_tokens, 5_000_000 * USD_PRECISION);
        assert_eq!(allocation.buyer, buyer);
        assert_eq!(sale.total_tokens_sold, 5_000_000 * USD_PRECISION);
        assert_eq!(sale.total_gas_raised, USD_PRECISION);
        assert_eq!(sale.total_stable_raised, 0);
    }

    #[test]
    fn hundred_stable_floors_fractional_tokens() {
        let mut sale = sale();
        let mut allocation = BuyerAllocation::default();

        let purchase = sale
            .buy_with_stable_coin(Pubkey::new_unique(), &mut allocation, None, 100 * USD_PRECISION, START)
            .unwrap();

        assert_eq!(purchase.tokens, 833_333_333_333_333_333_333_333);
        assert_eq!(allocation.purchased_tokens, 833_333_333_333_333_333_333_333);
        assert_eq!(sale.total_stable_raised, 100 * USD_PRECISION);
    }

    #[test]
    fn stable_coin_with_six_decimals_is_rescaled() {
        let mints = SaleMints {
            token_mint: Pubkey::new_unique(),
            token_decimals: 18,
            stable_mint: Pubkey::new_unique(),
            stable_decimals: 6,
        };
        let mut sale = SaleConfig::new(Pubkey::new_unique(), mints, &params(two_stages()), 1, 1).unwrap();
        let mut allocation = BuyerAllocation::default();

        let purchase = sale
            .buy_with_stable_coin(Pubkey::new_unique(), &mut allocation, None, 100_000_000, START)
            .unwrap();
        assert_eq!(purchase.usd_value, 100 * USD_PRECISION);
        assert_eq!(purchase.cost, 100_000_000);
    }

    #[test]
    fn referred_purchase_accrues_ten_percent() {
        let mut sale = sale();
        let referrer = Pubkey::new_unique();
        let mut ledger = referral_for(referrer);
        let mut allocation = BuyerAllocation::default();

        let purchase = sale
            .buy_with_gas_currency(
                Pubkey::new_unique(),
                &mut allocation,
                Some(&mut ledger),
                USD_PRECISION,
                &bnb_at_600(),
                START,
            )
            .unwrap();

        assert_eq!(purchase.referral_bonus, 500_000 * USD_PRECISION);
        assert_eq!(ledger.earnings, 500_000 * USD_PRECISION);
    }

    #[test]
    fn self_referral_and_null_referrer_earn_nothing() {
        let mut sale = sale();
        let buyer = Pubkey::new_unique();
        let mut own = referral_for(buyer);
        let mut null = referral_for(Pubkey::default());
        let mut allocation = BuyerAllocation::default();

        let purchase = sale
            .buy_with_stable_coin(buyer, &mut allocation, Some(&mut own), 100 * USD_PRECISION, START)
            .unwrap();
        assert_eq!(purchase.referral_bonus, 0);
        sale.buy_with_stable_coin(buyer, &mut allocation, Some(&mut null), 100 * USD_PRECISION, START)
            .unwrap();

        assert_eq!(own.earnings, 0);
        assert_eq!(null.earnings, 0);
        assert_eq!(allocation.purchase_count, 2);
    }

    #[test]
    fn bounds_are_enforced_in_usd_and_leave_state_untouched() {
        let mut sale = sale();
        let mut allocation = BuyerAllocation::default();
        let buyer = Pubkey::new_unique();
        let late = START + DEFAULT_STAGE_DURATION + 1;

        let too_small = sale.buy_with_stable_coin(buyer, &mut allocation, None, 9 * USD_PRECISION, late);
        assert_eq!(too_small.unwrap_err(), error(SaleError::BoundsViolation));

        let too_large =
            sale.buy_with_stable_coin(buyer, &mut allocation, None, 10_001 * USD_PRECISION, late);
        assert_eq!(too_large.unwrap_err(), error(SaleError::BoundsViolation));

        // The rejected calls did not advance the stage either.
        assert_eq!(sale.schedule.current, 0);
        assert_eq!(sale.total_tokens_sold, 0);
        assert_eq!(allocation.purchase_count, 0);

        // Exact bounds are accepted.
        sale.buy_with_stable_coin(buyer, &mut allocation, None, DEFAULT_MIN_BUY_USD, START)
            .unwrap();
        sale.buy_with_stable_coin(buyer, &mut allocation, None, DEFAULT_MAX_BUY_USD, START)
            .unwrap();
    }

    #[test]
    fn gas_bounds_follow_oracle_price() {
        let mut sale = sale();
        let mut allocation = BuyerAllocation::default();
        let buyer = Pubkey::new_unique();

        // 0.016 gas units at $600 = $9.60, below the $10 minimum.
        let below = sale.buy_with_gas_currency(
            buyer,
            &mut allocation,
            None,
            16 * USD_PRECISION / 1_000,
            &bnb_at_600(),
            START,
        );
        assert_eq!(below.unwrap_err(), error(SaleError::BoundsViolation));

        // 0.017 gas units = $10.20.
        let purchase = sale
            .buy_with_gas_currency(buyer, &mut allocation, None, 17 * USD_PRECISION / 1_000, &bnb_at_600(), START)
            .unwrap();
        assert_eq!(purchase.usd_value, 10_200_000_000_000_000_000);
    }

    #[test]
    fn purchase_uses_price_of_stage_active_at_call_time() {
        let mut sale = sale();
        let buyer = Pubkey::new_unique();
        let mut allocation = BuyerAllocation::default();

        let first = sale
            .buy_with_stable_coin(buyer, &mut allocation, None, 120 * USD_PRECISION, START)
            .unwrap();
        let later = START + 11 * SECONDS_PER_DAY;
        let second = sale
            .buy_with_stable_coin(buyer, &mut allocation, None, 120 * USD_PRECISION, later)
            .unwrap();

        assert_eq!(first.tokens, 1_000_000 * USD_PRECISION);
        assert_eq!(second.tokens, 800_000 * USD_PRECISION);
        assert_eq!(second.stage_before, 0);
        assert_eq!(second.stage_after, 1);
        assert_eq!(second.stages_advanced(), 1);
        assert_eq!(second.price_usd, STAGE_TWO_PRICE);
        assert_eq!(allocation.purchased_tokens, 1_800_000 * USD_PRECISION);
        assert_eq!(sale.schedule.current_stage().start_time, START + DEFAULT_STAGE_DURATION);
    }

    #[test]
    fn filling_a_stage_cap_hands_over_after_the_purchase() {
        let stages = vec![
            StageParams {
                price_usd: STAGE_ONE_PRICE,
                duration: DEFAULT_STAGE_DURATION,
                token_cap: 1_000_000 * USD_PRECISION,
            },
            StageParams { price_usd: STAGE_TWO_PRICE, duration: DEFAULT_STAGE_DURATION, token_cap: 0 },
        ];
        let mut sale = sale_with(stages);
        let mut allocation = BuyerAllocation::default();
        let buyer = Pubkey::new_unique();

        // $120 buys exactly the stage-one cap at the stage-one price.
        let purchase = sale
            .buy_with_stable_coin(buyer, &mut allocation, None, 120 * USD_PRECISION, START + 5)
            .unwrap();
        assert_eq!(purchase.stage_index, 0);
        assert_eq!(purchase.stage_after, 1);
        assert_eq!(sale.schedule.current_stage().start_time, START + 5);
        assert_eq!(sale.schedule.current_price_usd(), STAGE_TWO_PRICE);
    }

    #[test]
    fn rejects_purchases_before_start_while_paused_or_past_supply() {
        let mut sale = sale();
        let mut allocation = BuyerAllocation::default();
        let buyer = Pubkey::new_unique();

        let early = sale.buy_with_stable_coin(buyer, &mut allocation, None, 100 * USD_PRECISION, START - 1);
        assert_eq!(early.unwrap_err(), error(SaleError::SaleNotStarted));

        let zero = sale.buy_with_stable_coin(buyer, &mut allocation, None, 0, START);
        assert_eq!(zero.unwrap_err(), error(SaleError::ZeroAmount));

        sale.is_active = false;
        let paused = sale.buy_with_stable_coin(buyer, &mut allocation, None, 100 * USD_PRECISION, START);
        assert_eq!(paused.unwrap_err(), error(SaleError::SaleInactive));

        sale.is_active = true;
        sale.sale_supply = 1_000 * USD_PRECISION;
        let over = sale.buy_with_stable_coin(buyer, &mut allocation, None, 100 * USD_PRECISION, START);
        assert_eq!(over.unwrap_err(), error(SaleError::SupplyExceeded));
        assert_eq!(allocation.purchased_tokens, 0);
    }

    #[test]
    fn oracle_failure_is_reported_and_nothing_changes() {
        let mut sale = sale();
        let mut allocation = BuyerAllocation::default();
        let referrer = Pubkey::new_unique();
        let mut ledger = referral_for(referrer);

        let result = sale.buy_with_gas_currency(
            Pubkey::new_unique(),
            &mut allocation,
            Some(&mut ledger),
            USD_PRECISION,
            &Offline,
            START,
        );
        assert_eq!(result.unwrap_err(), error(SaleError::OracleUnavailable));
        assert_eq!(ledger.earnings, 0);
        assert_eq!(sale.total_tokens_sold, 0);
    }

    #[test]
    fn allocation_of_another_buyer_is_rejected() {
        let mut sale = sale();
        let mut allocation = BuyerAllocation {
            buyer: Pubkey::new_unique(),
            ..Default::default()
        };
        let result = sale.buy_with_stable_coin(Pubkey::new_unique(), &mut allocation, None, 100 * USD_PRECISION, START);
        assert_eq!(result.unwrap_err(), error(SaleError::Unauthorized));
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let mints = SaleMints {
            token_mint: Pubkey::new_unique(),
            token_decimals: 18,
            stable_mint: Pubkey::new_unique(),
            stable_decimals: 18,
        };
        let mut p = params(two_stages());
        p.min_buy_usd = 0;
        assert_eq!(
            SaleConfig::new(Pubkey::new_unique(), mints, &p, 1, 1).unwrap_err(),
            error(SaleError::InvalidPurchaseBounds)
        );

        let mut p = params(two_stages());
        p.referral_rate_bps = MAX_REFERRAL_RATE_BPS + 1;
        assert_eq!(
            SaleConfig::new(Pubkey::new_unique(), mints, &p, 1, 1).unwrap_err(),
            error(SaleError::InvalidReferralRate)
        );

        let mut s = sale();
        assert!(s.update_bounds(5, 4).is_err());
        s.update_bounds(USD_PRECISION, 2 * USD_PRECISION).unwrap();
        assert_eq!(s.max_buy_usd, 2 * USD_PRECISION);
    }
}
