//! Gas-currency USD price sources.
//!
//! Purchases only need a quote `(price, decimals, updated_at)`; where it comes from is
//! decided by the sale's [`OracleSource`]. Mainnet deployments read a Pyth feed, local
//! deployments use an admin-configured fixed quote.

use anchor_lang::prelude::*;
use pyth_sdk_solana::state::SolanaPriceAccount;
use pyth_sdk_solana::PriceFeed;

use crate::errors::SaleError;
use crate::math::{pow10, to_usd_fixed};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OracleQuote {
    pub price: u128,
    pub decimals: u32,
    pub updated_at: i64,
}

impl OracleQuote {
    /// Price of one whole gas-currency unit in 18-decimal USD.
    pub fn usd_fixed(&self) -> Result<u128> {
        to_usd_fixed(self.price, self.decimals)
    }
}

pub trait PriceOracle {
    fn latest_price(&self, now: i64) -> Result<OracleQuote>;
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OracleSource {
    Pyth { feed: Pubkey, max_age: u64 },
    Fixed { price: u64, decimals: u8 },
}

impl OracleSource {
    // tag(1) + largest variant: feed(32) + max_age(8)
    pub const LEN: usize = 1 + 32 + 8;

    pub fn validate(&self) -> Result<()> {
        match self {
            OracleSource::Pyth { feed, max_age } => {
                require!(*feed != Pubkey::default(), SaleError::InvalidOracleAccount);
                require!(*max_age > 0, SaleError::StalePrice);
            }
            OracleSource::Fixed { price, .. } => {
                require!(*price > 0, SaleError::InvalidOraclePrice);
            }
        }
        Ok(())
    }

    /// Binds the configured source to the feed account passed with the instruction.
    pub fn resolve<'a, 'info>(
        &self,
        feed_account: Option<&'a AccountInfo<'info>>,
    ) -> Result<SaleOracle<'a, 'info>> {
        match *self {
            OracleSource::Pyth { feed, max_age } => {
                let account = feed_account.ok_or(SaleError::OracleUnavailable)?;
                require_keys_eq!(account.key(), feed, SaleError::InvalidOracleAccount);
                Ok(SaleOracle::Pyth(PythPriceFeed { account, max_age }))
            }
            OracleSource::Fixed { price, decimals } => {
                Ok(SaleOracle::Fixed(FixedPriceOracle { price, decimals }))
            }
        }
    }
}

pub enum SaleOracle<'a, 'info> {
    Pyth(PythPriceFeed<'a, 'info>),
    Fixed(FixedPriceOracle),
}

impl<'a, 'info> PriceOracle for SaleOracle<'a, 'info> {
    fn latest_price(&self, now: i64) -> Result<OracleQuote> {
        match self {
            SaleOracle::Pyth(feed) => feed.latest_price(now),
            SaleOracle::Fixed(fixed) => fixed.latest_price(now),
        }
    }
}

pub struct FixedPriceOracle {
    pub price: u64,
    pub decimals: u8,
}

impl PriceOracle for FixedPriceOracle {
    fn latest_price(&self, now: i64) -> Result<OracleQuote> {
        require!(self.price > 0, SaleError::InvalidOraclePrice);
        Ok(OracleQuote {
            price: self.price as u128,
            decimals: self.decimals as u32,
            updated_at: now,
        })
    }
}

pub struct PythPriceFeed<'a, 'info> {
    pub account: &'a AccountInfo<'info>,
    pub max_age: u64,
}

impl<'a, 'info> PriceOracle for PythPriceFeed<'a, 'info> {
    fn latest_price(&self, now: i64) -> Result<OracleQuote> {
        let feed = SolanaPriceAccount::account_info_to_feed(self.account)
            .map_err(|_| error!(SaleError::OracleUnavailable))?;
        quote_from_feed(&feed, now, self.max_age)
    }
}

/// Reads the feed's current price, rejecting quotes older than `max_age` seconds.
pub fn quote_from_feed(feed: &PriceFeed, now: i64, max_age: u64) -> Result<OracleQuote> {
    let price = feed
        .get_price_no_older_than(now, max_age)
        .ok_or(SaleError::StalePrice)?;
    require!(price.price > 0, SaleError::InvalidOraclePrice);

    // Pyth quotes carry a negative exponent; a non-negative one is folded into the price.
    let (value, decimals) = if price.expo >= 0 {
        let scaled = (price.price as u128)
            .checked_mul(pow10(price.expo as u32)?)
            .ok_or(SaleError::MathOverflow)?;
        (scaled, 0)
    } else {
        (price.price as u128, price.expo.unsigned_abs())
    };

    Ok(OracleQuote {
        price: value,
        decimals,
        updated_at: price.publish_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::USD_PRECISION;
    use pyth_sdk_solana::{Price, PriceIdentifier};

    #[test]
    fn fixed_quote_is_fresh_at_request_time() {
        let oracle = FixedPriceOracle { price: 60_000_000_000, decimals: 8 };
        let quote = oracle.latest_price(1_700_000_000).unwrap();
        assert_eq!(quote.updated_at, 1_700_000_000);
        assert_eq!(quote.usd_fixed().unwrap(), 600 * USD_PRECISION);
    }

    #[test]
    fn fixed_quote_rejects_zero_price() {
        let oracle = FixedPriceOracle { price: 0, decimals: 8 };
        let expected: anchor_lang::error::Error = SaleError::InvalidOraclePrice.into();
        assert_eq!(oracle.latest_price(0).unwrap_err(), expected);
    }

    const NOW: i64 = 1_700_000_000;

    fn feed(price: i64, expo: i32, publish_time: i64) -> PriceFeed {
        let quote = Price { price, conf: 0, expo, publish_time };
        PriceFeed::new(PriceIdentifier::new([7; 32]), quote, quote)
    }

    #[test]
    fn pyth_negative_exponent_becomes_decimals() {
        let quote = quote_from_feed(&feed(60_000_000_000, -8, NOW - 5), NOW, 60).unwrap();
        assert_eq!(quote.price, 60_000_000_000);
        assert_eq!(quote.decimals, 8);
        assert_eq!(quote.updated_at, NOW - 5);
        assert_eq!(quote.usd_fixed().unwrap(), 600 * USD_PRECISION);
    }

    #[test]
    fn pyth_non_negative_exponent_is_folded_into_price() {
        let quote = quote_from_feed(&feed(6, 2, NOW), NOW, 60).unwrap();
        assert_eq!(quote.price, 600);
        assert_eq!(quote.decimals, 0);
        assert_eq!(quote.usd_fixed().unwrap(), 600 * USD_PRECISION);

        let overflow: anchor_lang::error::Error = SaleError::MathOverflow.into();
        assert_eq!(quote_from_feed(&feed(6, 40, NOW), NOW, 60).unwrap_err(), overflow);
    }

    #[test]
    fn pyth_quote_older_than_max_age_is_stale() {
        let stale: anchor_lang::error::Error = SaleError::StalePrice.into();
        assert_eq!(
            quote_from_feed(&feed(60_000_000_000, -8, NOW - 61), NOW, 60).unwrap_err(),
            stale
        );
        assert!(quote_from_feed(&feed(60_000_000_000, -8, NOW - 60), NOW, 60).is_ok());
    }

    #[test]
    fn pyth_non_positive_price_is_rejected() {
        let invalid: anchor_lang::error::Error = SaleError::InvalidOraclePrice.into();
        assert_eq!(quote_from_feed(&feed(0, -8, NOW), NOW, 60).unwrap_err(), invalid);
        assert_eq!(quote_from_feed(&feed(-5, -8, NOW), NOW, 60).unwrap_err(), invalid);
    }

    #[test]
    fn fixed_source_resolves_without_feed_account() {
        let source = OracleSource::Fixed { price: 60_000_000_000, decimals: 8 };
        let oracle = source.resolve(None).unwrap();
        assert_eq!(oracle.latest_price(5).unwrap().usd_fixed().unwrap(), 600 * USD_PRECISION);
    }

    #[test]
    fn pyth_source_requires_feed_account() {
        let source = OracleSource::Pyth { feed: Pubkey::new_unique(), max_age: 60 };
        let expected: anchor_lang::error::Error = SaleError::OracleUnavailable.into();
        assert_eq!(source.resolve(None).err().unwrap(), expected);
    }

    #[test]
    fn source_validation() {
        assert!(OracleSource::Fixed { price: 1, decimals: 8 }.validate().is_ok());
        assert!(OracleSource::Pyth { feed: Pubkey::default(), max_age: 60 }
            .validate()
            .is_err());
        assert!(OracleSource::Pyth { feed: Pubkey::new_unique(), max_age: 60 }
            .validate()
            .is_ok());
    }
}
