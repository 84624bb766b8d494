use anchor_lang::prelude::*;

use crate::constants::MAX_STAGES;
use crate::errors::SaleError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stage {
    pub index: u8,
    /// USD per whole token, 18-decimal fixed point.
    pub price_usd: u128,
    /// Set when the stage becomes active; the first stage's value is the sale start.
    pub start_time: i64,
    pub duration: i64,
    /// Tokens this stage may sell before handing over. Zero means time-bound only.
    pub token_cap: u128,
    pub sold: u128,
}

impl Stage {
    // index(1) + price_usd(16) + start_time(8) + duration(8) + token_cap(16) + sold(16)
    pub const LEN: usize = 1 + 16 + 8 + 8 + 16 + 16;

    pub fn end_time(&self) -> Result<i64> {
        self.start_time
            .checked_add(self.duration)
            .ok_or(error!(SaleError::MathOverflow))
    }

    fn cap_filled(&self) -> bool {
        self.token_cap > 0 && self.sold >= self.token_cap
    }
}

/// Admin-supplied stage definition; start times are assigned by the schedule.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageParams {
    pub price_usd: u128,
    pub duration: i64,
    pub token_cap: u128,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct StageSchedule {
    pub stages: Vec<Stage>,
    pub current: u8,
}

impl StageSchedule {
    // vec length prefix(4) + stages + current(1)
    pub const LEN: usize = 4 + MAX_STAGES * Stage::LEN + 1;

    pub fn new(params: &[StageParams], sale_start: i64) -> Result<Self> {
        require!(
            !params.is_empty() && params.len() <= MAX_STAGES,
            SaleError::InvalidStageSchedule
        );

        let mut stages = Vec::with_capacity(params.len());
        let mut previous_price = 0u128;
        for (index, p) in params.iter().enumerate() {
            require!(p.price_usd > 0, SaleError::InvalidStageSchedule);
            require!(p.duration > 0, SaleError::InvalidStageSchedule);
            // Prices never decrease across stages.
            require!(p.price_usd >= previous_price, SaleError::InvalidStageSchedule);
            previous_price = p.price_usd;

            stages.push(Stage {
                index: index as u8,
                price_usd: p.price_usd,
                start_time: if index == 0 { sale_start } else { 0 },
                duration: p.duration,
                token_cap: p.token_cap,
                sold: 0,
            });
        }

        Ok(Self { stages, current: 0 })
    }

    pub fn current_stage(&self) -> &Stage {
        &self.stages[self.current as usize]
    }

    pub fn current_price_usd(&self) -> u128 {
        self.current_stage().price_usd
    }

    pub fn sale_start(&self) -> i64 {
        self.stages[0].start_time
    }

    pub fn is_final_stage(&self) -> bool {
        self.current as usize + 1 >= self.stages.len()
    }

    /// Moves the current pointer past every stage that has expired or filled its cap
    /// as of `now`, returning how many stages were activated.
    ///
    /// An expired stage hands over at its own end time, so a gap spanning several
    /// durations is caught up in one call. A cap-filled stage hands over at `now`.
    /// The final stage stays active regardless of elapsed time.
    pub fn maybe_advance(&mut self, now: i64) -> Result<u8> {
        let mut advanced = 0u8;

        while !self.is_final_stage() {
            let stage = self.current_stage();
            let end = stage.end_time()?;
            let handover = if now >= end {
                end
            } else if stage.cap_filled() {
                now
            } else {
                break;
            };

            self.current += 1;
            self.stages[self.current as usize].start_time = handover;
            advanced += 1;
        }

        Ok(advanced)
    }

    pub fn record_sale(&mut self, tokens: u128) -> Result<()> {
        let stage = &mut self.stages[self.current as usize];
        stage.sold = stage
            .sold
            .checked_add(tokens)
            .ok_or(SaleError::MathOverflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_STAGE_DURATION, SECONDS_PER_DAY, USD_PRECISION};

    const START: i64 = 1_700_000_000;

    fn price(micro_cents: u128) -> u128 {
        // 0.00012 USD == 12 * 10^-5
        micro_cents * USD_PRECISION / 100_000
    }

    fn schedule(caps: &[u128]) -> StageSchedule {
        let params: Vec<StageParams> = caps
            .iter()
            .enumerate()
            .map(|(i, cap)| StageParams {
                price_usd: price(12 + i as u128),
                duration: DEFAULT_STAGE_DURATION,
                token_cap: *cap,
            })
            .collect();
        StageSchedule::new(&params, START).unwrap()
    }

    #[test]
    fn first_stage_starts_at_sale_start() {
        let s = schedule(&[0, 0, 0]);
        assert_eq!(s.current, 0);
        assert_eq!(s.sale_start(), START);
        assert_eq!(s.current_price_usd(), 120_000_000_000_000);
    }

    #[test]
    fn rejects_decreasing_prices() {
        let params = [
            StageParams { price_usd: 2, duration: 1, token_cap: 0 },
            StageParams { price_usd: 1, duration: 1, token_cap: 0 },
        ];
        let expected: anchor_lang::error::Error = SaleError::InvalidStageSchedule.into();
        assert_eq!(StageSchedule::new(&params, START).unwrap_err(), expected);
    }

    #[test]
    fn rejects_empty_zero_duration_and_oversized_schedules() {
        assert!(StageSchedule::new(&[], START).is_err());
        assert!(StageSchedule::new(
            &[StageParams { price_usd: 1, duration: 0, token_cap: 0 }],
            START
        )
        .is_err());
        let too_many = vec![StageParams { price_usd: 1, duration: 1, token_cap: 0 }; MAX_STAGES + 1];
        assert!(StageSchedule::new(&too_many, START).is_err());
    }

    #[test]
    fn does_not_advance_before_boundary() {
        let mut s = schedule(&[0, 0]);
        assert_eq!(s.maybe_advance(START + DEFAULT_STAGE_DURATION - 1).unwrap(), 0);
        assert_eq!(s.current, 0);
    }

    #[test]
    fn advances_at_boundary_and_is_idempotent() {
        let mut s = schedule(&[0, 0, 0]);
        let now = START + 11 * SECONDS_PER_DAY;
        assert_eq!(s.maybe_advance(now).unwrap(), 1);
        assert_eq!(s.current, 1);
        assert_eq!(s.current_stage().start_time, START + DEFAULT_STAGE_DURATION);
        assert_eq!(s.maybe_advance(now).unwrap(), 0);
        assert_eq!(s.current, 1);
    }

    #[test]
    fn catches_up_several_elapsed_stages() {
        let mut s = schedule(&[0, 0, 0, 0]);
        let now = START + 3 * DEFAULT_STAGE_DURATION + 5;
        assert_eq!(s.maybe_advance(now).unwrap(), 3);
        assert_eq!(s.current, 3);
        assert_eq!(s.current_stage().start_time, START + 3 * DEFAULT_STAGE_DURATION);
    }

    #[test]
    fn final_stage_never_advances() {
        let mut s = schedule(&[0, 0]);
        s.maybe_advance(START + 100 * DEFAULT_STAGE_DURATION).unwrap();
        assert_eq!(s.current, 1);
        assert!(s.is_final_stage());
        assert_eq!(s.maybe_advance(i64::MAX / 2).unwrap(), 0);
        assert_eq!(s.current, 1);
    }

    #[test]
    fn cap_filled_stage_hands_over_now() {
        let mut s = schedule(&[1_000, 0]);
        s.record_sale(1_000).unwrap();
        let now = START + 60;
        assert_eq!(s.maybe_advance(now).unwrap(), 1);
        assert_eq!(s.current_stage().start_time, now);
        assert_eq!(s.stages[0].sold, 1_000);
    }

    #[test]
    fn index_and_price_are_monotonic_over_time() {
        let mut s = schedule(&[0, 0, 0, 0, 0]);
        let mut last_index = s.current;
        let mut last_price = s.current_price_usd();
        for day in 0..80 {
            s.maybe_advance(START + day * SECONDS_PER_DAY).unwrap();
            assert!(s.current >= last_index);
            assert!(s.current_price_usd() >= last_price);
            last_index = s.current;
            last_price = s.current_price_usd();
        }
        assert_eq!(s.current, 4);
    }
}
