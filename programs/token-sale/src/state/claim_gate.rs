use anchor_lang::prelude::*;

use crate::errors::SaleError;

/// Guards referral payouts and purchased-token claims.
///
/// Claims open once the operator has enabled claiming, the launch time is fixed, and
/// `lock_period` seconds have passed since launch. Enabling is one-way and the launch
/// time can be set exactly once, never backdated.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClaimGate {
    pub claiming_enabled: bool,
    pub launch_time: Option<i64>,
    pub lock_period: i64,
}

impl ClaimGate {
    // claiming_enabled(1) + launch_time(1 + 8) + lock_period(8)
    pub const LEN: usize = 1 + 9 + 8;

    pub fn new(lock_period: i64) -> Self {
        Self {
            claiming_enabled: false,
            launch_time: None,
            lock_period,
        }
    }

    /// Returns whether the call changed anything.
    pub fn enable(&mut self) -> bool {
        if self.claiming_enabled {
            return false;
        }
        self.claiming_enabled = true;
        true
    }

    pub fn set_launch_time(&mut self, launch_time: i64, now: i64) -> Result<()> {
        require!(self.launch_time.is_none(), SaleError::LaunchTimeAlreadySet);
        require!(launch_time >= now, SaleError::LaunchTimeInPast);
        self.launch_time = Some(launch_time);
        Ok(())
    }

    pub fn unlock_time(&self) -> Option<i64> {
        self.launch_time
            .and_then(|launch| launch.checked_add(self.lock_period))
    }

    pub fn can_claim(&self, now: i64) -> bool {
        self.claiming_enabled && self.unlock_time().map_or(false, |unlock| now >= unlock)
    }

    pub fn ensure_open(&self, now: i64) -> Result<()> {
        require!(self.can_claim(now), SaleError::GateClosed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LOCK_PERIOD_SECONDS;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn closed_until_enabled_and_launched() {
        let mut gate = ClaimGate::new(LOCK_PERIOD_SECONDS);
        assert!(!gate.can_claim(NOW));

        gate.set_launch_time(NOW, NOW).unwrap();
        assert!(!gate.can_claim(NOW + LOCK_PERIOD_SECONDS));

        assert!(gate.enable());
        assert!(!gate.can_claim(NOW + LOCK_PERIOD_SECONDS - 1));
        assert!(gate.can_claim(NOW + LOCK_PERIOD_SECONDS));
    }

    #[test]
    fn enabled_without_launch_time_stays_closed() {
        let mut gate = ClaimGate::new(LOCK_PERIOD_SECONDS);
        gate.enable();
        assert!(!gate.can_claim(i64::MAX));
        let expected: anchor_lang::error::Error = SaleError::GateClosed.into();
        assert_eq!(gate.ensure_open(NOW).unwrap_err(), expected);
    }

    #[test]
    fn enable_twice_is_a_no_op() {
        let mut gate = ClaimGate::new(LOCK_PERIOD_SECONDS);
        assert!(gate.enable());
        assert!(!gate.enable());
        assert!(gate.claiming_enabled);
    }

    #[test]
    fn launch_time_is_set_once_and_not_backdated() {
        let mut gate = ClaimGate::new(LOCK_PERIOD_SECONDS);
        let past: anchor_lang::error::Error = SaleError::LaunchTimeInPast.into();
        assert_eq!(gate.set_launch_time(NOW - 31 * 86_400, NOW).unwrap_err(), past);

        gate.set_launch_time(NOW + 60, NOW).unwrap();
        let again: anchor_lang::error::Error = SaleError::LaunchTimeAlreadySet.into();
        assert_eq!(gate.set_launch_time(NOW + 120, NOW).unwrap_err(), again);
        assert_eq!(gate.launch_time, Some(NOW + 60));
    }
}
