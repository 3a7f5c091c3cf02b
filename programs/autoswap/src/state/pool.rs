//! Pool ledger: reserves, LP supply, fee rate and time-weighted price
//! accumulators for one token pair.
//!
//! The pair key is canonical: `token_mint_0 < token_mint_1` by byte order,
//! enforced at creation, so one pair can never have two pools. Cumulative
//! price accumulators advance by `elapsed * price` before any reserve
//! mutation, and a small ring of accumulator snapshots answers windowed
//! TWAP queries.

use anchor_lang::prelude::*;
use ethnum::U256;

use crate::constants::{MIN_OBSERVATION_INTERVAL, OBSERVATION_COUNT};
use crate::error::ErrorCode;
use crate::utils::math::spot_price;
use crate::utils::SafeMath;

/// One snapshot of the cumulative price accumulators.
#[derive(
    AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, Default, PartialEq, Eq,
)]
pub struct Observation {
    pub timestamp: i64,
    pub cumulative_price_0: u128,
    pub cumulative_price_1: u128,
}

#[account]
#[derive(InitSpace)]
pub struct Pool {
    pub token_mint_0: Pubkey,
    pub token_mint_1: Pubkey,
    pub vault_0: Pubkey,
    pub vault_1: Pubkey,
    pub lp_mint: Pubkey,

    pub reserve_0: u64,
    pub reserve_1: u64,
    /// Includes the permanently locked MIN_LIQUIDITY.
    pub total_lp_supply: u64,
    pub fee_bps: u16,
    pub is_active: bool,

    /// Timestamp of the last accumulator advance.
    pub last_update_time: i64,
    /// Seconds-weighted sum of the price of token 0 in token 1.
    pub cumulative_price_0: u128,
    /// Seconds-weighted sum of the price of token 1 in token 0.
    pub cumulative_price_1: u128,

    pub observations: [Observation; OBSERVATION_COUNT],
    pub observation_index: u8,
    pub observation_count: u8,

    pub bump: u8,
    pub authority_bump: u8,
}

impl Pool {
    /// Price of token 0 denominated in token 1.
    pub fn spot_price_0(&self) -> Result<u128> {
        spot_price(self.reserve_0, self.reserve_1)
    }

    /// Price of token 1 denominated in token 0.
    pub fn spot_price_1(&self) -> Result<u128> {
        spot_price(self.reserve_1, self.reserve_0)
    }

    /// Spot price of the given input side, in units of the output token.
    pub fn spot_price_for(&self, input_is_0: bool) -> Result<u128> {
        if input_is_0 {
            self.spot_price_0()
        } else {
            self.spot_price_1()
        }
    }

    /// Whether `mint` is token 0 of this pool; errors for foreign mints.
    pub fn input_is_0(&self, mint: &Pubkey) -> Result<bool> {
        if *mint == self.token_mint_0 {
            Ok(true)
        } else if *mint == self.token_mint_1 {
            Ok(false)
        } else {
            Err(ErrorCode::TokenNotInPool.into())
        }
    }

    pub fn reserves_for(&self, input_is_0: bool) -> (u64, u64) {
        if input_is_0 {
            (self.reserve_0, self.reserve_1)
        } else {
            (self.reserve_1, self.reserve_0)
        }
    }

    /// Advance both accumulators by `elapsed * price`. Must run before every
    /// reserve mutation so the pre-trade price is weighted by its lifetime.
    pub fn advance_accumulators(&mut self, now: i64) -> Result<()> {
        require!(now >= self.last_update_time, ErrorCode::InvalidTimestamp);
        if now == self.last_update_time || self.reserve_0 == 0 || self.reserve_1 == 0 {
            self.last_update_time = now;
            return Ok(());
        }
        let elapsed = u128::try_from(now - self.last_update_time)
            .map_err(|_| error!(ErrorCode::InvalidTimestamp))?;
        self.cumulative_price_0 = self
            .cumulative_price_0
            .safe_add(self.spot_price_0()?.safe_mul(elapsed)?)?;
        self.cumulative_price_1 = self
            .cumulative_price_1
            .safe_add(self.spot_price_1()?.safe_mul(elapsed)?)?;
        self.last_update_time = now;
        Ok(())
    }

    /// Record an accumulator snapshot, at most once per
    /// [`MIN_OBSERVATION_INTERVAL`]. Call after `advance_accumulators`.
    pub fn record_observation(&mut self, now: i64) {
        if self.observation_count > 0 {
            let newest = self.newest_observation();
            if now - newest.timestamp < MIN_OBSERVATION_INTERVAL {
                return;
            }
        }
        self.observations[self.observation_index as usize] = Observation {
            timestamp: now,
            cumulative_price_0: self.cumulative_price_0,
            cumulative_price_1: self.cumulative_price_1,
        };
        self.observation_index = ((self.observation_index as usize + 1) % OBSERVATION_COUNT) as u8;
        if (self.observation_count as usize) < OBSERVATION_COUNT {
            self.observation_count += 1;
        }
    }

    fn newest_observation(&self) -> &Observation {
        let idx = if self.observation_index == 0 {
            OBSERVATION_COUNT - 1
        } else {
            self.observation_index as usize - 1
        };
        &self.observations[idx]
    }

    /// Valid observations, oldest first.
    fn observations_in_order(&self) -> impl Iterator<Item = &Observation> {
        let count = self.observation_count as usize;
        let start = if count < OBSERVATION_COUNT {
            0
        } else {
            self.observation_index as usize
        };
        (0..count).map(move |i| &self.observations[(start + i) % OBSERVATION_COUNT])
    }

    /// Accumulator values extrapolated to `now` without mutating the pool.
    fn cumulative_at(&self, now: i64) -> Result<(u128, u128)> {
        require!(now >= self.last_update_time, ErrorCode::InvalidTimestamp);
        if now == self.last_update_time || self.reserve_0 == 0 || self.reserve_1 == 0 {
            return Ok((self.cumulative_price_0, self.cumulative_price_1));
        }
        let elapsed = (now - self.last_update_time) as u128;
        Ok((
            self.cumulative_price_0
                .safe_add(self.spot_price_0()?.safe_mul(elapsed)?)?,
            self.cumulative_price_1
                .safe_add(self.spot_price_1()?.safe_mul(elapsed)?)?,
        ))
    }

    /// Time-weighted average price over the trailing `window`, for the
    /// given input side. Falls back to the oldest recorded snapshot when the
    /// ring does not yet cover the full window; errors when no usable
    /// snapshot exists.
    pub fn twap_price_for(&self, input_is_0: bool, window: i64, now: i64) -> Result<u128> {
        require!(window > 0, ErrorCode::InvalidTimestamp);
        require!(self.observation_count > 0, ErrorCode::InsufficientOracleData);

        let window_start = now.safe_sub(window)?;
        // Newest snapshot at or before the window start, else the oldest one.
        let mut anchor: Option<&Observation> = None;
        for obs in self.observations_in_order() {
            if obs.timestamp <= window_start {
                anchor = Some(obs);
            } else {
                break;
            }
        }
        let anchor = match anchor {
            Some(obs) => obs,
            None => self
                .observations_in_order()
                .next()
                .ok_or(ErrorCode::InsufficientOracleData)?,
        };
        require!(anchor.timestamp < now, ErrorCode::InsufficientOracleData);

        let (cum_0, cum_1) = self.cumulative_at(now)?;
        let elapsed = (now - anchor.timestamp) as u128;
        if input_is_0 {
            cum_0.safe_sub(anchor.cumulative_price_0)?.safe_div(elapsed)
        } else {
            cum_1.safe_sub(anchor.cumulative_price_1)?.safe_div(elapsed)
        }
    }

    /// Apply a swap's reserve deltas and re-verify that the constant product
    /// did not decrease.
    pub fn apply_swap(&mut self, amount_in: u64, amount_out: u64, input_is_0: bool) -> Result<()> {
        let k_before = U256::from(self.reserve_0) * U256::from(self.reserve_1);

        if input_is_0 {
            self.reserve_0 = self.reserve_0.safe_add(amount_in)?;
            self.reserve_1 = self.reserve_1.safe_sub(amount_out)?;
        } else {
            self.reserve_1 = self.reserve_1.safe_add(amount_in)?;
            self.reserve_0 = self.reserve_0.safe_sub(amount_out)?;
        }

        let k_after = U256::from(self.reserve_0) * U256::from(self.reserve_1);
        require!(k_after >= k_before, ErrorCode::InvariantViolated);
        Ok(())
    }
}

/// Pool keys are canonical: the lexicographically smaller mint is token 0.
pub fn require_canonical_pair(mint_0: &Pubkey, mint_1: &Pubkey) -> Result<()> {
    require!(mint_0 != mint_1, ErrorCode::IdenticalTokens);
    require!(mint_0 < mint_1, ErrorCode::NonCanonicalPair);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRICE_SCALE;

    fn test_pool(reserve_0: u64, reserve_1: u64) -> Pool {
        Pool {
            token_mint_0: Pubkey::new_unique(),
            token_mint_1: Pubkey::new_unique(),
            vault_0: Pubkey::new_unique(),
            vault_1: Pubkey::new_unique(),
            lp_mint: Pubkey::new_unique(),
            reserve_0,
            reserve_1,
            total_lp_supply: 0,
            fee_bps: 30,
            is_active: true,
            last_update_time: 0,
            cumulative_price_0: 0,
            cumulative_price_1: 0,
            observations: [Observation::default(); OBSERVATION_COUNT],
            observation_index: 0,
            observation_count: 0,
            bump: 0,
            authority_bump: 0,
        }
    }

    #[test]
    fn accumulators_advance_by_elapsed_times_price() {
        let mut pool = test_pool(1_000, 2_000);
        pool.advance_accumulators(10).unwrap();
        // price_0 = 2.0, price_1 = 0.5 at 1e9 scale, over 10 seconds
        assert_eq!(pool.cumulative_price_0, 10 * 2 * PRICE_SCALE);
        assert_eq!(pool.cumulative_price_1, 10 * PRICE_SCALE / 2);
        assert_eq!(pool.last_update_time, 10);
    }

    #[test]
    fn accumulators_reject_clock_regression() {
        let mut pool = test_pool(1_000, 1_000);
        pool.advance_accumulators(100).unwrap();
        assert!(pool.advance_accumulators(50).is_err());
    }

    #[test]
    fn swap_enforces_constant_product() {
        let mut pool = test_pool(1_000, 1_000);
        // quote_out(100) with 30 bps fee is 90; product grows
        pool.apply_swap(100, 90, true).unwrap();
        assert_eq!(pool.reserve_0, 1_100);
        assert_eq!(pool.reserve_1, 910);

        // paying out more than the curve allows must fail
        let mut pool = test_pool(1_000, 1_000);
        assert!(pool.apply_swap(100, 200, true).is_err());
    }

    #[test]
    fn observation_ring_rate_limits_and_wraps() {
        let mut pool = test_pool(1_000, 1_000);
        pool.advance_accumulators(0).unwrap();
        pool.record_observation(0);
        // too soon, dropped
        pool.record_observation(MIN_OBSERVATION_INTERVAL - 1);
        assert_eq!(pool.observation_count, 1);

        let mut t = 0;
        for _ in 0..OBSERVATION_COUNT + 2 {
            t += MIN_OBSERVATION_INTERVAL;
            pool.advance_accumulators(t).unwrap();
            pool.record_observation(t);
        }
        assert_eq!(pool.observation_count as usize, OBSERVATION_COUNT);
        // oldest entries were overwritten
        let oldest = pool.observations_in_order().next().unwrap().timestamp;
        assert!(oldest > 0);
    }

    #[test]
    fn twap_of_constant_price_is_spot() {
        let mut pool = test_pool(1_000, 3_000);
        pool.advance_accumulators(0).unwrap();
        pool.record_observation(0);
        let now = 7_200;
        let twap = pool.twap_price_for(true, 3_600, now).unwrap();
        assert_eq!(twap, pool.spot_price_0().unwrap());
    }

    #[test]
    fn twap_weights_price_change() {
        let mut pool = test_pool(1_000, 1_000);
        pool.advance_accumulators(0).unwrap();
        pool.record_observation(0);

        // price doubles halfway through the window
        pool.advance_accumulators(1_800).unwrap();
        pool.reserve_1 = 2_000;
        let twap = pool.twap_price_for(true, 3_600, 3_600).unwrap();
        // half the window at 1.0, half at 2.0
        assert_eq!(twap, 3 * PRICE_SCALE / 2);
    }

    #[test]
    fn twap_without_observations_errors() {
        let pool = test_pool(1_000, 1_000);
        assert!(pool.twap_price_for(true, 3_600, 100).is_err());
    }

    #[test]
    fn canonical_pair_ordering() {
        let a = Pubkey::new_from_array([1; 32]);
        let b = Pubkey::new_from_array([2; 32]);
        assert!(require_canonical_pair(&a, &b).is_ok());
        assert!(require_canonical_pair(&b, &a).is_err());
        assert!(require_canonical_pair(&a, &a).is_err());
    }
}
