//! Loss simulator for the data channel.
//!
//! The sender asks a [`LossModel`] before every enqueue whether the frame in
//! a given slot should be withheld.  A withheld frame is simply absent from
//! the channel: it is not delayed or corrupted, so the retransmit timer is
//! the only way the slot ever gets through.
//!
//! | Model              | Behaviour                                             |
//! |--------------------|-------------------------------------------------------|
//! | [`EveryNth`]       | Slot `i` dropped iff `(i+1) % n == 0` and `i != 0`.   |
//! | [`NoLoss`]         | Transparent pass-through.                             |
//! | [`RandomFirstTry`] | Each slot dropped with probability `p`, seeded RNG.   |
//!
//! Every model drops a slot on its first transmission attempt only, so each
//! slot is lost at most once and any transfer terminates.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;

/// Drop decision for one transmission attempt.
pub trait LossModel: Send {
    /// `first_attempt` is `true` only for the very first transmission of `slot`.
    fn should_drop(&mut self, slot: usize, first_attempt: bool) -> bool;
}

/// The deterministic every-Nth-slot rule.
///
/// Slot 0 is never dropped, so `drop_period == 1` drops every other slot once.
pub fn should_drop(slot: usize, first_attempt: bool, drop_period: usize) -> bool {
    first_attempt && slot != 0 && drop_period != 0 && (slot + 1) % drop_period == 0
}

/// Drops every `period`-th slot once.
#[derive(Debug, Clone, Copy)]
pub struct EveryNth {
    period: usize,
}

impl EveryNth {
    pub fn new(period: usize) -> Result<Self, ConfigError> {
        if period == 0 {
            return Err(ConfigError::ZeroDropPeriod);
        }
        Ok(Self { period })
    }
}

impl LossModel for EveryNth {
    fn should_drop(&mut self, slot: usize, first_attempt: bool) -> bool {
        should_drop(slot, first_attempt, self.period)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoLoss;

impl LossModel for NoLoss {
    fn should_drop(&mut self, _slot: usize, _first_attempt: bool) -> bool {
        false
    }
}

/// Drops a slot's first attempt with probability `rate`.
///
/// Seeded, so a failing run can be replayed exactly.
#[derive(Debug, Clone)]
pub struct RandomFirstTry {
    rate: f64,
    rng: StdRng,
}

impl RandomFirstTry {
    pub fn new(rate: f64, seed: u64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::LossRate(rate));
        }
        Ok(Self {
            rate,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl LossModel for RandomFirstTry {
    fn should_drop(&mut self, _slot: usize, first_attempt: bool) -> bool {
        first_attempt && self.rng.random_bool(self.rate)
    }
}

/// Which loss model a transfer uses.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LossConfig {
    /// [`EveryNth`] with the configured drop period.
    #[default]
    EveryNth,
    None,
    Random { rate: f64, seed: u64 },
}

impl LossConfig {
    /// Instantiate the model.  `drop_period` only matters for [`LossConfig::EveryNth`].
    pub fn build(&self, drop_period: usize) -> Result<Box<dyn LossModel>, ConfigError> {
        Ok(match *self {
            Self::EveryNth => Box::new(EveryNth::new(drop_period)?),
            Self::None => Box::new(NoLoss),
            Self::Random { rate, seed } => Box::new(RandomFirstTry::new(rate, seed)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropped_slots(period: usize, slots: usize) -> Vec<usize> {
        (0..slots).filter(|&i| should_drop(i, true, period)).collect()
    }

    #[test]
    fn every_fourth_slot_dropped() {
        assert_eq!(dropped_slots(4, 12), vec![3, 7, 11]);
    }

    #[test]
    fn slot_zero_never_dropped() {
        assert_eq!(dropped_slots(1, 4), vec![1, 2, 3]);
    }

    #[test]
    fn retransmissions_always_delivered() {
        for slot in 0..32 {
            assert!(!should_drop(slot, false, 4));
            assert!(!should_drop(slot, false, 1));
        }
    }

    #[test]
    fn zero_period_rejected() {
        assert_eq!(EveryNth::new(0).unwrap_err(), ConfigError::ZeroDropPeriod);
        assert!(LossConfig::EveryNth.build(0).is_err());
    }

    #[test]
    fn no_loss_passes_everything() {
        let mut model = LossConfig::None.build(1).unwrap();
        assert!((0..16).all(|slot| !model.should_drop(slot, true)));
    }

    #[test]
    fn random_model_is_reproducible_and_first_try_only() {
        let mut a = RandomFirstTry::new(0.5, 42).unwrap();
        let mut b = RandomFirstTry::new(0.5, 42).unwrap();
        let first: Vec<bool> = (0..64).map(|i| a.should_drop(i, true)).collect();
        let second: Vec<bool> = (0..64).map(|i| b.should_drop(i, true)).collect();
        assert_eq!(first, second);
        assert!((0..64).all(|i| !a.should_drop(i, false)));
    }

    #[test]
    fn random_rate_bounds_checked() {
        assert_eq!(
            RandomFirstTry::new(1.5, 0).unwrap_err(),
            ConfigError::LossRate(1.5)
        );
        let mut always = RandomFirstTry::new(1.0, 7).unwrap();
        assert!(always.should_drop(3, true));
    }
}
