//! Transfer configuration.
//!
//! Defaults reproduce the classic demo run: window of 4, 32-bit frames,
//! every 4th slot dropped once, one second timeout.

use std::time::Duration;

use crate::codec::FrameCodec;
use crate::error::ConfigError;
use crate::simulator::LossConfig;

/// Parameters for one Go-Back-N transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct GbnConfig {
    /// Maximum frames in flight (N).
    pub window_size: usize,
    /// Total frame size in bits, 16-bit sequence field included.
    pub frame_capacity_bits: usize,
    /// Every `drop_period`-th slot is withheld once by [`LossConfig::EveryNth`].
    pub drop_period: usize,
    /// How long a slot may go unacknowledged before the window is resent.
    pub timeout: Duration,
    /// Timer granularity; a timeout fires at most one tick late.
    pub tick: Duration,
    pub loss: LossConfig,
}

impl Default for GbnConfig {
    fn default() -> Self {
        Self {
            window_size: 4,
            frame_capacity_bits: 32,
            drop_period: 4,
            timeout: Duration::from_secs(1),
            tick: Duration::from_millis(10),
            loss: LossConfig::EveryNth,
        }
    }
}

impl GbnConfig {
    /// Check every constraint; the first violation wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        FrameCodec::new(self.frame_capacity_bits)?;
        if self.drop_period == 0 {
            return Err(ConfigError::ZeroDropPeriod);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.tick.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        if let LossConfig::Random { rate, .. } = self.loss {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::LossRate(rate));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GbnConfig::default().validate(), Ok(()));
    }

    #[test]
    fn each_violation_reported() {
        let base = GbnConfig::default();
        let cases = [
            (
                GbnConfig {
                    window_size: 0,
                    ..base.clone()
                },
                ConfigError::ZeroWindow,
            ),
            (
                GbnConfig {
                    frame_capacity_bits: 8,
                    ..base.clone()
                },
                ConfigError::FrameTooSmall {
                    capacity: 8,
                    header: 16,
                },
            ),
            (
                GbnConfig {
                    drop_period: 0,
                    ..base.clone()
                },
                ConfigError::ZeroDropPeriod,
            ),
            (
                GbnConfig {
                    timeout: Duration::ZERO,
                    ..base.clone()
                },
                ConfigError::ZeroTimeout,
            ),
            (
                GbnConfig {
                    tick: Duration::ZERO,
                    ..base.clone()
                },
                ConfigError::ZeroTick,
            ),
            (
                GbnConfig {
                    loss: LossConfig::Random {
                        rate: -0.1,
                        seed: 1,
                    },
                    ..base.clone()
                },
                ConfigError::LossRate(-0.1),
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }
}
