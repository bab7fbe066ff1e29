use {
    rand::Rng,
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        ops::Range,
        time::Duration,
    },
};

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);
pub const JITTER_RANGE: Range<f64> = 0.5..1.5;

/// Jittered exponential delay between consecutive failed attempts.
///
/// The delay for the `n`-th consecutive failure is `base_delay * 2^(n-1)`, capped at
/// `max_delay`, scaled by a uniform jitter factor from [`JITTER_RANGE`] and capped again.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    #[serde(with = "humantime_serde", default = "default_base_delay")]
    pub base_delay: Duration,
    #[serde(with = "humantime_serde", default = "default_max_delay")]
    pub max_delay:  Duration,
}

fn default_base_delay() -> Duration {
    DEFAULT_BASE_DELAY
}

fn default_max_delay() -> Duration {
    DEFAULT_MAX_DELAY
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay:  DEFAULT_MAX_DELAY,
        }
    }
}

impl BackoffPolicy {
    pub fn delay(&self, retry_count: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(JITTER_RANGE);
        self.delay_with_jitter(retry_count, jitter)
    }

    pub fn delay_with_jitter(&self, retry_count: u32, jitter: f64) -> Duration {
        // 2^31 times any sane base delay is already far beyond the cap
        let exponent = retry_count.saturating_sub(1).min(31);
        let delay = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);
        delay.mul_f64(jitter.max(0.0)).min(self.max_delay)
    }
}
