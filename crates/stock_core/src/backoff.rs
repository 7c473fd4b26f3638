use std::time::Duration;

/// How long to wait before polling again after a failed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Retry immediately.
    None,
    Fixed(Duration),
    /// `base * 2^(failures - 1)`, capped at `max`.
    Exponential { base: Duration, max: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub policy: BackoffPolicy,
    /// Upper bound of the uniform random delay added on top of the policy.
    pub jitter: Duration,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Deterministic part of the delay after `failures` consecutive failed cycles.
    pub fn base_delay(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        match self.policy {
            BackoffPolicy::None => Duration::ZERO,
            BackoffPolicy::Fixed(delay) => delay,
            BackoffPolicy::Exponential { base, max } => {
                let shift = (failures - 1).min(31);
                base.checked_mul(1u32 << shift)
                    .map_or(max, |delay| delay.min(max))
            }
        }
    }

    /// Full delay including jitter.
    pub fn delay(&self, failures: u32) -> Duration {
        let base = self.base_delay(failures);
        if self.jitter.is_zero() || base.is_zero() {
            return base;
        }
        let jitter_ms = fastrand::u64(0..=self.jitter.as_millis() as u64);
        base + Duration::from_millis(jitter_ms)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            policy: BackoffPolicy::Exponential {
                base: Duration::from_secs(2),
                max: Duration::from_secs(60),
            },
            jitter: Duration::from_millis(500),
        }
    }
}
