// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bounded retry with linear back-off on the tokio clock.

use std::fmt;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    base_delay: Duration,
    max_attempts: u32,
}

impl RetryPolicy {
    /// Attempt `n` (1-based) that fails waits `n * base_delay` before attempt `n + 1`.
    pub fn linear(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after failed `attempt`, or `None` once the budget is spent.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }
        Some(self.base_delay.saturating_mul(attempt))
    }

    /// Sum of all delays a fully failing run sleeps through.
    pub fn total_delay(&self) -> Duration {
        (1..self.max_attempts)
            .filter_map(|attempt| self.delay_for(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryExhausted {
    pub attempts: u32,
}

impl fmt::Display for RetryExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gave up after {} attempts", self.attempts)
    }
}

impl std::error::Error for RetryExhausted {}

/// Runs `op` until it yields `Some`, sleeping between attempts per `policy`.
///
/// `op` receives the 1-based attempt number.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, RetryExhausted>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let mut attempt = 1;
    loop {
        if let Some(value) = op(attempt).await {
            return Ok(value);
        }
        let Some(delay) = policy.delay_for(attempt) else {
            tracing::debug!(attempts = attempt, "retry budget exhausted");
            return Err(RetryExhausted { attempts: attempt });
        };
        tracing::trace!(attempt, delay_ms = delay.as_millis() as u64, "retrying");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// [`retry`] for synchronous probes.
pub async fn retry_sync<T>(
    policy: RetryPolicy,
    mut probe: impl FnMut(u32) -> Option<T>,
) -> Result<T, RetryExhausted> {
    retry(policy, |attempt| std::future::ready(probe(attempt))).await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::Instant;

    use super::{retry, retry_sync, RetryExhausted, RetryPolicy};

    #[test]
    fn linear_delays_grow_with_attempt_number() {
        let policy = RetryPolicy::linear(Duration::from_millis(500), 5);
        assert_eq!(policy.delay_for(1), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_for(4), Some(Duration::from_millis(2000)));
        assert_eq!(policy.delay_for(5), None);
        assert_eq!(policy.delay_for(0), None);
        assert_eq!(policy.total_delay(), Duration::from_millis(5000));
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        let policy = RetryPolicy::linear(Duration::from_millis(10), 0);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.total_delay(), Duration::ZERO);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn succeeds_on_a_later_attempt_after_linear_sleeps() {
        let started = Instant::now();
        let policy = RetryPolicy::linear(Duration::from_millis(200), 10);
        let value = retry_sync(policy, |attempt| (attempt == 3).then_some(attempt * 7))
            .await
            .expect("value");

        assert_eq!(value, 21);
        assert_eq!(started.elapsed(), Duration::from_millis(200 + 400));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();
        let policy = RetryPolicy::linear(Duration::from_millis(500), 5);
        let result: Result<(), _> = retry(policy, |_| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                None
            }
        })
        .await;

        assert_eq!(result, Err(RetryExhausted { attempts: 5 }));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(started.elapsed(), policy.total_delay());
    }
}
