// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pairing retry policy.
//!
//! Pairing waits for a person to press the bridge's link button, so by
//! default it retries forever. Only the "link button not pressed" error is
//! retried; every other error ends pairing immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::BridgeError;

/// Backoff schedule for `createUser` attempts.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use hue_trigger::session::PairingPolicy;
///
/// // Default: retry forever, 1s doubling up to 5s
/// let policy = PairingPolicy::default();
/// assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
/// assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(5));
///
/// // Give up after 30 attempts
/// let policy = PairingPolicy::new().with_max_attempts(30);
/// assert!(!policy.should_retry(30));
/// ```
#[derive(Debug, Clone)]
pub struct PairingPolicy {
    /// Maximum number of attempts (None = wait forever).
    pub max_attempts: Option<u32>,
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Multiplier applied per retry.
    pub backoff_multiplier: f32,
}

impl PairingPolicy {
    /// Creates a policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the number of attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Retries forever.
    #[must_use]
    pub fn forever(mut self) -> Self {
        self.max_attempts = None;
        self
    }

    /// Sets the first delay.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the delay cap.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub fn with_backoff_multiplier(mut self, multiplier: f32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Delay before retry number `retry` (0-based).
    #[must_use]
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        if retry == 0 {
            return self.initial_delay.min(self.max_delay);
        }

        let multiplier = self
            .backoff_multiplier
            .powi(i32::try_from(retry).unwrap_or(i32::MAX));

        #[allow(clippy::cast_precision_loss)]
        let delay_ms = self.initial_delay.as_millis() as f32 * multiplier;

        if !delay_ms.is_finite() {
            return self.max_delay;
        }

        // delay_ms is non-negative; huge values saturate and get capped below
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let delay = Duration::from_millis(delay_ms as u64);

        delay.min(self.max_delay)
    }

    /// Returns true if another attempt may follow `attempts_made` attempts.
    #[must_use]
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts_made < max)
    }

    /// Returns true if `error` is worth another attempt.
    #[must_use]
    pub fn is_retryable(&self, error: &BridgeError) -> bool {
        error.is_link_button_not_pressed()
    }
}

impl Default for PairingPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

/// Why pairing stopped without a credential.
#[derive(Debug)]
pub(crate) enum PairingFailure {
    /// A non-retryable error.
    Rejected { attempts: u32, source: BridgeError },
    /// A bounded policy ran out of attempts.
    Exhausted { attempts: u32 },
}

/// Runs `attempt` until it succeeds, fails with a non-retryable error, or the
/// policy stops retrying.
///
/// `attempt` receives the 1-based attempt number. `on_backoff` is called with
/// the failed attempt number and the upcoming delay before each sleep.
/// Returns the value and the number of attempts it took.
pub(crate) async fn retry_with_policy<T, F, Fut, B>(
    policy: &PairingPolicy,
    mut attempt: F,
    mut on_backoff: B,
) -> Result<(T, u32), PairingFailure>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, BridgeError>>,
    B: FnMut(u32, Duration),
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match attempt(attempts).await {
            Ok(value) => return Ok((value, attempts)),
            Err(err) if policy.is_retryable(&err) => {
                if !policy.should_retry(attempts) {
                    return Err(PairingFailure::Exhausted { attempts });
                }
                let delay = policy.delay_for_attempt(attempts - 1);
                on_backoff(attempts, delay);
                tokio::time::sleep(delay).await;
            }
            Err(source) => return Err(PairingFailure::Rejected { attempts, source }),
        }
    }
}
