//! Bounded poll-until-stable check used after readiness signals fire.
//!
//! A probe script is evaluated repeatedly. The view counts as settled once
//! two consecutive probes return the same rendered value. `null` and a JSON
//! array of nulls both count as not rendered yet. `max_wait` caps the
//! poll so a view that keeps changing is read anyway.

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::error::SessionError;
use crate::session::PageSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(250),
            max_wait: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Two consecutive probes agreed after `polls` evaluations.
    Stable { polls: u32 },
    /// `max_wait` elapsed before the probe stabilised.
    CapReached,
}

/// Polls `probe` until it returns the same rendered value twice in a row.
///
/// # Errors
///
/// Propagates the first [`SessionError`] returned while evaluating the probe.
pub async fn wait_until_stable(
    session: &dyn PageSession,
    probe: &str,
    policy: SettlePolicy,
) -> Result<SettleOutcome, SessionError> {
    if policy.max_wait.is_zero() {
        return Ok(SettleOutcome::CapReached);
    }

    let started = Instant::now();
    let mut previous = session.evaluate(probe).await?;
    let mut polls = 1u32;

    loop {
        if started.elapsed() >= policy.max_wait {
            tracing::debug!(polls, "view did not settle before cap");
            return Ok(SettleOutcome::CapReached);
        }
        tokio::time::sleep(policy.interval).await;

        let current = session.evaluate(probe).await?;
        polls += 1;
        if !is_unrendered(&current) && current == previous {
            return Ok(SettleOutcome::Stable { polls });
        }
        previous = current;
    }
}

/// `null`, or a JSON string holding an array whose entries are all `null`.
pub(crate) fn is_unrendered(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => serde_json::from_str::<Vec<Value>>(s)
            .is_ok_and(|reads| reads.iter().all(Value::is_null)),
        _ => false,
    }
}
