//! Request identity timestamps sent in `X-Request-Identity`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generates strictly increasing millisecond timestamps.
///
/// Two requests dispatched within the same millisecond still get distinct
/// identities; the second is bumped one past the first.
#[derive(Debug, Default)]
pub struct RequestIdentity {
    last: AtomicU64,
}

impl RequestIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next identity: the current time in ms, or one past the previous value.
    pub fn next(&self) -> u64 {
        let now = now_millis();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(previous.saturating_add(1))
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
