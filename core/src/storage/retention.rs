use crate::wire_interface::Reading;
use serde::{Deserialize, Serialize};

/// Most readings kept per sensor.
pub const MAX_WINDOW: usize = 220;
pub const SECS_IN_DAY: i64 = 24 * 60 * 60;

/// Count and age bounds enforced by a cleanup pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionPolicy {
    pub max_window: usize,
    pub max_age_secs: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_window: MAX_WINDOW,
            max_age_secs: SECS_IN_DAY,
        }
    }
}

impl RetentionPolicy {
    /// Readings must be strictly newer than this to survive a cleanup at `now`.
    pub fn cutoff(&self, now: i64) -> i64 {
        now - self.max_age_secs
    }

    /// Sort, trim to the newest `max_window`, then drop anything outside the
    /// trailing age window. The age filter runs last and is authoritative.
    pub fn apply(&self, values: &mut Vec<Reading>, now: i64) {
        values.sort_by_key(|reading| reading.timestamp);

        let excess = values.len().saturating_sub(self.max_window);
        if excess > 0 {
            values.drain(..excess);
        }

        let cutoff = self.cutoff(now);
        values.retain(|reading| reading.timestamp > cutoff);
    }

    /// Whether `values` already satisfies every bound at `now`.
    pub fn admits(&self, values: &[Reading], now: i64) -> bool {
        let cutoff = self.cutoff(now);
        values.len() <= self.max_window
            && values.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp)
            && values.iter().all(|reading| reading.timestamp > cutoff)
    }
}
