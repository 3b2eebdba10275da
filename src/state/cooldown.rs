//! Per-verb reply cooldowns.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks when each verb last produced a public reply.
#[derive(Debug)]
pub struct Cooldowns {
    period: Duration,
    last_used: HashMap<String, Instant>,
}

impl Cooldowns {
    /// A zero `period` disables cooldowns entirely.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_used: HashMap::new(),
        }
    }

    /// Returns `true` and starts a new cooldown if `verb` may reply now.
    pub fn try_acquire(&mut self, verb: &str) -> bool {
        if self.period.is_zero() {
            return true;
        }

        let now = Instant::now();
        match self.last_used.get(verb) {
            Some(last) if now.duration_since(*last) < self.period => false,
            _ => {
                self.last_used.insert(verb.to_string(), now);
                true
            }
        }
    }
}
