use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window request counter keyed by client.
///
/// Each key gets `max` admissions per window; the counter resets when the
/// window expires. State is process-wide and lives for the server's lifetime.
pub struct WindowLimiter {
    max: u32,
    window: Duration,
    windows: DashMap<String, Window>,
}

impl WindowLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self { max, window, windows: DashMap::new() }
    }

    /// Admit or reject one request for `key`.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(Window { count: 0, started: now });
        if now.duration_since(entry.started) >= self.window {
            entry.count = 0;
            entry.started = now;
        }
        if entry.count < self.max {
            entry.count += 1;
            true
        } else {
            warn!(%key, max = self.max, "rate limit exceeded");
            false
        }
    }
}
