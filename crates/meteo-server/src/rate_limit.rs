use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Outcome of one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: usize,
    pub limit: usize,
    /// Time until the oldest counted request leaves the window
    pub reset_after: Duration,
}

/// Sliding-window request counter keyed by client identifier.
///
/// Each client keeps the timestamps of its admitted requests inside the
/// trailing window. A rejected request is not recorded. The map shards its
/// locks per entry, so prune-and-append for one client is atomic.
pub struct RateLimiter {
    clients: DashMap<String, VecDeque<Instant>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            clients: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// `(allowed, remaining)` for a request arriving now.
    pub fn is_allowed(&self, client_id: &str) -> (bool, usize) {
        let decision = self.check(client_id);
        (decision.allowed, decision.remaining)
    }

    pub fn check(&self, client_id: &str) -> RateLimitDecision {
        self.check_at(client_id, Instant::now())
    }

    pub fn check_at(&self, client_id: &str, now: Instant) -> RateLimitDecision {
        let mut entry = self.clients.entry(client_id.to_string()).or_default();
        let timestamps = entry.value_mut();

        while let Some(&oldest) = timestamps.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        let (allowed, remaining) = if timestamps.len() >= self.max_requests {
            (false, 0)
        } else {
            timestamps.push_back(now);
            (true, self.max_requests - timestamps.len())
        };

        let reset_after = timestamps
            .front()
            .map(|&oldest| (oldest + self.window).saturating_duration_since(now))
            .unwrap_or(self.window);

        RateLimitDecision {
            allowed,
            remaining,
            limit: self.max_requests,
            reset_after,
        }
    }

    /// Drop clients whose most recent request is outside the window.
    /// Returns how many entries were removed.
    pub fn purge_idle(&self) -> usize {
        self.purge_idle_at(Instant::now())
    }

    pub fn purge_idle_at(&self, now: Instant) -> usize {
        // Counted inside `retain`: clients may be added while it runs.
        let mut removed = 0;
        self.clients.retain(|_, timestamps| {
            let active = timestamps
                .back()
                .is_some_and(|&last| now.saturating_duration_since(last) < self.window);
            if !active {
                removed += 1;
            }
            active
        });
        removed
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}
