//! Per-client admission control for the allocation path.
//!
//! A fixed-window counter keyed by an opaque client identity (usually the
//! source IP). Each client gets `max_requests` admissions per window; the
//! window restarts on the first attempt after it has elapsed. Bursts that
//! straddle a window boundary can therefore reach twice the nominal rate,
//! which is fine for deterring abuse but is not a precise quota.
//!
//! The client table is bounded by [`AdmissionLimiter::evict`], driven by
//! [`run_limiter_eviction`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// Limiter tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
        }
    }
}

/// Outcome of an admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted { remaining: u32 },
    Rejected { retry_after: Duration },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    window_start: Instant,
    count: u32,
    last_seen: Instant,
}

/// Fixed-window request counter per client identity.
#[derive(Debug)]
pub struct AdmissionLimiter {
    config: LimiterConfig,
    clients: Mutex<HashMap<String, ClientWindow>>,
}

impl AdmissionLimiter {
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Records an attempt by `client` at `now` and decides whether to admit it.
    pub fn try_admit(&self, client: &str, now: Instant) -> Admission {
        let mut clients = self.lock();
        let max = self.config.max_requests;

        let entry = clients.entry(client.to_string()).or_insert(ClientWindow {
            window_start: now,
            count: 0,
            last_seen: now,
        });
        entry.last_seen = now;

        if entry.count == 0 || now.saturating_duration_since(entry.window_start) > self.config.window
        {
            entry.window_start = now;
            entry.count = 1;
            return Admission::Admitted {
                remaining: max.saturating_sub(1),
            };
        }

        if entry.count < max {
            entry.count += 1;
            return Admission::Admitted {
                remaining: max - entry.count,
            };
        }

        let elapsed = now.saturating_duration_since(entry.window_start);
        Admission::Rejected {
            retry_after: self.config.window.saturating_sub(elapsed),
        }
    }

    /// Drops clients not seen for longer than `stale_after`. Returns how many
    /// entries were removed.
    pub fn evict(&self, now: Instant, stale_after: Duration) -> usize {
        let mut clients = self.lock();
        let before = clients.len();
        clients.retain(|_, w| now.saturating_duration_since(w.last_seen) <= stale_after);
        before - clients.len()
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ClientWindow>> {
        // Entries are plain counters, still usable after a poisoning panic.
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Evicts stale limiter entries every `period` until `shutdown` turns `true`.
pub async fn run_limiter_eviction(
    limiter: Arc<AdmissionLimiter>,
    period: Duration,
    stale_after: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = time::interval_at(time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        period_secs = period.as_secs(),
        stale_after_secs = stale_after.as_secs(),
        "Rate limiter eviction started"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let evicted = limiter.evict(Instant::now(), stale_after);
                if evicted > 0 {
                    debug!(evicted, remaining = limiter.tracked_clients(), "Evicted stale rate limiter entries");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Rate limiter eviction stopped");
}
