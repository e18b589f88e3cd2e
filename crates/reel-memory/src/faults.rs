//! Failure injection shared by every table of a backend

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use reel_core::{CollabResult, DomainError};
use tokio::sync::watch;
use tracing::trace;

/// Error a failed call reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Network,
    Unauthorized,
    NotFound,
}

impl FaultKind {
    fn into_error(self, resource: &'static str, op: &'static str) -> DomainError {
        match self {
            Self::Network => DomainError::Network(format!("{op} {resource}: connection reset")),
            Self::Unauthorized => DomainError::Unauthorized(format!("{op} {resource}")),
            Self::NotFound => DomainError::not_found(resource, op),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Latency {
    base: Duration,
    jitter: Duration,
}

/// What the next collaborator calls will run into
#[derive(Debug)]
pub struct FaultPlan {
    failures: Mutex<VecDeque<FaultKind>>,
    targeted: Mutex<Vec<(&'static str, &'static str, FaultKind)>>,
    latency: Mutex<Latency>,
    gate: watch::Sender<bool>,
    calls: AtomicU64,
}

impl FaultPlan {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            failures: Mutex::new(VecDeque::new()),
            targeted: Mutex::new(Vec::new()),
            latency: Mutex::new(Latency::default()),
            gate,
            calls: AtomicU64::new(0),
        }
    }

    /// Fail the next `n` calls with `kind`, after any failures already queued
    pub fn fail_next(&self, n: usize, kind: FaultKind) {
        self.failures.lock().extend(std::iter::repeat(kind).take(n));
    }

    /// Fail the next call to `op` on `resource` (e.g. `"Video"`, `"adjust"`)
    ///
    /// Other calls pass through untouched.
    pub fn fail_call(&self, resource: &'static str, op: &'static str, kind: FaultKind) {
        self.targeted.lock().push((resource, op, kind));
    }

    /// Drop queued failures and latency
    pub fn clear(&self) {
        self.failures.lock().clear();
        self.targeted.lock().clear();
        *self.latency.lock() = Latency::default();
    }

    /// Delay every call by `base` plus a random share of `jitter`
    pub fn set_latency(&self, base: Duration, jitter: Duration) {
        *self.latency.lock() = Latency { base, jitter };
    }

    /// Park every call until [`release`](Self::release)
    pub fn hold(&self) {
        self.gate.send_replace(true);
    }

    pub fn release(&self) {
        self.gate.send_replace(false);
    }

    /// Number of collaborator calls made so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn delay(&self) -> Duration {
        let latency = *self.latency.lock();
        let jitter_ms = u64::try_from(latency.jitter.as_millis()).unwrap_or(u64::MAX);
        if jitter_ms == 0 {
            return latency.base;
        }
        latency.base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }

    /// Run the plan for one call; every table calls this before touching data
    pub(crate) async fn check(&self, resource: &'static str, op: &'static str) -> CollabResult<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let mut gate = self.gate.subscribe();
        // The sender lives as long as `self`, so this only returns once released
        let _ = gate.wait_for(|held| !*held).await;

        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let targeted = {
            let mut targeted = self.targeted.lock();
            targeted
                .iter()
                .position(|(r, o, _)| *r == resource && *o == op)
                .map(|position| targeted.remove(position).2)
        };
        if let Some(kind) = targeted.or_else(|| self.failures.lock().pop_front()) {
            trace!(resource, op, ?kind, "Injected failure");
            return Err(kind.into_error(resource, op));
        }
        Ok(())
    }
}

impl Default for FaultPlan {
    fn default() -> Self {
        Self::new()
    }
}
