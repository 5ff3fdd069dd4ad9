//! Concurrency probe
//!
//! Workers call [`ConcurrencyProbe::enter`] when they start and drop the
//! returned guard when they finish. The probe tracks how many guards are alive
//! and the highest number ever alive at once.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Records current and peak concurrency across workers.
#[derive(Debug, Default)]
pub struct ConcurrencyProbe {
    active: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
}

impl ConcurrencyProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one worker as active until the guard is dropped.
    pub fn enter(&self) -> ProbeGuard<'_> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        ProbeGuard { probe: self }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Total number of `enter` calls.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

/// Guard returned by [`ConcurrencyProbe::enter`].
#[derive(Debug)]
pub struct ProbeGuard<'a> {
    probe: &'a ConcurrencyProbe,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        self.probe.active.fetch_sub(1, Ordering::SeqCst);
    }
}
