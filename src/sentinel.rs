use {
    crate::{
        recording::Recording,
        smoother::Loads,
        snapshot::Snapshot,
        stat::CoreId,
    },
    log::debug,
    std::time::Instant,
};

/// what is carried from one sample cycle to the next.
#[derive(Clone, Debug)]
pub struct Sentinel {
    /// the last observed snapshot.
    last: Snapshot,
    /// the smoothed load of each cpu.
    loads: Loads,
}

// === impl Sentinel ===

impl Sentinel {
    /// creates a new [`Sentinel`] for cpus `0..capacity`.
    ///
    /// NB: nothing has been observed yet, so the first cycle attributes no ticks to any cpu.
    pub fn new(start: Instant, capacity: usize, alpha: f64) -> Self {
        Self {
            last: Snapshot::empty(start),
            loads: Loads::new(capacity, alpha),
        }
    }

    /// folds a fresh snapshot into the smoothed loads of `cores`.
    ///
    /// returns the state for the next cycle, in which `next` is the last observed snapshot.
    pub fn advance(self, next: Snapshot, cores: &[CoreId], hz: u32) -> Self {
        let Self { last, mut loads } = self;

        let recording = Recording::new(&last, &next, loads.capacity());
        if recording.dropped > 0 {
            debug!(
                "dropped {} contributions from untracked cpus",
                recording.dropped
            );
        }
        loads.record(&recording, cores, hz);

        Self { last: next, loads }
    }

    pub fn loads(&self) -> &Loads {
        &self.loads
    }

    /// when the last snapshot was taken.
    pub fn observed_at(&self) -> Instant {
        self.last.time
    }
}
