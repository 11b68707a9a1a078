use {
    crate::{
        snapshot::Snapshot,
        stat::{CoreId, UserHz},
    },
    log::debug,
    std::{
        fmt::{self, Display},
        time::{Duration, Instant},
    },
};

/// a recording of where scheduler time was spent between two snapshots.
#[derive(Clone, Debug)]
pub struct Recording {
    /// when the recording began.
    pub start: Instant,
    /// when the recording ended.
    pub end: Instant,
    /// ticks accrued on each cpu.
    pub cores: CoreDeltas,
    /// contributions dropped because they named a cpu outside of [`CoreDeltas::capacity`].
    pub dropped: usize,
}

/// ticks accrued per cpu, for cpus `0..capacity`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoreDeltas {
    ticks: Vec<UserHz>,
}

/// a cpu that does not fit in a [`CoreDeltas`].
#[derive(Debug, Eq, PartialEq)]
pub struct OutOfRange {
    pub core: CoreId,
    pub capacity: usize,
}

// === impl Recording ===

impl Recording {
    /// compares two snapshots, attributing each thread's new ticks to the cpu it last ran on.
    ///
    /// only threads present in both snapshots count. a thread seen for the first time has
    /// no baseline, and a thread that has since exited has nothing left to report.
    pub fn new(a: &Snapshot, b: &Snapshot, capacity: usize) -> Recording {
        let mut cores = CoreDeltas::new(capacity);
        let mut dropped = 0;

        for (id, now) in b.threads.iter() {
            let Some(then) = a.threads.get(id) else {
                continue;
            };
            let Some(delta) = now.ticks.since(then.ticks) else {
                continue;
            };
            if let Err(error) = cores.add(now.core, delta) {
                debug!("dropping {delta:?} from thread {id}: {error}");
                dropped += 1;
            }
        }

        Self {
            start: a.time,
            end: b.time,
            cores,
            dropped,
        }
    }

    /// the wall-clock time this recording covers.
    pub fn elapsed(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }
}

// === impl CoreDeltas ===

impl CoreDeltas {
    /// the most cpus that are tracked.
    pub const MAX: usize = 32;

    /// returns an empty table for `capacity` cpus, capped at [`CoreDeltas::MAX`].
    pub fn new(capacity: usize) -> Self {
        Self {
            ticks: vec![UserHz::ZERO; capacity.min(Self::MAX)],
        }
    }

    pub fn capacity(&self) -> usize {
        self.ticks.len()
    }

    /// credits `ticks` to a cpu.
    pub fn add(&mut self, core: CoreId, ticks: UserHz) -> Result<(), OutOfRange> {
        let capacity = self.capacity();
        let slot = core
            .index(capacity)
            .and_then(|i| self.ticks.get_mut(i))
            .ok_or(OutOfRange { core, capacity })?;
        *slot += ticks;
        Ok(())
    }

    /// the ticks credited to a cpu; zero for cpus that are not tracked.
    pub fn get(&self, core: CoreId) -> UserHz {
        core.index(self.capacity())
            .and_then(|i| self.ticks.get(i))
            .copied()
            .unwrap_or(UserHz::ZERO)
    }

    pub fn total(&self) -> UserHz {
        self.ticks.iter().copied().sum()
    }
}

// === impl OutOfRange ===

impl Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { core, capacity } = self;
        f.write_fmt(format_args!("cpu{core} is outside of the {capacity} tracked cpus"))
    }
}

impl std::error::Error for OutOfRange {}
