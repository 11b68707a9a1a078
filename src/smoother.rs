use {
    crate::{
        recording::Recording,
        stat::{CoreId, UserHz},
    },
    std::time::Duration,
};

/// an exponential moving average of each cpu's load, in percent.
#[derive(Clone, Debug, PartialEq)]
pub struct Loads {
    smoothed: Vec<f64>,
    /// the weight given to the newest sample.
    alpha: f64,
}

/// the share of `elapsed` that `ticks` represents, as a percentage in `[0, 100]`.
///
/// an empty (or nonsensical) interval has no load.
pub fn raw_load(ticks: UserHz, elapsed: Duration, hz: u32) -> f64 {
    let available = elapsed.as_secs_f64() * f64::from(hz);
    if !available.is_finite() || available <= 0.0 {
        return 0.0;
    }

    (ticks.as_f64() / available * 100.0).clamp(0.0, 100.0)
}

// === impl Loads ===

impl Loads {
    pub const ALPHA: f64 = 0.15;

    /// returns idle loads for cpus `0..capacity`.
    pub fn new(capacity: usize, alpha: f64) -> Self {
        Self {
            smoothed: vec![0.0; capacity],
            alpha,
        }
    }

    /// folds one raw sample into a cpu's average, returning the new average.
    ///
    /// cpus outside of the tracked range are ignored, and read as idle.
    pub fn update(&mut self, core: CoreId, raw: f64) -> f64 {
        let Self { smoothed, alpha } = self;
        let Some(load) = core.index(smoothed.len()).and_then(|i| smoothed.get_mut(i)) else {
            return 0.0;
        };

        *load = *alpha * raw + (1.0 - *alpha) * *load;
        *load
    }

    /// folds a recording into the averages of the given cpus.
    pub fn record(&mut self, recording: &Recording, cores: &[CoreId], hz: u32) {
        let elapsed = recording.elapsed();
        for &core in cores {
            let raw = raw_load(recording.cores.get(core), elapsed, hz);
            self.update(core, raw);
        }
    }

    /// the number of cpus tracked.
    pub fn capacity(&self) -> usize {
        self.smoothed.len()
    }

    /// the current average load of a cpu.
    pub fn get(&self, core: CoreId) -> f64 {
        core.index(self.smoothed.len())
            .and_then(|i| self.smoothed.get(i))
            .copied()
            .unwrap_or(0.0)
    }
}
