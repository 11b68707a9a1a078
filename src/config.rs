use {
    crate::{
        smoother::Loads,
        source::{ProcFs, SysFs},
        stat::UserHz,
    },
    std::{path::PathBuf, time::Duration},
};

/// fixed parameters of the dashboard.
///
/// these are not exposed to the operator; [`Config::default`] is what runs.
#[derive(Clone, Debug)]
pub struct Config {
    /// where the process table is mounted.
    pub proc_root: PathBuf,
    /// where cpu topology and frequency files live.
    pub sys_root: PathBuf,
    /// how often the dashboard is redrawn.
    pub interval: Duration,
    /// the number of cells in each meter.
    pub width: usize,
    /// the weight given to the newest sample when smoothing.
    pub alpha: f64,
    /// scheduler ticks per second.
    pub hz: u32,
    /// how many cpus to assume when the online list is unreadable.
    pub fallback_cores: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from(ProcFs::ROOT),
            sys_root: PathBuf::from(SysFs::ROOT),
            interval: Duration::from_secs(1),
            width: 30,
            alpha: Loads::ALPHA,
            hz: UserHz::FREQ,
            fallback_cores: 8,
        }
    }
}
