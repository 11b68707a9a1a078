//! which cpus exist, and how fast they are running.

use {
    crate::{recording::CoreDeltas, source::SysFs, stat::CoreId},
    log::{debug, warn},
    std::{
        collections::BTreeSet,
        fmt::{self, Display},
        num::ParseIntError,
        str::FromStr,
    },
};

/// a cpu list, in the format used by `/sys/devices/system/cpu/online`.
///
/// this is a comma-separated list of single ids and inclusive `low-high` ranges, e.g.
/// `0-3,6,8-11`.
///
/// only ids below [`CoreDeltas::MAX`] are kept; the rest are counted, never materialized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CpuList {
    cores: Vec<CoreId>,
    /// ids listed at or beyond the supported cap.
    beyond: u64,
}

#[derive(Debug, Eq, PartialEq)]
pub enum CpuListParseError {
    Empty,
    Id(ParseIntError),
    /// a range whose upper bound is below its lower bound.
    Reversed { low: u32, high: u32 },
}

/// a cpu clock frequency.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Frequency {
    khz: u64,
}

/// returns the online cpus, in ascending order.
///
/// if the online list cannot be read, the first `fallback` cpus are assumed.
pub fn online(sysfs: &SysFs, fallback: u32) -> Vec<CoreId> {
    let list = sysfs
        .online()
        .map_err(|error| error.to_string())
        .and_then(|list| list.parse::<CpuList>().map_err(|error| error.to_string()));

    match list {
        Ok(CpuList { cores, beyond: 0 }) => cores,
        Ok(CpuList { cores, beyond }) => {
            warn!("{beyond} cpus are beyond the {} supported", CoreDeltas::MAX);
            cores
        }
        Err(error) => {
            warn!("could not read online cpus, assuming {fallback}: {error}");
            (0..fallback).map(CoreId::new).collect()
        }
    }
}

/// reads the current frequency of a cpu.
///
/// returns a zero frequency if it cannot be read; not every platform exposes cpufreq.
pub fn frequency(sysfs: &SysFs, core: CoreId) -> Frequency {
    match sysfs.scaling_cur_freq(core).map(|s| s.trim().parse::<u64>()) {
        Ok(Ok(khz)) => Frequency { khz },
        Ok(Err(error)) => {
            debug!("cpu{core} has a malformed frequency: {error}");
            Frequency::default()
        }
        Err(error) => {
            debug!("cpu{core} frequency is unavailable: {error}");
            Frequency::default()
        }
    }
}

// === impl CpuList ===

impl FromStr for CpuList {
    type Err = CpuListParseError;
    fn from_str(list: &str) -> Result<Self, Self::Err> {
        use CpuListParseError::*;

        let list = list.trim();
        if list.is_empty() {
            return Err(Empty);
        }

        let parse = |id: &str| id.trim().parse::<u32>().map_err(Id);

        let mut cores = BTreeSet::new();
        let mut beyond = 0;
        for group in list.split(',') {
            let (low, high) = match group.split_once('-') {
                Some((low, high)) => (parse(low)?, parse(high)?),
                None => {
                    let id = parse(group)?;
                    (id, id)
                }
            };
            if high < low {
                return Err(Reversed { low, high });
            }
            if low < Self::LIMIT {
                cores.extend((low..=high.min(Self::LIMIT - 1)).map(CoreId::new));
            }
            if high >= Self::LIMIT {
                beyond += u64::from(high) - u64::from(low.max(Self::LIMIT)) + 1;
            }
        }

        Ok(Self {
            cores: cores.into_iter().collect(),
            beyond,
        })
    }
}

impl CpuList {
    const LIMIT: u32 = CoreDeltas::MAX as u32;

    /// the number of listed ids that were not kept.
    pub fn beyond(&self) -> u64 {
        self.beyond
    }
}

impl From<CpuList> for Vec<CoreId> {
    fn from(CpuList { cores, .. }: CpuList) -> Self {
        cores
    }
}

// === impl Frequency ===

impl Frequency {
    pub const fn from_khz(khz: u64) -> Self {
        Self { khz }
    }

    pub fn ghz(&self) -> f64 {
        self.khz as f64 / 1_000_000.0
    }
}

/// formats the frequency in GHz, honoring width and precision.
impl Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ghz().fmt(f)
    }
}

// === impl CpuListParseError ===

impl Display for CpuListParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CpuListParseError::*;
        match self {
            Empty => f.write_str("cpu list is empty"),
            Id(error) => f.write_fmt(format_args!("invalid cpu id: {error}")),
            Reversed { low, high } => f.write_fmt(format_args!("invalid cpu range {low}-{high}")),
        }
    }
}

impl std::error::Error for CpuListParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Id(error) => Some(error),
            Self::Empty | Self::Reversed { .. } => None,
        }
    }
}
