use std::{
    fmt::{self, Display},
    num::ParseIntError,
    str::FromStr,
};

pub use self::user_hz::UserHz;

mod user_hz;

#[cfg(test)]
pub(crate) mod tests;

/// the scheduler accounting of one thread, as read from `/proc/<pid>/task/<tid>/stat`.
///
/// see `proc_pid_stat(5)` for more information.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskStat {
    /// time this thread has been scheduled in user mode.
    pub utime: UserHz,
    /// time this thread has been scheduled in kernel mode.
    pub stime: UserHz,
    /// the cpu this thread last executed on.
    pub processor: CoreId,
}

/// a logical cpu, as numbered by the kernel.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CoreId(u32);

#[derive(Debug, Eq, PartialEq)]
pub enum TaskStatParseError {
    /// the record has no closing parenthesis after the thread name.
    MissingName,
    /// the record ended before the field at this offset (counted after the name).
    MissingField { index: usize },
    Ticks(ParseIntError),
    Processor(ParseIntError),
}

// === impl TaskStat ===

impl TaskStat {
    /// offsets of the fields we read, counted from the state field that follows `(comm)`.
    const UTIME: usize = 11;
    const STIME: usize = 12;
    const PROCESSOR: usize = 36;

    /// total time this thread has been scheduled, in either mode.
    pub fn ticks(&self) -> UserHz {
        self.utime + self.stime
    }
}

impl FromStr for TaskStat {
    type Err = TaskStatParseError;
    fn from_str(record: &str) -> Result<Self, Self::Err> {
        use TaskStatParseError::*;

        // the name may itself contain ')', so split at the last one.
        let (_, fields) = record.rsplit_once(')').ok_or(MissingName)?;
        let fields = fields.split_ascii_whitespace().collect::<Vec<_>>();

        let field = |index: usize| fields.get(index).copied().ok_or(MissingField { index });

        let utime = field(Self::UTIME)?.parse::<UserHz>().map_err(Ticks)?;
        let stime = field(Self::STIME)?.parse::<UserHz>().map_err(Ticks)?;
        let processor = field(Self::PROCESSOR)?
            .parse::<u32>()
            .map(CoreId)
            .map_err(Processor)?;

        Ok(Self {
            utime,
            stime,
            processor,
        })
    }
}

// === impl CoreId ===

impl CoreId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// returns this id as an index into a table with `len` slots.
    pub fn index(&self, len: usize) -> Option<usize> {
        usize::try_from(self.0).ok().filter(|i| *i < len)
    }
}

impl FromStr for CoreId {
    type Err = ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// === impl TaskStatParseError ===

impl Display for TaskStatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TaskStatParseError::*;
        match self {
            MissingName => f.write_str("record has no closing ')' after the thread name"),
            MissingField { index } => {
                f.write_fmt(format_args!("record is missing field {index} after the name"))
            }
            Ticks(error) => f.write_fmt(format_args!("invalid tick count: {error}")),
            Processor(error) => f.write_fmt(format_args!("invalid processor: {error}")),
        }
    }
}

impl std::error::Error for TaskStatParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use TaskStatParseError::*;

        match self {
            Ticks(error) | Processor(error) => Some(error),
            MissingName | MissingField { index: _ } => None,
        }
    }
}
