use {
    crate::{
        source::{Clock, ProcFs},
        stat::{CoreId, TaskStat, TaskStatParseError, UserHz},
    },
    log::{debug, trace, warn},
    std::{
        collections::BTreeMap,
        fmt::{self, Display},
        io,
        time::Instant,
    },
};

/// identifies one schedulable thread.
///
/// ids may be reused once a thread exits, so this is only unique between two observations.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ThreadId {
    pub pid: u32,
    pub tid: u32,
}

/// one thread's accounting at a moment in time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ThreadSample {
    /// cumulative time scheduled, in user and kernel mode.
    pub ticks: UserHz,
    /// the cpu this thread last ran on.
    pub core: CoreId,
}

/// a snapshot of every thread's statistics at a moment in time.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub threads: BTreeMap<ThreadId, ThreadSample>,
    pub time: Instant,
    /// threads and processes that could not be sampled.
    pub skipped: Skipped,
}

/// why a thread (or a process's whole thread list) was left out of a snapshot.
#[derive(Debug)]
pub enum Skip {
    /// the thread exited while the table was being walked.
    Exited,
    Denied,
    Unreadable(io::ErrorKind),
    Malformed(TaskStatParseError),
}

/// a tally of [`Skip`]s, by reason.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Skipped {
    pub exited: usize,
    pub denied: usize,
    pub unreadable: usize,
    pub malformed: usize,
}

// === impl Snapshot ===

impl Snapshot {
    /// a snapshot in which no threads were observed.
    pub fn empty(time: Instant) -> Self {
        Self {
            threads: BTreeMap::new(),
            time,
            skipped: Skipped::default(),
        }
    }

    /// walks the process table, sampling every live thread.
    ///
    /// this never fails: anything that cannot be read is skipped, and tallied in
    /// [`Snapshot::skipped`].
    pub fn read(procfs: &ProcFs, clock: &impl Clock) -> Snapshot {
        let mut snapshot = Self::empty(clock.now());

        let pids = match procfs.processes() {
            Ok(pids) => pids,
            Err(error) => {
                warn!("could not list processes: {error}");
                return snapshot;
            }
        };

        for pid in pids {
            let tids = match procfs.threads(pid) {
                Ok(tids) => tids,
                Err(error) => {
                    let skip = Skip::from(error);
                    trace!("skipping process {pid}: {skip}");
                    snapshot.skipped.count(&skip);
                    continue;
                }
            };

            for tid in tids {
                let id = ThreadId { pid, tid };
                match Self::sample(procfs, id) {
                    Ok(sample) => {
                        snapshot.threads.insert(id, sample);
                    }
                    Err(skip) => {
                        trace!("skipping thread {id}: {skip}");
                        snapshot.skipped.count(&skip);
                    }
                }
            }
        }

        debug!(
            "sampled {} threads; skipped {:?}",
            snapshot.threads.len(),
            snapshot.skipped
        );

        snapshot
    }

    fn sample(procfs: &ProcFs, ThreadId { pid, tid }: ThreadId) -> Result<ThreadSample, Skip> {
        let stat = procfs.task_stat(pid, tid)?.parse::<TaskStat>()?;

        Ok(ThreadSample {
            ticks: stat.ticks(),
            core: stat.processor,
        })
    }
}

// === impl ThreadId ===

impl Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { pid, tid } = self;
        f.write_fmt(format_args!("{pid}/{tid}"))
    }
}

// === impl Skip ===

impl From<io::Error> for Skip {
    fn from(error: io::Error) -> Self {
        // a thread that exits between listing and reading may report either of these.
        if error.raw_os_error() == Some(libc::ESRCH) {
            return Self::Exited;
        }

        match error.kind() {
            io::ErrorKind::NotFound => Self::Exited,
            io::ErrorKind::PermissionDenied => Self::Denied,
            kind => Self::Unreadable(kind),
        }
    }
}

impl From<TaskStatParseError> for Skip {
    fn from(error: TaskStatParseError) -> Self {
        Self::Malformed(error)
    }
}

impl Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited => f.write_str("exited"),
            Self::Denied => f.write_str("permission denied"),
            Self::Unreadable(kind) => f.write_fmt(format_args!("unreadable: {kind}")),
            Self::Malformed(error) => f.write_fmt(format_args!("malformed record: {error}")),
        }
    }
}

// === impl Skipped ===

impl Skipped {
    pub fn count(&mut self, skip: &Skip) {
        let slot = match skip {
            Skip::Exited => &mut self.exited,
            Skip::Denied => &mut self.denied,
            Skip::Unreadable(_) => &mut self.unreadable,
            Skip::Malformed(_) => &mut self.malformed,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        let Self {
            exited,
            denied,
            unreadable,
            malformed,
        } = *self;

        exited + denied + unreadable + malformed
    }
}
