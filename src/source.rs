use std::{
    fs,
    io,
    path::{Path, PathBuf},
    time::Instant,
};

pub use self::{clock::*, procfs::*, sysfs::*};

mod clock {
    use super::*;

    pub trait Clock {
        fn now(&self) -> Instant;
    }

    #[derive(Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> Instant {
            Instant::now()
        }
    }

    #[cfg(test)]
    pub use self::mock::MockClock;

}

/// the process table.
mod procfs {
    use super::*;

    /// a `proc(5)` filesystem.
    pub struct ProcFs {
        root: PathBuf,
    }

    // === impl ProcFs ===

    impl ProcFs {
        pub const ROOT: &str = "/proc";

        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        /// lists the ids of every live process.
        pub fn processes(&self) -> io::Result<Vec<u32>> {
            numeric_entries(&self.root)
        }

        /// lists the ids of every live thread in a process.
        pub fn threads(&self, pid: u32) -> io::Result<Vec<u32>> {
            numeric_entries(&self.task_dir(pid))
        }

        /// reads the raw `stat` record of one thread.
        ///
        /// thread names are arbitrary bytes, so the record is decoded lossily.
        pub fn task_stat(&self, pid: u32, tid: u32) -> io::Result<String> {
            let path = self.task_dir(pid).join(tid.to_string()).join("stat");
            fs::read(path).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        }

        fn task_dir(&self, pid: u32) -> PathBuf {
            self.root.join(pid.to_string()).join("task")
        }
    }

    /// lists the entries of a directory whose names are integers.
    ///
    /// entries that vanish while the directory is being read are skipped.
    fn numeric_entries(dir: &Path) -> io::Result<Vec<u32>> {
        let ids = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
            .collect();

        Ok(ids)
    }
}

/// cpu topology and frequency files.
mod sysfs {
    use {super::*, crate::stat::CoreId};

    /// the `/sys/devices/system/cpu` directory.
    pub struct SysFs {
        root: PathBuf,
    }

    // === impl SysFs ===

    impl SysFs {
        pub const ROOT: &str = "/sys/devices/system/cpu";

        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        /// reads the list of online cpus, e.g. `0-7`.
        pub fn online(&self) -> io::Result<String> {
            fs::read_to_string(self.root.join("online"))
        }

        /// reads the current frequency of a cpu, in kHz.
        pub fn scaling_cur_freq(&self, core: CoreId) -> io::Result<String> {
            let path = self
                .root
                .join(format!("cpu{core}"))
                .join("cpufreq")
                .join("scaling_cur_freq");
            fs::read_to_string(path)
        }
    }
}
