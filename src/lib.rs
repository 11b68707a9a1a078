//! a per-core cpu load monitor.
//!
//! every thread's scheduler accounting is sampled once per interval, and the ticks each thread
//! accrued are credited to the cpu it last ran on.

use {
    self::{
        recording::CoreDeltas,
        snapshot::Snapshot,
        source::{Clock, ProcFs, SysFs, SystemClock},
        stat::CoreId,
    },
    log::{info, warn},
    std::{
        io::{self, Write},
        time::{Duration, Instant},
    },
};

pub use self::{
    config::Config,
    interrupt::{Interrupt, Trigger},
    provider::{Layout, Report},
    sentinel::Sentinel,
    window::{Frame, Row, Window},
};

mod config;
/// which cpus exist, and how fast they are running.
pub mod cores;
mod interrupt;
/// bars.
mod meter;
/// plain per-cpu load lines, for other programs to read.
mod provider;
/// per-cpu tick deltas between two snapshots.
pub mod recording;
mod sentinel;
/// exponential smoothing of per-cpu load.
pub mod smoother;
/// sampling the process table.
pub mod snapshot;
/// filesystem and clock facilities.
pub mod source;
/// kernel statistics facilities.
///
/// this file provides tools to parse `/proc/<pid>/task/<tid>/stat`.
pub mod stat;
mod window;

pub struct App<C = SystemClock> {
    config: Config,
    clock: C,
    procfs: ProcFs,
    sysfs: SysFs,
    /// the cpus shown, in display order.
    cores: Vec<CoreId>,
}

/// === impl App ===

impl App {
    /// initializes a new application.
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> App<C> {
    pub fn with_clock(config: Config, clock: C) -> Self {
        let procfs = ProcFs::new(&config.proc_root);
        let sysfs = SysFs::new(&config.sys_root);

        let mut shown = cores::online(&sysfs, config.fallback_cores);
        shown.retain(|core| {
            let tracked = core.index(CoreDeltas::MAX).is_some();
            if !tracked {
                warn!("cpu{core} is beyond the {} supported cpus", CoreDeltas::MAX);
            }
            tracked
        });

        Self {
            config,
            clock,
            procfs,
            sysfs,
            cores: shown,
        }
    }

    /// the cpus shown, in display order.
    pub fn cores(&self) -> &[CoreId] {
        &self.cores
    }

    /// returns the state for the first cycle.
    pub fn start(&self) -> Sentinel {
        Sentinel::new(self.clock.now(), self.capacity(), self.config.alpha)
    }

    /// the number of per-cpu slots needed; every cpu shown has one, up to the highest id.
    fn capacity(&self) -> usize {
        self.cores
            .iter()
            .filter_map(|core| core.index(CoreDeltas::MAX))
            .map(|i| i + 1)
            .max()
            .unwrap_or(0)
    }

    /// how long to wait for the next cycle, given when the last one sampled.
    fn remaining(&self, sampled: Instant) -> Duration {
        let elapsed = self.clock.now().saturating_duration_since(sampled);
        self.config.interval.saturating_sub(elapsed)
    }

    /// samples the process table and folds it into `sentinel`.
    ///
    /// returns the state for the next cycle, and the frame to draw.
    pub fn cycle(&self, sentinel: Sentinel) -> (Sentinel, Frame) {
        let Self {
            config,
            clock,
            procfs,
            sysfs,
            cores: shown,
        } = self;

        let snapshot = Snapshot::read(procfs, clock);
        let sentinel = sentinel.advance(snapshot, shown, config.hz);

        let rows = shown
            .iter()
            .map(|&core| Row {
                core,
                load: sentinel.loads().get(core),
                frequency: cores::frequency(sysfs, core),
            })
            .collect();
        let frame = Frame {
            clock: chrono::Local::now().time(),
            rows,
        };

        (sentinel, frame)
    }

    /// runs the application until `interrupt` is raised.
    ///
    /// the terminal is restored even when drawing fails; the first error is returned.
    pub fn run<W: Write>(&self, window: &mut Window<W>, interrupt: &Interrupt) -> io::Result<()> {
        info!("monitoring {} cpus", self.cores.len());
        let watched = window.open().and_then(|()| self.watch(window, interrupt));

        info!("shutting down");
        let closed = window.close();
        watched.and(closed)
    }

    fn watch<W: Write>(&self, window: &mut Window<W>, interrupt: &Interrupt) -> io::Result<()> {
        let mut sentinel = self.start();
        while !interrupt.requested() {
            let (next, frame) = self.cycle(sentinel);
            sentinel = next;

            // a frame sampled while stopping is not drawn.
            if interrupt.requested() {
                break;
            }
            window.draw(&frame)?;

            if interrupt.wait(self.remaining(sentinel.observed_at())) {
                break;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use {
        super::*,
        crate::{source::MockClock, stat::tests::record},
        crossterm::{QueueableCommand, cursor},
        std::{
            cell::Cell,
            fs,
            time::{Duration, Instant},
        },
        tempfile::TempDir,
    };

    /// a fake `/proc` and `/sys/devices/system/cpu`.
    pub(crate) struct Machine {
        proc: TempDir,
        sys: TempDir,
    }

    impl Machine {
        pub(crate) fn new(online: &str) -> Self {
            let machine = Self {
                proc: tempfile::tempdir().unwrap(),
                sys: tempfile::tempdir().unwrap(),
            };
            fs::write(machine.sys.path().join("online"), online).unwrap();
            machine
        }

        pub(crate) fn thread(&self, pid: u32, tid: u32, ticks: u64, core: u32) {
            let dir = self
                .proc
                .path()
                .join(pid.to_string())
                .join("task")
                .join(tid.to_string());
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("stat"), record(tid, "worker", ticks, 0, core)).unwrap();
        }

        pub(crate) fn frequency(&self, core: u32, khz: u64) {
            let dir = self.sys.path().join(format!("cpu{core}")).join("cpufreq");
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("scaling_cur_freq"), format!("{khz}\n")).unwrap();
        }

        pub(crate) fn config(&self) -> Config {
            Config {
                proc_root: self.proc.path().to_owned(),
                sys_root: self.sys.path().to_owned(),
                interval: Duration::ZERO,
                ..Config::default()
            }
        }
    }

    /// a clock that raises an interrupt when it is read for the `n`th time.
    ///
    /// every read is a second later than the last.
    pub(crate) struct InterruptingClock {
        start: Instant,
        reads: Cell<u32>,
        n: usize,
        trigger: Trigger,
    }

    impl InterruptingClock {
        pub(crate) fn new(n: usize, trigger: Trigger) -> Self {
            Self {
                start: Instant::now(),
                reads: Cell::new(0),
                n,
                trigger,
            }
        }
    }

    impl Clock for InterruptingClock {
        fn now(&self) -> Instant {
            let reads = self.reads.get() + 1;
            self.reads.set(reads);
            if reads as usize == self.n {
                self.trigger.fire();
            }
            self.start + Duration::from_secs(u64::from(reads))
        }
    }

    /// a terminal that records what it is sent, and fails its `n`th flush.
    struct FlakyTerminal {
        out: Vec<u8>,
        flushes: usize,
        n: usize,
    }

    impl Write for FlakyTerminal {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.out.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            if self.flushes == self.n {
                return Err(io::ErrorKind::WouldBlock.into());
            }
            Ok(())
        }
    }

    fn load(frame: &Frame, core: u32) -> f64 {
        frame
            .rows
            .iter()
            .find(|row| row.core == CoreId::new(core))
            .map(|row| row.load)
            .unwrap()
    }

    #[test]
    fn cores_follow_online_list() {
        let machine = Machine::new("0-3\n");
        let app = App::new(machine.config());
        assert_eq!(app.cores(), (0..4).map(CoreId::new).collect::<Vec<_>>());
    }

    #[test]
    fn cores_beyond_the_cap_are_hidden() {
        let machine = Machine::new("0-39\n");
        let app = App::new(machine.config());
        assert_eq!(app.cores().len(), CoreDeltas::MAX);
    }

    #[test]
    fn cores_fall_back_when_unreadable() {
        let machine = Machine::new("");
        let app = App::new(machine.config());
        assert_eq!(app.cores(), (0..8).map(CoreId::new).collect::<Vec<_>>());
    }

    #[test]
    fn cycles_attribute_load() {
        let machine = Machine::new("0-3\n");
        machine.thread(10, 10, 100, 2);
        machine.thread(20, 20, 100, 40);
        machine.frequency(2, 2_400_000);

        let start = Instant::now();
        let second = Duration::from_secs(1);
        let clock = MockClock::from_iter([start, start + second, start + second * 2]);
        let app = App::with_clock(machine.config(), clock);

        // the first cycle has nothing to compare against.
        let (sentinel, frame) = app.cycle(app.start());
        assert_eq!(frame.rows.len(), 4);
        assert!(frame.rows.iter().all(|row| row.load == 0.0));

        machine.thread(10, 10, 140, 2);
        machine.thread(20, 20, 900, 40);
        // a thread that appears with a large count is not credited.
        machine.thread(30, 30, 5_000, 1);

        let (_, frame) = app.cycle(sentinel);
        assert!((load(&frame, 2) - 6.0).abs() < 1e-9);
        assert_eq!(load(&frame, 0), 0.0);
        assert_eq!(load(&frame, 1), 0.0);
        assert_eq!(load(&frame, 3), 0.0);

        let row = frame.rows.iter().find(|row| row.core == CoreId::new(2)).unwrap();
        assert_eq!(format!("{:>4.2}", row.frequency), "2.40");
        let row = frame.rows.iter().find(|row| row.core == CoreId::new(0)).unwrap();
        assert_eq!(format!("{:>4.2}", row.frequency), "0.00");
    }

    fn show_and_goodbye() -> Vec<u8> {
        let mut expected = Vec::new();
        expected.queue(cursor::Show).unwrap();
        expected.extend_from_slice(b"\ncorebars stopped.\n");
        expected
    }

    fn run(machine: &Machine, n: usize) -> String {
        let interrupt = Interrupt::new();
        let clock = InterruptingClock::new(n, interrupt.trigger());
        let app = App::with_clock(machine.config(), clock);

        let mut out = Vec::new();
        app.run(&mut Window::new(&mut out, 30), &interrupt).unwrap();

        assert!(out.ends_with(&show_and_goodbye()));
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn interrupt_before_start() {
        let machine = Machine::new("0-1\n");
        let out = run(&machine, 1);
        assert!(!out.contains("corebars - "));
        assert_eq!(out.matches("stopped.").count(), 1);
    }

    #[test]
    fn interrupt_mid_cycle() {
        let machine = Machine::new("0-1\n");
        machine.thread(10, 10, 100, 0);

        // reads: start, then two per cycle (sample, elapsed). the fourth is the second sample.
        let out = run(&machine, 4);
        assert_eq!(out.matches("corebars - ").count(), 1);
        assert_eq!(out.matches("stopped.").count(), 1);
    }

    #[test]
    fn interrupt_while_waiting() {
        let machine = Machine::new("0-1\n");
        let out = run(&machine, 5);
        assert_eq!(out.matches("corebars - ").count(), 2);
        assert_eq!(out.matches("stopped.").count(), 1);
    }

    #[test]
    fn failed_draw_still_restores_the_cursor() {
        let machine = Machine::new("0-1\n");
        let app = App::new(machine.config());

        // the first flush opens the window; the second draws the first frame.
        let mut terminal = FlakyTerminal {
            out: Vec::new(),
            flushes: 0,
            n: 2,
        };
        let result = app.run(&mut Window::new(&mut terminal, 30), &Interrupt::new());

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::WouldBlock);
        assert!(terminal.out.ends_with(&show_and_goodbye()));
        assert_eq!(terminal.flushes, 3);
    }

    #[test]
    fn failed_open_still_restores_the_cursor() {
        let machine = Machine::new("0-1\n");
        let app = App::new(machine.config());

        let mut terminal = FlakyTerminal {
            out: Vec::new(),
            flushes: 0,
            n: 1,
        };
        let result = app.run(&mut Window::new(&mut terminal, 30), &Interrupt::new());

        assert!(result.is_err());
        assert!(!String::from_utf8_lossy(&terminal.out).contains("corebars - "));
        assert!(terminal.out.ends_with(&show_and_goodbye()));
    }
}
