use {
    crate::{
        App, Interrupt,
        recording::Recording,
        smoother::raw_load,
        snapshot::Snapshot,
        source::Clock,
        stat::CoreId,
    },
    crossterm::{
        QueueableCommand, cursor,
        terminal::{Clear, ClearType},
    },
    log::info,
    std::io::{self, Write},
};

/// one interval's unsmoothed load, per cpu.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// each cpu shown, with its load in percent.
    pub loads: Vec<(CoreId, f64)>,
}

/// how successive reports are laid out.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Layout {
    /// each report replaces the last one, drawn from the top-left corner.
    Screen,
    /// reports follow one another, each ending with a blank line.
    Stream,
}

// === impl Report ===

impl Report {
    /// computes each cpu's load over `recording`.
    ///
    /// a recording that spans no time has nothing to report.
    pub fn new(recording: &Recording, cores: &[CoreId], hz: u32) -> Option<Self> {
        let elapsed = recording.elapsed();
        let available = elapsed.as_secs_f64() * f64::from(hz);
        if !available.is_finite() || available <= 0.0 {
            return None;
        }

        let loads = cores
            .iter()
            .map(|&core| (core, raw_load(recording.cores.get(core), elapsed, hz)))
            .collect();

        Some(Self { loads })
    }

    /// writes one `<cpu>: <load>` line per cpu, the load rounded to a whole percent.
    pub fn write(&self, out: &mut impl Write, layout: Layout) -> io::Result<()> {
        if layout == Layout::Screen {
            out.queue(cursor::MoveTo(0, 0))?
                .queue(Clear(ClearType::FromCursorDown))?;
        }

        for (core, load) in &self.loads {
            writeln!(out, "{core}: {load:.0}")?;
        }

        if layout == Layout::Stream {
            writeln!(out)?;
        }
        Ok(())
    }
}

// === impl App ===

impl<C: Clock> App<C> {
    /// writes a [`Report`] to `out` once per interval, until `interrupt` is raised.
    ///
    /// loads are not smoothed. the first report compares against an empty snapshot, so
    /// every cpu reads zero.
    pub fn provide<W: Write>(
        &self,
        out: &mut W,
        layout: Layout,
        interrupt: &Interrupt,
    ) -> io::Result<()> {
        info!("providing loads for {} cpus", self.cores.len());

        let capacity = self.capacity();
        let mut last = Snapshot::empty(self.clock.now());
        while !interrupt.requested() {
            let next = Snapshot::read(&self.procfs, &self.clock);
            let recording = Recording::new(&last, &next, capacity);
            last = next;

            if interrupt.requested() {
                break;
            }
            if let Some(report) = Report::new(&recording, &self.cores, self.config.hz) {
                report.write(out, layout)?;
                out.flush()?;
            }

            if interrupt.wait(self.remaining(last.time)) {
                break;
            }
        }

        info!("shutting down");
        out.flush()
    }
}
