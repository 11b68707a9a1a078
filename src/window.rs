use {
    crate::{cores::Frequency, meter::Meter, stat::CoreId},
    chrono::NaiveTime,
    crossterm::{
        QueueableCommand, cursor,
        style::Print,
        terminal::{Clear, ClearType},
    },
    std::io::{self, Write},
};

/// one drawing of the dashboard.
#[derive(Clone, Debug)]
pub struct Frame {
    /// the wall-clock time shown in the header.
    pub clock: NaiveTime,
    pub rows: Vec<Row>,
}

/// one cpu's line of the dashboard.
#[derive(Clone, Debug)]
pub struct Row {
    pub core: CoreId,
    pub load: f64,
    pub frequency: Frequency,
}

/// the terminal the dashboard is drawn on.
pub struct Window<W> {
    out: W,
    /// the number of cells in each meter.
    width: usize,
}

// === impl Window ===

impl<W: Write> Window<W> {
    const TITLE: &str = "corebars";
    const RULE: &str = "============================================================";

    pub fn new(out: W, width: usize) -> Self {
        Self { out, width }
    }

    /// prepares the terminal: hides the cursor and clears the screen once.
    pub fn open(&mut self) -> io::Result<()> {
        self.out
            .queue(cursor::Hide)?
            .queue(Clear(ClearType::All))?
            .flush()
    }

    /// redraws the dashboard in place, starting from the top-left corner.
    pub fn draw(&mut self, Frame { clock, rows }: &Frame) -> io::Result<()> {
        let Self { out, width } = self;

        out.queue(cursor::MoveTo(0, 0))?;
        Self::line(out, format!("{} - {}", Self::TITLE, clock.format("%H:%M:%S")))?;
        Self::line(out, Self::RULE)?;

        for Row {
            core,
            load,
            frequency,
        } in rows
        {
            out.queue(Print(format!("Core {:<2} ", core.as_u32())))?;
            Meter {
                load: *load,
                width: *width,
            }
            .draw(out)?;
            Self::line(out, format!(" {load:>6.1}%  @ {frequency:>4.2} GHz"))?;
        }

        Self::line(out, Self::RULE)?;

        // anything below the table is left over from an earlier, taller frame.
        out.queue(Clear(ClearType::FromCursorDown))?.flush()
    }

    /// restores the cursor and says goodbye.
    pub fn close(&mut self) -> io::Result<()> {
        self.out
            .queue(cursor::Show)?
            .queue(Print(format!("\n{} stopped.\n", Self::TITLE)))?
            .flush()
    }

    /// prints the rest of a line, erasing whatever an earlier frame left after it.
    fn line(out: &mut W, text: impl std::fmt::Display) -> io::Result<()> {
        out.queue(Print(text))?
            .queue(Clear(ClearType::UntilNewLine))?
            .queue(Print('\n'))?;
        Ok(())
    }
}
