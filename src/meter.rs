use {
    crossterm::{
        QueueableCommand,
        style::{self, Color, Stylize},
    },
    std::{
        io::{self, Write},
        iter::repeat_n,
    },
};

/// a horizontal load bar.
pub struct Meter {
    /// the load to display, in percent.
    pub load: f64,
    /// the number of cells in the bar.
    pub width: usize,
}

/// how busy a cpu is; decides the color of its meter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tier {
    /// at most half loaded.
    Low,
    /// at most 80% loaded.
    Elevated,
    High,
}

/// === impl Meter ===

impl Meter {
    const ACTIVE: char = '█';
    const IDLE: char = '░';
    const BORDER_L: char = '[';
    const BORDER_R: char = ']';

    /// the number of active cells.
    pub fn filled(&self) -> usize {
        let Self { load, width } = *self;
        let cells = (width as f64 * load / 100.0).floor();

        // NaN saturates to zero.
        cells.clamp(0.0, width as f64) as usize
    }

    pub fn tier(&self) -> Tier {
        Tier::of(self.load)
    }

    /// the bar's cells, without borders or color.
    pub fn cells(&self) -> String {
        let active = self.filled();
        repeat_n(Self::ACTIVE, active)
            .chain(repeat_n(Self::IDLE, self.width - active))
            .collect()
    }

    /// queues the bracketed, colored meter onto `writer`.
    pub fn draw(&self, writer: &mut impl Write) -> io::Result<()> {
        let cells = style::style(self.cells()).with(self.tier().color());

        writer
            .queue(style::Print(Self::BORDER_L))?
            .queue(style::PrintStyledContent(cells))?
            .queue(style::Print(Self::BORDER_R))?;

        Ok(())
    }
}

// === impl Tier ===

impl Tier {
    pub fn of(load: f64) -> Self {
        if load <= 50.0 {
            Self::Low
        } else if load <= 80.0 {
            Self::Elevated
        } else {
            Self::High
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Low => Color::DarkGreen,
            Self::Elevated => Color::DarkYellow,
            Self::High => Color::DarkRed,
        }
    }
}
