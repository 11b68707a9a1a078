//! writes each cpu's load as plain `<cpu>: <load>` lines, once per second.
//!
//! this is meant to be read by another program, e.g. a status bar or a widget.

use {
    anyhow::{Context, Result},
    corebars::{App, Config, Interrupt, Layout},
    crossterm::tty::IsTty,
    std::io::{self, BufWriter},
};

fn main() -> Result<()> {
    env_logger::init();

    let interrupt = Interrupt::new();
    interrupt
        .install()
        .context("could not install the interrupt handler")?;

    let stdout = io::stdout();
    let layout = if stdout.is_tty() {
        Layout::Screen
    } else {
        Layout::Stream
    };

    App::new(Config::default())
        .provide(&mut BufWriter::new(stdout), layout, &interrupt)
        .context("could not write to stdout")
}
