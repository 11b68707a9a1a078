//! a per-core cpu load monitor.

use {
    anyhow::{Context, Result},
    corebars::{App, Config, Interrupt, Window},
    std::io::{self, BufWriter},
};

fn main() -> Result<()> {
    env_logger::init();

    let interrupt = Interrupt::new();
    interrupt
        .install()
        .context("could not install the interrupt handler")?;

    let config = Config::default();
    let mut window = Window::new(BufWriter::new(io::stdout()), config.width);

    App::new(config)
        .run(&mut window, &interrupt)
        .context("could not draw to the terminal")
}
