//! Paints random pixels in the terminal preview, turning the picture a quarter every second.
//!
//! cargo run --example rainbow
//!
//! Press any key to quit.

use crossterm::event::{Event, poll, read};
use senseled::device::TerminalDevice;
use senseled::{MatrixSurface, Pixel, install_panic_handler, terminal_cleanup, terminal_setup};
use std::time::{Duration, Instant};

fn main() -> senseled::Result<()> {
    terminal_setup()?;
    install_panic_handler();

    let result = run();

    terminal_cleanup()?;
    result
}

fn run() -> senseled::Result<()> {
    let device = TerminalDevice::new_with_stdout().with_origin(2, 1).with_scale(4);
    let mut surface = MatrixSurface::new(device);
    surface.clear(Pixel::new(0, 0, 32))?;

    let mut degrees = 0;
    let mut last_turn = Instant::now();
    loop {
        if poll(Duration::from_millis(30))? {
            if let Event::Key(_) = read()? {
                break;
            }
        }

        let x = rand::random::<usize>() % 8;
        let y = rand::random::<usize>() % 8;
        let color = [rand::random::<u8>(), rand::random::<u8>(), rand::random::<u8>()];
        surface.set_pixel(x, y, color)?;

        if last_turn.elapsed() >= Duration::from_secs(1) {
            degrees = (degrees + 90) % 360;
            surface.set_rotation(degrees, true)?;
            last_turn = Instant::now();
        }
    }
    Ok(())
}
