//! Terminal preview of the matrix.
//!
//! [`TerminalDevice`] behaves like a [`MemoryDevice`], and after every write it draws the
//! framebuffer to a terminal sink using `crossterm`. Two matrix rows share one terminal line:
//! each cell prints `▀` with the upper LED as foreground and the lower LED as background
//! colour, which keeps the LEDs roughly square. Only cells that changed since the last draw
//! are sent.
//!
//! Interactive use should be bracketed by [`terminal_setup`] and [`terminal_cleanup`], with
//! [`install_panic_handler`] in between so a panic does not leave the terminal in the
//! alternate screen.

use crate::device::{FrameDevice, MemoryDevice};
use crate::rendering::buffer::MatrixBuffer;
use crate::rendering::codec;
use crate::rendering::pixel::Pixel;
use crate::rendering::rotation::MATRIX_SIZE;
use crossterm::style::{Color, Colors, Print, ResetColor, SetColors};
use crossterm::{cursor, execute, queue};
use std::io;
use std::io::{Write, stdout};

/// A framebuffer that draws itself to a terminal.
pub struct TerminalDevice<W: Write> {
    memory: MemoryDevice,
    /// What is currently on screen, `None` before the first draw.
    drawn: Option<Vec<(Pixel, Pixel)>>,
    origin: (u16, u16),
    scale: usize,
    sink: W,
}

impl TerminalDevice<io::Stdout> {
    pub fn new_with_stdout() -> Self {
        Self::new_with_sink(stdout())
    }
}

impl<W: Write> TerminalDevice<W> {
    /// Creates a preview that renders to `sink`, e.g. `stdout` or an in-memory buffer.
    pub fn new_with_sink(sink: W) -> Self {
        Self {
            memory: MemoryDevice::new().without_history(),
            drawn: None,
            origin: (0, 0),
            scale: 2,
            sink,
        }
    }

    /// Moves the top left corner of the preview.
    pub fn with_origin(mut self, column: u16, row: u16) -> Self {
        self.origin = (column, row);
        self.drawn = None;
        self
    }

    /// Sets how many terminal columns (and half lines) one LED takes. At least 1.
    pub fn with_scale(mut self, scale: usize) -> Self {
        self.scale = scale.max(1);
        self.drawn = None;
        self
    }

    /// Width of the preview in terminal columns.
    pub fn width(&self) -> usize {
        MATRIX_SIZE * self.scale
    }

    /// Height of the preview in terminal lines.
    pub fn height(&self) -> usize {
        MATRIX_SIZE * self.scale / 2
    }

    pub fn memory(&self) -> &MemoryDevice {
        &self.memory
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }

    /// The LED colour behind half line `half_row`, terminal column `column`.
    fn led(&self, physical: &MatrixBuffer, column: usize, half_row: usize) -> Pixel {
        physical
            .get(column / self.scale, half_row / self.scale)
            .copied()
            .unwrap_or(Pixel::BLACK)
    }

    /// Draws the current framebuffer contents, skipping cells that did not change.
    pub fn redraw(&mut self) -> io::Result<()> {
        let physical = codec::decode_frame(self.memory.frame());
        let cells: Vec<(Pixel, Pixel)> = (0..self.height())
            .flat_map(|row| (0..self.width()).map(move |column| (row, column)))
            .map(|(row, column)| {
                (
                    self.led(&physical, column, 2 * row),
                    self.led(&physical, column, 2 * row + 1),
                )
            })
            .collect();

        let width = self.width();
        for (idx, &(top, bottom)) in cells.iter().enumerate() {
            if let Some(drawn) = &self.drawn {
                if drawn[idx] == (top, bottom) {
                    continue;
                }
            }
            let column = self.origin.0 + (idx % width) as u16;
            let row = self.origin.1 + (idx / width) as u16;
            queue!(
                self.sink,
                cursor::MoveTo(column, row),
                SetColors(Colors {
                    foreground: Some(to_terminal_color(top)),
                    background: Some(to_terminal_color(bottom)),
                }),
                Print('▀'),
            )?;
        }
        queue!(self.sink, ResetColor)?;
        self.sink.flush()?;
        self.drawn = Some(cells);
        Ok(())
    }
}

fn to_terminal_color(pixel: Pixel) -> Color {
    Color::Rgb {
        r: pixel.r,
        g: pixel.g,
        b: pixel.b,
    }
}

impl<W: Write> FrameDevice for TerminalDevice<W> {
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        self.memory.write_at(offset, bytes)?;
        self.redraw()
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.memory.read_at(offset, buf)
    }
}

/// Prepares the terminal for a live preview.
///
/// Enters the alternate screen, enables raw mode and hides the cursor. Call
/// [`terminal_cleanup`] when done.
///
/// Note: If you are stuck in a bad terminal state, you can try running `reset` in the terminal.
pub fn terminal_setup() -> io::Result<()> {
    let mut stdout = stdout();

    execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    crossterm::terminal::enable_raw_mode()?;
    execute!(stdout, cursor::Hide)?;

    Ok(())
}

/// Undoes everything done by [`terminal_setup`].
pub fn terminal_cleanup() -> io::Result<()> {
    let mut stdout = stdout();
    execute!(stdout, cursor::Show)?;
    execute!(
        stdout,
        crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
    )?;

    crossterm::terminal::disable_raw_mode()?;

    execute!(stdout, crossterm::terminal::LeaveAlternateScreen)?;

    Ok(())
}

/// Installs a panic handler that cleans up the terminal before panicking.
///
/// Without this, the panic message would not be displayed properly because we're in raw mode
/// and in the alternate screen.
pub fn install_panic_handler() {
    let old_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |pinfo| {
        let _ = terminal_cleanup();
        eprintln!("{}", pinfo);
        old_hook(pinfo);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::codec::FRAME_BYTES;

    fn count_blocks(bytes: &[u8]) -> usize {
        String::from_utf8_lossy(bytes).matches('▀').count()
    }

    #[test]
    fn test_first_write_draws_everything() {
        let mut device = TerminalDevice::new_with_sink(Vec::new()).with_scale(1);
        device.write_at(0, &[0; FRAME_BYTES]).unwrap();
        // 8 columns, 4 lines
        assert_eq!(count_blocks(device.sink()), 32);
    }

    #[test]
    fn test_only_changed_cells_are_redrawn() {
        let mut device = TerminalDevice::new_with_sink(Vec::new()).with_scale(1);
        device.write_at(0, &[0; FRAME_BYTES]).unwrap();
        let before = device.sink().len();

        device.write_at(0, &[0xFF, 0xFF]).unwrap();
        let redrawn = count_blocks(&device.sink()[before..]);
        assert_eq!(redrawn, 1);
    }

    #[test]
    fn test_preview_keeps_no_history() {
        let mut device = TerminalDevice::new_with_sink(Vec::new()).with_scale(1);
        for _ in 0..100 {
            device.write_at(0, &[0x11; FRAME_BYTES]).unwrap();
        }
        assert!(device.memory().history().is_empty());
        assert_eq!(device.memory().write_count(), 100);

        let output = device.into_sink();
        // only the first write changes anything on screen
        assert_eq!(count_blocks(&output), 32);
    }

    #[test]
    fn test_scaled_size() {
        let device = TerminalDevice::new_with_sink(Vec::new());
        assert_eq!(device.width(), 16);
        assert_eq!(device.height(), 8);
        let device = TerminalDevice::new_with_sink(Vec::new()).with_scale(3);
        assert_eq!(device.height(), 12);
    }

    #[test]
    fn test_reads_come_from_memory() {
        let mut device = TerminalDevice::new_with_sink(Vec::new());
        device.write_at(2, &[0x1F, 0x00]).unwrap();
        let mut buf = [0; 2];
        device.read_at(2, &mut buf).unwrap();
        assert_eq!(buf, [0x1F, 0x00]);
        assert_eq!(device.memory().write_count(), 1);
    }
}
