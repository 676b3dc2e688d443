//! # senseled
//!
//! A pixel engine and scrolling text renderer for the 8x8 RGB LED matrix of the Raspberry Pi
//! Sense HAT.
//!
//! The matrix shows up as a framebuffer device (usually `/dev/fb1`) holding 64 little-endian
//! RGB565 cells. `senseled` hides the packing and the mounting rotation behind a small API in
//! logical `(x, y)` coordinates, and draws text with a bitmap font loaded from an image atlas.
//!
//! * [`MatrixSurface`]: rotation-aware pixel operations on any [`FrameDevice`](device::FrameDevice).
//! * [`LedMatrix`]: a surface together with its font, adding `show_letter` and `show_message`.
//! * [`device`]: the real framebuffer, an in-memory device for tests, a terminal preview, and a
//!   recorder that can replay a session later.
//!
//! # Example
//! ```rust ,no_run
//! use senseled::{GlyphStore, LedMatrix, Pixel, ScrollOptions};
//! use senseled::device::FramebufferDevice;
//! use std::time::Duration;
//!
//! let glyphs = GlyphStore::from_files("font/sense_hat_text.png", "font/sense_hat_text.txt")?;
//! let mut matrix = LedMatrix::new(FramebufferDevice::new("/dev/fb1"), glyphs);
//!
//! matrix.set_rotation(180, false)?;
//! matrix.clear_black()?;
//! matrix.set_pixel(3, 4, Pixel::new(255, 0, 0))?;
//! matrix.show_message(
//!     "Hello world",
//!     ScrollOptions::default().with_speed(Duration::from_millis(60)),
//! )?;
//! # Ok::<(), senseled::Error>(())
//! ```
//!
//! Without hardware, a [`TerminalDevice`](device::TerminalDevice) draws the matrix into the
//! terminal instead. Bracket it with [`terminal_setup`] and [`terminal_cleanup`].

pub mod config;
pub mod device;
pub mod error;
pub mod matrix;
pub mod rendering;
pub mod surface;
pub mod text;

pub use config::{FontConfig, MatrixConfig};
pub use device::terminal::{install_panic_handler, terminal_cleanup, terminal_setup};
pub use error::{Error, Result, ValidationError};
pub use matrix::LedMatrix;
pub use rendering::buffer::MatrixBuffer;
pub use rendering::pixel::Pixel;
pub use rendering::rotation::Rotation;
pub use surface::MatrixSurface;
pub use text::glyphs::GlyphStore;
pub use text::{ScrollOptions, TextRenderer};
