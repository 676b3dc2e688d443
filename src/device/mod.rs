//! Device backends for the LED matrix.
//!
//! This module defines the I/O seam of `senseled`:
//!
//! *   [`FrameDevice`] trait: byte-level access to the 128-byte RGB565 framebuffer,
//!     abstracting away where the bytes actually go.
//! *   [`FramebufferDevice`]: the real matrix, a framebuffer node such as `/dev/fb1`.
//! *   [`MemoryDevice`]: an in-memory framebuffer, for tests and dry runs.
//! *   [`TerminalDevice`]: an in-memory framebuffer that draws itself to a terminal
//!     using `crossterm`, for previewing without hardware.
//! *   [`RecordingDevice`]: wraps another device and records every write so it can be
//!     saved and replayed later.
//!
//! Offsets and lengths are in bytes. A full frame is written at offset 0; a single pixel is
//! 2 bytes at twice its physical cell index.

pub mod framebuffer;
pub mod memory;
pub mod recorder;
pub mod terminal;

pub use framebuffer::FramebufferDevice;
pub use memory::MemoryDevice;
pub use recorder::{RecordedWrite, Recording, RecordingDevice};
pub use terminal::TerminalDevice;

use std::io;

/// Byte-level access to a packed-pixel framebuffer.
///
/// Implementors must not hold any OS handle open between calls that the next call relies on;
/// every call is a complete read or write.
pub trait FrameDevice {
    /// Writes `bytes` starting at byte `offset`.
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()>;

    /// Fills `buf` with the bytes starting at byte `offset`.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()>;
}

impl<D: FrameDevice + ?Sized> FrameDevice for Box<D> {
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        (**self).write_at(offset, bytes)
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_at(offset, buf)
    }
}

impl<D: FrameDevice + ?Sized> FrameDevice for &mut D {
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        (**self).write_at(offset, bytes)
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_at(offset, buf)
    }
}
