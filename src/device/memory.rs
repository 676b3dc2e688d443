use crate::device::FrameDevice;
use crate::rendering::codec::{FRAME_BYTES, PackedFrame};
use std::io;

/// An in-memory framebuffer.
///
/// Besides the current contents, it keeps every full frame that was written, in order, so
/// animations can be inspected after the fact. Long-running users that never look at the
/// history should turn it off with [`MemoryDevice::without_history`].
#[derive(Clone, Debug)]
pub struct MemoryDevice {
    frame: PackedFrame,
    history: Vec<PackedFrame>,
    keep_history: bool,
    writes: usize,
}

impl Default for MemoryDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDevice {
    /// A blank (all black) framebuffer.
    pub fn new() -> Self {
        Self::with_frame([0; FRAME_BYTES])
    }

    pub fn with_frame(frame: PackedFrame) -> Self {
        Self {
            frame,
            history: vec![],
            keep_history: true,
            writes: 0,
        }
    }

    /// Stops recording full frames; [`history`](Self::history) stays empty.
    pub fn without_history(mut self) -> Self {
        self.keep_history = false;
        self.history = vec![];
        self
    }

    /// The current contents of the framebuffer.
    pub fn frame(&self) -> &PackedFrame {
        &self.frame
    }

    /// Every full frame written so far, oldest first.
    pub fn history(&self) -> &[PackedFrame] {
        &self.history
    }

    /// Number of writes of any size.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.writes = 0;
    }

    fn range(offset: u64, len: usize) -> io::Result<std::ops::Range<usize>> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        match start.checked_add(len) {
            Some(end) if end <= FRAME_BYTES => Ok(start..end),
            _ => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{len} bytes at offset {offset} exceed the {FRAME_BYTES} byte framebuffer"),
            )),
        }
    }
}

impl FrameDevice for MemoryDevice {
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        let range = Self::range(offset, bytes.len())?;
        self.frame[range].copy_from_slice(bytes);
        self.writes += 1;
        if self.keep_history && offset == 0 && bytes.len() == FRAME_BYTES {
            self.history.push(self.frame);
        }
        Ok(())
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let range = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.frame[range]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_tracks_full_frames_only() {
        let mut device = MemoryDevice::new();
        device.write_at(0, &[1; FRAME_BYTES]).unwrap();
        device.write_at(4, &[2, 2]).unwrap();
        device.write_at(0, &[3; FRAME_BYTES]).unwrap();

        assert_eq!(device.write_count(), 3);
        assert_eq!(device.history().len(), 2);
        assert_eq!(device.history()[0], [1; FRAME_BYTES]);
        assert_eq!(device.frame()[4], 3);
    }

    #[test]
    fn test_without_history() {
        let mut device = MemoryDevice::new().without_history();
        for i in 0..10 {
            device.write_at(0, &[i; FRAME_BYTES]).unwrap();
        }
        assert!(device.history().is_empty());
        assert_eq!(device.write_count(), 10);
        assert_eq!(device.frame(), &[9; FRAME_BYTES]);
    }

    #[test]
    fn test_out_of_range() {
        let mut device = MemoryDevice::new();
        assert!(device.write_at(127, &[0, 0]).is_err());
        assert!(device.read_at(200, &mut [0; 2]).is_err());
        assert!(device.read_at(126, &mut [0; 2]).is_ok());
        assert_eq!(device.write_count(), 0);
    }
}
