use crate::device::FrameDevice;
use std::fs::OpenOptions;
use std::io;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// The matrix framebuffer node, e.g. `/dev/fb1`.
///
/// The node is opened, used and closed again for every single read or write.
#[derive(Clone, Debug)]
pub struct FramebufferDevice {
    path: PathBuf,
}

impl FramebufferDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameDevice for FramebufferDevice {
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        log::trace!(
            "writing {} bytes at {} to {}",
            bytes.len(),
            offset,
            self.path.display()
        );
        let mut file = OpenOptions::new().write(true).open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(bytes)?;
        file.flush()
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().read(true).open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }
}
