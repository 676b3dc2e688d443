//! Recording and replaying device writes.
//!
//! [`RecordingDevice`] sits between a surface and the real device, forwarding everything and
//! remembering each write together with the time it happened. The resulting [`Recording`]
//! can be saved with `bincode` and replayed later onto any [`FrameDevice`], with the original
//! timing.

use crate::device::FrameDevice;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    /// Byte offset of the write.
    pub offset: u64,
    pub bytes: Vec<u8>,
    /// The offset in ns from the start of the recording
    pub ns_offset: u128,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Recording {
    pub writes: Vec<RecordedWrite>,
    /// The time at which the recording stopped relative to its start.
    /// This is the same as the duration of the recording.
    pub duration_ns_offset: u128,
}

impl Recording {
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(bincode::deserialize_from(io::BufReader::new(file))?)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = io::BufWriter::new(std::fs::File::create(path)?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        duration_from_ns(self.duration_ns_offset)
    }

    /// Plays every write back onto `device`, sleeping so each lands at its recorded time.
    pub fn replay(&self, device: &mut impl FrameDevice) -> Result<()> {
        let start = Instant::now();
        for write in &self.writes {
            let due = duration_from_ns(write.ns_offset);
            if let Some(wait) = due.checked_sub(start.elapsed()) {
                std::thread::sleep(wait);
            }
            device.write_at(write.offset, &write.bytes)?;
        }
        if let Some(wait) = self.duration().checked_sub(start.elapsed()) {
            std::thread::sleep(wait);
        }
        log::debug!("replayed {} writes", self.writes.len());
        Ok(())
    }

    /// Plays every write back onto `device` immediately, ignoring the timing.
    pub fn replay_instant(&self, device: &mut impl FrameDevice) -> Result<()> {
        for write in &self.writes {
            device.write_at(write.offset, &write.bytes)?;
        }
        Ok(())
    }
}

fn duration_from_ns(ns: u128) -> Duration {
    Duration::from_nanos(u64::try_from(ns).unwrap_or(u64::MAX))
}

/// Forwards to `inner` and records every successful write.
pub struct RecordingDevice<D> {
    inner: D,
    recording: Recording,
    start_time: Instant,
}

impl<D: FrameDevice> RecordingDevice<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            recording: Recording::default(),
            start_time: Instant::now(),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Stops the clock and hands back the wrapped device and the recording.
    pub fn finish(mut self) -> (D, Recording) {
        self.recording.duration_ns_offset = self.start_time.elapsed().as_nanos();
        (self.inner, self.recording)
    }
}

impl<D: FrameDevice> FrameDevice for RecordingDevice<D> {
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_at(offset, bytes)?;
        let ns_offset = self.start_time.elapsed().as_nanos();
        self.recording.writes.push(RecordedWrite {
            offset,
            bytes: bytes.to_vec(),
            ns_offset,
        });
        Ok(())
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_at(offset, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemoryDevice;
    use crate::rendering::codec::FRAME_BYTES;

    #[test]
    fn test_records_successful_writes() {
        let mut device = RecordingDevice::new(MemoryDevice::new());
        device.write_at(0, &[7; FRAME_BYTES]).unwrap();
        device.write_at(6, &[1, 2]).unwrap();
        assert!(device.write_at(300, &[1, 2]).is_err());

        let (memory, recording) = device.finish();
        assert_eq!(recording.writes.len(), 2);
        assert_eq!(recording.writes[1].offset, 6);
        assert!(recording.writes[0].ns_offset <= recording.writes[1].ns_offset);
        assert!(recording.writes[1].ns_offset <= recording.duration_ns_offset);
        assert_eq!(memory.write_count(), 2);
    }

    #[test]
    fn test_save_load_replay() {
        let mut device = RecordingDevice::new(MemoryDevice::new());
        device.write_at(0, &[9; FRAME_BYTES]).unwrap();
        device.write_at(0, &[0x10, 0x20]).unwrap();
        let (original, recording) = device.finish();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recordings").join("scroll.bin");
        recording.save_to_file(&path).unwrap();
        let loaded = Recording::read_from_file(&path).unwrap();
        assert_eq!(loaded, recording);

        let mut replayed = MemoryDevice::new();
        loaded.replay(&mut replayed).unwrap();
        assert_eq!(replayed.frame(), original.frame());

        let mut instant = MemoryDevice::new();
        loaded.replay_instant(&mut instant).unwrap();
        assert_eq!(instant.frame(), original.frame());
    }

    #[test]
    fn test_reading_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, [0xFF; 3]).unwrap();
        assert!(Recording::read_from_file(&path).is_err());
    }
}
