//! Rotation-aware pixel operations on a [`FrameDevice`].
//!
//! A [`MatrixSurface`] owns a device and the current [`Rotation`]. Callers always work in
//! logical coordinates; the surface converts to physical cell order on the way out and back
//! on the way in. Full frames are written with a single 128-byte write, single pixels with a
//! single 2-byte write at the pixel's physical offset, so other cells are never touched.
//!
//! Validation always happens before the device is touched.

use crate::device::FrameDevice;
use crate::error::{Result, ValidationError};
use crate::rendering::buffer::MatrixBuffer;
use crate::rendering::codec::{self, BYTES_PER_PIXEL, FRAME_BYTES};
use crate::rendering::pixel::Pixel;
use crate::rendering::rotation::{MATRIX_SIZE, Rotation};
use std::ops::{Deref, DerefMut};
use std::path::Path;

pub struct MatrixSurface<D> {
    device: D,
    rotation: Rotation,
}

impl<D: FrameDevice> MatrixSurface<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            rotation: Rotation::default(),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Sets the viewing rotation from an angle in degrees.
    ///
    /// With `redraw`, the current picture is read back under the old rotation and written
    /// again under the new one, so it keeps its logical orientation.
    pub fn set_rotation(&mut self, degrees: i64, redraw: bool) -> Result<()> {
        let rotation = Rotation::from_degrees(degrees)?;
        if redraw {
            let pixels = self.get_pixels()?;
            self.rotation = rotation;
            self.set_pixels(&pixels)?;
        } else {
            self.rotation = rotation;
        }
        log::debug!("matrix rotation set to {}", rotation);
        Ok(())
    }

    /// Switches to `rotation` until the returned guard is dropped.
    ///
    /// The previous rotation comes back on every exit path, including early returns and panics.
    pub fn rotate_scoped(&mut self, rotation: Rotation) -> RotationGuard<'_, D> {
        let previous = std::mem::replace(&mut self.rotation, rotation);
        RotationGuard {
            surface: self,
            previous,
        }
    }

    /// Writes a whole frame.
    pub fn set_pixels(&mut self, pixels: &MatrixBuffer) -> Result<()> {
        let frame = codec::encode(&pixels.to_physical(self.rotation));
        log::trace!("writing frame at rotation {}", self.rotation);
        self.device.write_at(0, &frame)?;
        Ok(())
    }

    /// Reads the whole frame back, in logical order.
    pub fn get_pixels(&mut self) -> Result<MatrixBuffer> {
        let mut frame = [0; FRAME_BYTES];
        self.device.read_at(0, &mut frame)?;
        Ok(codec::decode_frame(&frame).from_physical(self.rotation))
    }

    /// Updates the single pixel at `(x, y)`; top left is `(0, 0)`, bottom right `(7, 7)`.
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: impl Into<Pixel>) -> Result<()> {
        let offset = self.byte_offset(x, y)?;
        let packed = codec::encode_pixel(pixel.into()).to_le_bytes();
        self.device.write_at(offset, &packed)?;
        Ok(())
    }

    /// Like [`set_pixel`](Self::set_pixel), for channels that still need range checking.
    pub fn set_pixel_channels(&mut self, x: usize, y: usize, channels: [i64; 3]) -> Result<()> {
        let pixel = Pixel::from_channels(channels)?;
        self.set_pixel(x, y, pixel)
    }

    /// Reads the single pixel at `(x, y)`.
    pub fn get_pixel(&mut self, x: usize, y: usize) -> Result<Pixel> {
        let offset = self.byte_offset(x, y)?;
        let mut packed = [0; BYTES_PER_PIXEL];
        self.device.read_at(offset, &mut packed)?;
        Ok(codec::decode_pixel(u16::from_le_bytes(packed)))
    }

    fn byte_offset(&self, x: usize, y: usize) -> Result<u64> {
        if x >= MATRIX_SIZE {
            return Err(ValidationError::XRange(x as i64).into());
        }
        if y >= MATRIX_SIZE {
            return Err(ValidationError::YRange(y as i64).into());
        }
        Ok((self.rotation.offset(x, y) * BYTES_PER_PIXEL) as u64)
    }

    /// Mirrors the matrix left to right and returns the mirrored picture.
    pub fn flip_h(&mut self, redraw: bool) -> Result<MatrixBuffer> {
        let flipped = self.get_pixels()?.flipped_h();
        if redraw {
            self.set_pixels(&flipped)?;
        }
        Ok(flipped)
    }

    /// Mirrors the matrix top to bottom and returns the mirrored picture.
    pub fn flip_v(&mut self, redraw: bool) -> Result<MatrixBuffer> {
        let flipped = self.get_pixels()?.flipped_v();
        if redraw {
            self.set_pixels(&flipped)?;
        }
        Ok(flipped)
    }

    /// Fills the matrix with one colour.
    pub fn clear(&mut self, color: impl Into<Pixel>) -> Result<()> {
        self.set_pixels(&MatrixBuffer::filled(color.into()))
    }

    /// Turns every LED off.
    pub fn clear_black(&mut self) -> Result<()> {
        self.clear(Pixel::BLACK)
    }

    /// Loads an 8x8 image file and optionally shows it.
    ///
    /// Square images of any size are scaled down to 8x8 first. Anything that does not end up
    /// with exactly 64 pixels is rejected.
    pub fn load_image(&mut self, path: impl AsRef<Path>, redraw: bool) -> Result<MatrixBuffer> {
        let mut image = image::open(path.as_ref())?;
        if image.width() == image.height() && image.width() != MATRIX_SIZE as u32 {
            image = image.thumbnail(MATRIX_SIZE as u32, MATRIX_SIZE as u32);
        }
        let image = image.to_rgb8();
        let (width, height) = image.dimensions();
        if width as usize * height as usize != MATRIX_SIZE * MATRIX_SIZE {
            return Err(ValidationError::ImageSize { width, height }.into());
        }
        let pixels: Vec<Pixel> = image.pixels().map(|p| Pixel::from(*p)).collect();
        let buffer = MatrixBuffer::try_from(pixels)?;
        if redraw {
            self.set_pixels(&buffer)?;
        }
        Ok(buffer)
    }
}

/// A temporary rotation, see [`MatrixSurface::rotate_scoped`].
pub struct RotationGuard<'a, D: FrameDevice> {
    surface: &'a mut MatrixSurface<D>,
    previous: Rotation,
}

impl<D: FrameDevice> RotationGuard<'_, D> {
    /// The rotation that will be restored.
    pub fn previous(&self) -> Rotation {
        self.previous
    }
}

impl<D: FrameDevice> Deref for RotationGuard<'_, D> {
    type Target = MatrixSurface<D>;

    fn deref(&self) -> &Self::Target {
        self.surface
    }
}

impl<D: FrameDevice> DerefMut for RotationGuard<'_, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.surface
    }
}

impl<D: FrameDevice> Drop for RotationGuard<'_, D> {
    fn drop(&mut self) {
        self.surface.rotation = self.previous;
    }
}
