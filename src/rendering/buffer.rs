//! 8x8 pixel buffer for the LED matrix.
//!
//! This module defines the `MatrixBuffer` struct, which holds exactly one frame of
//! [`Pixel`] data before it is packed and written to the device.
//!
//! The `MatrixBuffer` is a fixed 8x8 grid stored row-major. It provides methods for:
//!
//! *   Building a buffer from loosely shaped caller data, with validation.
//! *   Accessing and modifying individual pixels at specific coordinates.
//! *   Mirroring the buffer horizontally or vertically.
//! *   Turning it by quarter turns, to move between logical and physical cell order.

use crate::error::{Error, Result, ValidationError};
use crate::rendering::pixel::Pixel;
use crate::rendering::rotation::{MATRIX_SIZE, Rotation};
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::ops::{Index, IndexMut};

/// Number of cells in the matrix.
pub const CELL_COUNT: usize = MATRIX_SIZE * MATRIX_SIZE;

/// A full 8x8 frame of pixels.
///
/// # Example
///
/// ```rust
/// use senseled::rendering::buffer::MatrixBuffer;
/// use senseled::rendering::pixel::Pixel;
///
/// let mut buffer = MatrixBuffer::filled(Pixel::BLACK);
///
/// // Set the pixel in column 2, row 3
/// buffer[(2, 3)] = Pixel::new(255, 0, 0);
///
/// assert_eq!(buffer[(2, 3)], Pixel::new(255, 0, 0));
/// assert_eq!(buffer.flipped_h()[(5, 3)], Pixel::new(255, 0, 0));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixBuffer {
    pixels: [Pixel; CELL_COUNT],
}

impl Debug for MatrixBuffer {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "MatrixBuffer [")?;
        for row in self.pixels.chunks_exact(MATRIX_SIZE) {
            let row = row.iter().map(|p| p.to_array()).collect::<Vec<_>>();
            writeln!(f, "    {:?}", row)?;
        }
        write!(f, "]")
    }
}

impl Default for MatrixBuffer {
    fn default() -> Self {
        Self::filled(Pixel::BLACK)
    }
}

impl MatrixBuffer {
    /// Creates a buffer with every cell set to `pixel`.
    pub fn filled(pixel: Pixel) -> Self {
        Self {
            pixels: [pixel; CELL_COUNT],
        }
    }

    /// Creates a buffer by calling `f(x, y)` for every cell.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> Pixel) -> Self {
        Self {
            pixels: std::array::from_fn(|idx| f(idx % MATRIX_SIZE, idx / MATRIX_SIZE)),
        }
    }

    /// Builds a buffer from 64 `[r, g, b]` triples, checking every channel.
    pub fn from_triples(triples: &[[i64; 3]]) -> Result<Self> {
        if triples.len() != CELL_COUNT {
            return Err(ValidationError::PixelCount(triples.len()).into());
        }
        let mut buffer = Self::default();
        for (pixel, triple) in buffer.pixels.iter_mut().zip(triples) {
            *pixel = Pixel::from_channels(*triple)?;
        }
        Ok(buffer)
    }

    /// Builds a buffer from a flat list of 192 channel values, read as 8x8x3.
    pub fn from_channels(channels: &[i64]) -> Result<Self> {
        if channels.len() != CELL_COUNT * 3 {
            return Err(ValidationError::ChannelCount(channels.len()).into());
        }
        let mut buffer = Self::default();
        for (pixel, chunk) in buffer.pixels.iter_mut().zip(channels.chunks_exact(3)) {
            *pixel = Pixel::from_channels([chunk[0], chunk[1], chunk[2]])?;
        }
        Ok(buffer)
    }

    /// Calculates the linear index for a given (x, y) coordinate.
    #[inline]
    fn get_index(x: usize, y: usize) -> usize {
        y * MATRIX_SIZE + x
    }

    /// Gets the pixel at `(x, y)`, or `None` if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&Pixel> {
        if x >= MATRIX_SIZE || y >= MATRIX_SIZE {
            return None;
        }
        self.pixels.get(Self::get_index(x, y))
    }

    /// Gets a mutable reference to the pixel at `(x, y)`, or `None` if out of bounds.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Pixel> {
        if x >= MATRIX_SIZE || y >= MATRIX_SIZE {
            return None;
        }
        self.pixels.get_mut(Self::get_index(x, y))
    }

    /// Sets the pixel at `(x, y)` if the coordinates are in bounds.
    pub fn set(&mut self, x: usize, y: usize, value: Pixel) {
        if let Some(pixel) = self.get_mut(x, y) {
            *pixel = value;
        }
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: Pixel) {
        self.pixels = [value; CELL_COUNT];
    }

    /// The 64 pixels in row-major order.
    pub fn as_slice(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn as_mut_slice(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Returns row `y` as a slice of 8 pixels.
    pub fn row(&self, y: usize) -> &[Pixel] {
        let start = Self::get_index(0, y);
        &self.pixels[start..start + MATRIX_SIZE]
    }

    /// Returns an iterator over `(x, y, pixel)` for every cell.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Pixel)> {
        self.pixels
            .iter()
            .enumerate()
            .map(|(idx, pixel)| (idx % MATRIX_SIZE, idx / MATRIX_SIZE, pixel))
    }

    /// Maps every pixel through `f`.
    pub fn map(&self, f: impl FnMut(Pixel) -> Pixel) -> Self {
        Self {
            pixels: self.pixels.map(f),
        }
    }

    /// Mirrors the buffer left to right.
    pub fn flipped_h(&self) -> Self {
        Self::from_fn(|x, y| self[(MATRIX_SIZE - 1 - x, y)])
    }

    /// Mirrors the buffer top to bottom.
    pub fn flipped_v(&self) -> Self {
        Self::from_fn(|x, y| self[(x, MATRIX_SIZE - 1 - y)])
    }

    /// Turns the buffer a quarter turn clockwise.
    pub fn rotated_cw(&self) -> Self {
        let mut out = Self::default();
        for (x, y, pixel) in self.iter() {
            out[(MATRIX_SIZE - 1 - y, x)] = *pixel;
        }
        out
    }

    /// Turns the buffer clockwise by `rotation`.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let mut out = *self;
        for _ in 0..rotation.quarter_turns() {
            out = out.rotated_cw();
        }
        out
    }

    /// Converts a logical buffer into the physical cell order of a device mounted at `rotation`.
    pub fn to_physical(&self, rotation: Rotation) -> Self {
        self.rotated(rotation)
    }

    /// Converts a buffer read back in physical order into logical order.
    pub fn from_physical(&self, rotation: Rotation) -> Self {
        self.rotated(rotation.inverse())
    }

    /// Every pixel as it will look after RGB565 packing.
    pub fn quantized(&self) -> Self {
        self.map(Pixel::quantized)
    }
}

impl Index<(usize, usize)> for MatrixBuffer {
    type Output = Pixel;

    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        assert!(x < MATRIX_SIZE && y < MATRIX_SIZE, "({x}, {y}) out of bounds");
        &self.pixels[Self::get_index(x, y)]
    }
}

impl IndexMut<(usize, usize)> for MatrixBuffer {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        assert!(x < MATRIX_SIZE && y < MATRIX_SIZE, "({x}, {y}) out of bounds");
        &mut self.pixels[Self::get_index(x, y)]
    }
}

impl From<[Pixel; CELL_COUNT]> for MatrixBuffer {
    fn from(pixels: [Pixel; CELL_COUNT]) -> Self {
        Self { pixels }
    }
}

impl TryFrom<&[Pixel]> for MatrixBuffer {
    type Error = Error;

    fn try_from(pixels: &[Pixel]) -> Result<Self> {
        let pixels: [Pixel; CELL_COUNT] = pixels
            .try_into()
            .map_err(|_| ValidationError::PixelCount(pixels.len()))?;
        Ok(Self { pixels })
    }
}

impl TryFrom<Vec<Pixel>> for MatrixBuffer {
    type Error = Error;

    fn try_from(pixels: Vec<Pixel>) -> Result<Self> {
        Self::try_from(pixels.as_slice())
    }
}
