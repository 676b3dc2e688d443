//! Pixel representation for the LED matrix.
//!
//! This module defines the `Pixel` struct, a single RGB colour value as shown by one LED.
//!
//! The `Pixel` struct is the fundamental unit for building up frames in `senseled`.
//! Channels are stored as `u8`, so a `Pixel` is always in range. Wider integers coming in
//! from callers (command line arguments, JSON, scripting bindings) go through
//! [`Pixel::from_channels`], which rejects anything outside `0..=255` instead of clamping.

use crate::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};

/// A single RGB pixel.
///
/// # Example
///
/// ```rust
/// use senseled::rendering::pixel::Pixel;
///
/// let orange = Pixel::new(255, 128, 0);
/// assert_eq!(orange.to_array(), [255, 128, 0]);
///
/// // what the LED actually shows after RGB565 packing
/// assert_eq!(orange.quantized(), Pixel::new(248, 128, 0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    /// All channels off.
    pub const BLACK: Pixel = Pixel::new(0, 0, 0);
    /// All channels fully on. Glyph atlases mark drawn pixels with this colour.
    pub const WHITE: Pixel = Pixel::new(255, 255, 255);

    /// Creates a new `Pixel` from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Creates a `Pixel` from wider integer channels, failing if any channel is outside `0..=255`.
    ///
    /// ```rust
    /// use senseled::rendering::pixel::Pixel;
    ///
    /// assert_eq!(Pixel::from_channels([1, 2, 3]).unwrap(), Pixel::new(1, 2, 3));
    /// assert!(Pixel::from_channels([0, 256, 0]).is_err());
    /// assert!(Pixel::from_channels([-1, 0, 0]).is_err());
    /// ```
    pub fn from_channels(channels: [i64; 3]) -> Result<Self> {
        let [r, g, b] = channels.map(channel);
        Ok(Self::new(r?, g?, b?))
    }

    /// Returns the channels as an `[r, g, b]` array.
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Sum of all three channels. Zero means the pixel is black.
    pub fn channel_sum(self) -> u32 {
        self.r as u32 + self.g as u32 + self.b as u32
    }

    /// Drops the low bits that RGB565 cannot represent: red and blue keep 5 bits, green keeps 6.
    pub const fn quantized(self) -> Self {
        Self {
            r: self.r & 0xF8,
            g: self.g & 0xFC,
            b: self.b & 0xF8,
        }
    }
}

fn channel(value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| ValidationError::ChannelRange(value).into())
}

impl From<[u8; 3]> for Pixel {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<(u8, u8, u8)> for Pixel {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Pixel> for [u8; 3] {
    fn from(pixel: Pixel) -> Self {
        pixel.to_array()
    }
}

impl From<image::Rgb<u8>> for Pixel {
    fn from(rgb: image::Rgb<u8>) -> Self {
        Self::from(rgb.0)
    }
}
