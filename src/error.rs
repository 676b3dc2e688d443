//! Error types shared by the whole crate.

use std::io;

/// Convenience alias used throughout `senseled`.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while driving the matrix.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Pixel data or coordinates had the wrong shape or range.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The rotation is not one of 0, 90, 180 or 270 degrees.
    #[error("rotation must be 0, 90, 180 or 270 degrees, got {0}")]
    InvalidRotation(i64),
    /// The configuration file could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The font atlas and its character order do not fit together.
    #[error("malformed font asset: {0}")]
    Asset(String),
    /// An image file could not be decoded.
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    /// Reading from or writing to the device failed.
    #[error("device I/O failed: {0}")]
    Device(#[from] io::Error),
    /// A frame recording could not be serialized or deserialized.
    #[error("frame recording failed: {0}")]
    Recording(#[from] bincode::Error),
}

/// Shape and range violations, raised before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("pixel lists must have 64 elements of 3 values each (red, green, blue), got {0}")]
    PixelCount(usize),
    #[error("flat channel lists must have 192 values (64 pixels of red, green, blue), got {0}")]
    ChannelCount(usize),
    #[error("pixel elements must be between 0 and 255, got {0}")]
    ChannelRange(i64),
    #[error("x position must be between 0 and 7, got {0}")]
    XRange(i64),
    #[error("y position must be between 0 and 7, got {0}")]
    YRange(i64),
    #[error("only one character may be shown as a letter, got {0:?}")]
    MultiCharLetter(String),
    #[error("packed data must hold 1 or 64 pixels, got {0} bytes")]
    PackedLength(usize),
    #[error("image must have exactly 64 pixels, got {width}x{height}")]
    ImageSize { width: u32, height: u32 },
}
