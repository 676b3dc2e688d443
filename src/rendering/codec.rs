//! RGB565 packing, the on-wire format of the matrix framebuffer.
//!
//! Every cell takes two bytes, little-endian, laid out as `RRRRRGGG GGGBBBBB`. Packing
//! throws away the low three bits of red and blue and the low two bits of green, so
//! `decode(encode(p))` is [`Pixel::quantized`] rather than `p`.

use crate::error::{Result, ValidationError};
use crate::rendering::buffer::{CELL_COUNT, MatrixBuffer};
use crate::rendering::pixel::Pixel;

/// Bytes per packed cell.
pub const BYTES_PER_PIXEL: usize = 2;

/// Bytes in a full packed frame.
pub const FRAME_BYTES: usize = CELL_COUNT * BYTES_PER_PIXEL;

/// A full frame as written to the device.
pub type PackedFrame = [u8; FRAME_BYTES];

pub fn encode_pixel(pixel: Pixel) -> u16 {
    ((pixel.r as u16 & 0xF8) << 8) | ((pixel.g as u16 & 0xFC) << 3) | (pixel.b as u16 >> 3)
}

pub fn decode_pixel(packed: u16) -> Pixel {
    Pixel::new(
        ((packed & 0xF800) >> 8) as u8,
        ((packed & 0x07E0) >> 3) as u8,
        ((packed & 0x001F) << 3) as u8,
    )
}

/// Packs a buffer that is already in physical order.
pub fn encode(buffer: &MatrixBuffer) -> PackedFrame {
    let mut frame = [0; FRAME_BYTES];
    for (chunk, pixel) in frame
        .chunks_exact_mut(BYTES_PER_PIXEL)
        .zip(buffer.as_slice())
    {
        chunk.copy_from_slice(&encode_pixel(*pixel).to_le_bytes());
    }
    frame
}

/// Unpacks 2 bytes (one pixel) or 128 bytes (a full frame).
pub fn decode(bytes: &[u8]) -> Result<Vec<Pixel>> {
    if bytes.len() != BYTES_PER_PIXEL && bytes.len() != FRAME_BYTES {
        return Err(ValidationError::PackedLength(bytes.len()).into());
    }
    Ok(bytes
        .chunks_exact(BYTES_PER_PIXEL)
        .map(|chunk| decode_pixel(u16::from_le_bytes([chunk[0], chunk[1]])))
        .collect())
}

/// Unpacks a full frame without the length check `decode` needs for slices.
pub fn decode_frame(frame: &PackedFrame) -> MatrixBuffer {
    let mut buffer = MatrixBuffer::default();
    for (pixel, chunk) in buffer
        .as_mut_slice()
        .iter_mut()
        .zip(frame.chunks_exact(BYTES_PER_PIXEL))
    {
        *pixel = decode_pixel(u16::from_le_bytes([chunk[0], chunk[1]]));
    }
    buffer
}
