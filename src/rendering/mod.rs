//! Pixel data and its on-device representation.
//!
//! **Sub-modules:**
//!
//! *   [`pixel`](crate::rendering::pixel): Defines the [`Pixel`](pixel::Pixel) struct, the colour of one LED.
//! *   [`buffer`](crate::rendering::buffer): Defines [`MatrixBuffer`](buffer::MatrixBuffer), a full 8x8 frame.
//! *   [`rotation`](crate::rendering::rotation): Maps logical coordinates to physical cells for each
//!     supported [`Rotation`](rotation::Rotation).
//! *   [`codec`](crate::rendering::codec): Packs pixels into little-endian RGB565 and back.
//!
//! **Key Concepts:**
//!
//! *   **Logical order:** `(x, y)` as the caller sees the matrix, `(0, 0)` top left.
//! *   **Physical order:** cell order in the device buffer. The two differ by the rotation the
//!     matrix is mounted at.
//! *   **Quantization:** RGB565 keeps 5 bits of red and blue and 6 of green, so what is read
//!     back from the device is the written colour with its low bits cleared.
//!
//! **Frame Path (Simplified):**
//!
//! 1.  Build a `MatrixBuffer` in logical order.
//! 2.  `MatrixBuffer::to_physical` turns it into physical order.
//! 3.  `codec::encode` packs it into the 128 bytes the device expects.
//! 4.  Reading goes the other way: `codec::decode_frame`, then `MatrixBuffer::from_physical`.

pub mod buffer;
pub mod codec;
pub mod pixel;
pub mod rotation;
