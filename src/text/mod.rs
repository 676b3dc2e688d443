//! Text rendering on the LED matrix.
//!
//! This module turns strings into matrix frames:
//!
//! *   [`TextRenderer::letter_frame`] builds a single 8x8 frame showing one character.
//! *   [`TextRenderer::scroll_strip`] concatenates trimmed glyphs into a [`ScrollStrip`],
//!     a tall column of glyph rows with blank padding at both ends.
//! *   [`TextRenderer::render_scroll`] slides an 8 row window down the strip, one frame per
//!     step, which scrolls the text across the matrix.
//!
//! Glyphs are stored turned a quarter turn clockwise (see [`glyphs`]), so every render turns
//! the surface a quarter turn to the left for its duration and restores the caller's
//! rotation afterwards, however the render ends.

pub mod glyphs;

use crate::device::FrameDevice;
use crate::error::{Result, ValidationError};
use crate::rendering::buffer::MatrixBuffer;
use crate::rendering::pixel::Pixel;
use crate::rendering::rotation::MATRIX_SIZE;
use crate::surface::MatrixSurface;
use glyphs::{GlyphRow, GlyphStore};
use std::ops::ControlFlow;
use std::time::Duration;

/// How a message is scrolled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollOptions {
    /// Pause after each frame.
    pub speed: Duration,
    pub text_color: Pixel,
    pub back_color: Pixel,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            speed: Duration::from_millis(100),
            text_color: Pixel::WHITE,
            back_color: Pixel::BLACK,
        }
    }
}

impl ScrollOptions {
    pub fn with_speed(self, speed: Duration) -> Self {
        Self { speed, ..self }
    }

    pub fn with_text_color(self, text_color: impl Into<Pixel>) -> Self {
        Self {
            text_color: text_color.into(),
            ..self
        }
    }

    pub fn with_back_color(self, back_color: impl Into<Pixel>) -> Self {
        Self {
            back_color: back_color.into(),
            ..self
        }
    }
}

/// Rows of a message laid out end to end, ready to be scrolled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrollStrip {
    rows: Vec<GlyphRow>,
}

impl ScrollStrip {
    pub fn rows(&self) -> &[GlyphRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of 8 row windows the strip scrolls through.
    pub fn frame_count(&self) -> usize {
        self.rows.len().saturating_sub(MATRIX_SIZE)
    }

    /// Rows `start..start + 8` as one frame.
    pub fn window(&self, start: usize) -> MatrixBuffer {
        MatrixBuffer::from_fn(|x, y| {
            self.rows
                .get(start + y)
                .map_or(Pixel::BLACK, |row| row[x])
        })
    }

    /// All frames in scroll order.
    pub fn frames(&self) -> impl Iterator<Item = MatrixBuffer> + '_ {
        (0..self.frame_count()).map(|i| self.window(i))
    }
}

/// Swaps white for `text_color` and everything else for `back_color`.
fn recolor(pixel: Pixel, text_color: Pixel, back_color: Pixel) -> Pixel {
    if pixel == Pixel::WHITE {
        text_color
    } else {
        back_color
    }
}

/// Lays out text using a [`GlyphStore`] and draws it onto a [`MatrixSurface`].
#[derive(Clone, Copy, Debug)]
pub struct TextRenderer<'a> {
    glyphs: &'a GlyphStore,
}

impl<'a> TextRenderer<'a> {
    pub fn new(glyphs: &'a GlyphStore) -> Self {
        Self { glyphs }
    }

    /// One character in a single frame, untrimmed, on rows 1 to 5.
    pub fn letter_frame(&self, s: &str, text_color: Pixel, back_color: Pixel) -> Result<MatrixBuffer> {
        if s.chars().count() > 1 {
            return Err(ValidationError::MultiCharLetter(s.to_owned()).into());
        }
        let glyph = self.glyphs.lookup_str(s);
        let mut frame = MatrixBuffer::default();
        for (y, row) in glyph.rows().iter().enumerate() {
            for (x, pixel) in row.iter().enumerate() {
                frame[(x, y + 1)] = *pixel;
            }
        }
        Ok(frame.map(|p| recolor(p, text_color, back_color)))
    }

    /// The whole message as a strip: 8 blank rows, each trimmed glyph followed by a blank row,
    /// then 8 blank rows.
    pub fn scroll_strip(&self, text: &str, text_color: Pixel, back_color: Pixel) -> ScrollStrip {
        let blank = [Pixel::BLACK; MATRIX_SIZE];
        let mut rows = vec![blank; MATRIX_SIZE];
        for c in text.chars() {
            rows.extend_from_slice(self.glyphs.lookup(c).trimmed().rows());
            rows.push(blank);
        }
        rows.extend_from_slice(&[blank; MATRIX_SIZE]);
        for row in rows.iter_mut() {
            *row = row.map(|p| recolor(p, text_color, back_color));
        }
        ScrollStrip { rows }
    }

    /// Shows a single character.
    pub fn render_letter<D: FrameDevice>(
        &self,
        surface: &mut MatrixSurface<D>,
        s: &str,
        text_color: Pixel,
        back_color: Pixel,
    ) -> Result<()> {
        let frame = self.letter_frame(s, text_color, back_color)?;
        let text_rotation = surface.rotation().rotated_left();
        let mut surface = surface.rotate_scoped(text_rotation);
        surface.set_pixels(&frame)
    }

    /// Scrolls `text` across the matrix, blocking until the last frame has been shown.
    pub fn render_scroll<D: FrameDevice>(
        &self,
        surface: &mut MatrixSurface<D>,
        text: &str,
        options: ScrollOptions,
    ) -> Result<()> {
        self.render_scroll_until(surface, text, options, |_| ControlFlow::Continue(()))
            .map(|_| ())
    }

    /// Like [`render_scroll`](Self::render_scroll), asking `keep_going` before every frame.
    ///
    /// `keep_going` gets the index of the frame about to be drawn; returning
    /// `ControlFlow::Break` stops the scroll there. Returns the number of frames drawn.
    pub fn render_scroll_until<D: FrameDevice>(
        &self,
        surface: &mut MatrixSurface<D>,
        text: &str,
        options: ScrollOptions,
        mut keep_going: impl FnMut(usize) -> ControlFlow<()>,
    ) -> Result<usize> {
        let strip = self.scroll_strip(text, options.text_color, options.back_color);
        let text_rotation = surface.rotation().rotated_left();
        let mut surface = surface.rotate_scoped(text_rotation);
        log::debug!(
            "scrolling {:?}: {} frames every {:?}",
            text,
            strip.frame_count(),
            options.speed
        );

        let mut drawn = 0;
        for (i, frame) in strip.frames().enumerate() {
            if keep_going(i).is_break() {
                log::warn!("scroll of {:?} stopped after {} frames", text, drawn);
                return Ok(drawn);
            }
            surface.set_pixels(&frame)?;
            drawn += 1;
            std::thread::sleep(options.speed);
        }
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemoryDevice;
    use crate::error::Error;
    use crate::rendering::codec;
    use crate::rendering::rotation::Rotation;
    use glyphs::tests::test_store;
    use std::io;
    use std::panic::AssertUnwindSafe;

    const RED: Pixel = Pixel::new(248, 0, 0);
    const BLUE: Pixel = Pixel::new(0, 0, 248);

    fn instant() -> ScrollOptions {
        ScrollOptions::default().with_speed(Duration::ZERO)
    }

    /// Reads back every recorded frame in the text orientation.
    fn shown_frames(device: &MemoryDevice) -> Vec<MatrixBuffer> {
        device
            .history()
            .iter()
            .map(|frame| codec::decode_frame(frame).from_physical(Rotation::Deg270))
            .collect()
    }

    #[test]
    fn test_letter_frame() {
        let store = test_store();
        let renderer = TextRenderer::new(&store);
        let frame = renderer.letter_frame("?", RED, BLUE).unwrap();
        for y in 0..MATRIX_SIZE {
            let expected = if (2..=4).contains(&y) { RED } else { BLUE };
            assert!(frame.row(y).iter().all(|p| *p == expected), "row {y}");
        }
        // unknown characters fall back to `?`
        assert_eq!(renderer.letter_frame("Z", RED, BLUE).unwrap(), frame);
        assert!(matches!(
            renderer.letter_frame("AB", RED, BLUE),
            Err(Error::Validation(ValidationError::MultiCharLetter(_)))
        ));
    }

    #[test]
    fn test_letter_is_not_trimmed() {
        let store = test_store();
        let renderer = TextRenderer::new(&store);
        let frame = renderer.letter_frame("A", RED, BLUE).unwrap();
        for y in 1..=5 {
            assert_eq!(frame.row(y)[0], RED);
        }
        assert_eq!(frame.row(0)[0], BLUE);
        assert_eq!(frame.row(6)[0], BLUE);
    }

    #[test]
    fn test_scroll_strip_layout() {
        let store = test_store();
        let renderer = TextRenderer::new(&store);
        let strip = renderer.scroll_strip("A B", Pixel::WHITE, Pixel::BLACK);
        // 8 + (5 + 1) + (0 + 1) + (1 + 1) + 8
        assert_eq!(strip.len(), 25);
        assert_eq!(strip.frame_count(), 17);
        let lit: Vec<bool> = strip.rows().iter().map(|r| r[0] == Pixel::WHITE).collect();
        assert!(lit[8..13].iter().all(|&l| l));
        assert!(!lit[13] && !lit[14]);
        assert!(lit[15]);
        assert!(!lit[16]);

        let empty = renderer.scroll_strip("", Pixel::WHITE, Pixel::BLACK);
        assert_eq!(empty.frame_count(), 8);
    }

    #[test]
    fn test_render_scroll_frames() {
        let store = test_store();
        let renderer = TextRenderer::new(&store);
        let mut surface = MatrixSurface::new(MemoryDevice::new());
        renderer
            .render_scroll(&mut surface, "?", instant().with_text_color(RED).with_back_color(BLUE))
            .unwrap();

        let frames = shown_frames(surface.device());
        let trimmed = store.lookup('?').trimmed().height();
        assert_eq!(frames.len(), 8 + trimmed + 1 + 8 - 8);
        assert_eq!(surface.rotation(), Rotation::Deg0);

        // content moves by exactly one row (one matrix column) per frame
        for pair in frames.windows(2) {
            for y in 0..MATRIX_SIZE - 1 {
                assert_eq!(pair[1].row(y), pair[0].row(y + 1));
            }
        }
        assert!(frames[0].as_slice().iter().all(|p| *p == BLUE));
        assert_eq!(frames[1].row(7)[0], RED);
    }

    #[test]
    fn test_render_letter_restores_rotation() {
        let store = test_store();
        let renderer = TextRenderer::new(&store);
        let mut surface = MatrixSurface::new(MemoryDevice::new());
        surface.set_rotation(180, false).unwrap();
        renderer
            .render_letter(&mut surface, "A", Pixel::WHITE, Pixel::BLACK)
            .unwrap();
        assert_eq!(surface.rotation(), Rotation::Deg180);

        let shown = codec::decode_frame(&surface.device().history()[0]).from_physical(Rotation::Deg90);
        assert_eq!(
            shown,
            renderer.letter_frame("A", Pixel::WHITE, Pixel::BLACK).unwrap().quantized()
        );
    }

    #[test]
    fn test_scroll_stops_when_asked() {
        let store = test_store();
        let renderer = TextRenderer::new(&store);
        let mut surface = MatrixSurface::new(MemoryDevice::new());
        surface.set_rotation(90, false).unwrap();
        let drawn = renderer
            .render_scroll_until(&mut surface, "AAAA", instant(), |i| {
                if i < 3 {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                }
            })
            .unwrap();
        assert_eq!(drawn, 3);
        assert_eq!(surface.device().history().len(), 3);
        assert_eq!(surface.rotation(), Rotation::Deg90);
    }

    /// Fails once `writes_left` writes have gone through, by error or by panicking.
    struct FailingDevice {
        inner: MemoryDevice,
        writes_left: usize,
        panics: bool,
    }

    impl FrameDevice for FailingDevice {
        fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
            if self.writes_left == 0 {
                if self.panics {
                    panic!("device driver crashed");
                }
                return Err(io::Error::other("device unplugged"));
            }
            self.writes_left -= 1;
            self.inner.write_at(offset, bytes)
        }

        fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
            self.inner.read_at(offset, buf)
        }
    }

    #[test]
    fn test_rotation_restored_after_failure() {
        let store = test_store();
        let renderer = TextRenderer::new(&store);
        let mut surface = MatrixSurface::new(FailingDevice {
            inner: MemoryDevice::new(),
            writes_left: 4,
            panics: false,
        });
        surface.set_rotation(270, false).unwrap();
        let result = renderer.render_scroll(&mut surface, "AB", instant());
        assert!(matches!(result, Err(Error::Device(_))));
        assert_eq!(surface.rotation(), Rotation::Deg270);
        assert_eq!(surface.device().inner.history().len(), 4);
    }

    #[test]
    fn test_rotation_restored_after_panic() {
        let store = test_store();
        let renderer = TextRenderer::new(&store);
        let mut surface = MatrixSurface::new(FailingDevice {
            inner: MemoryDevice::new(),
            writes_left: 2,
            panics: true,
        });
        surface.set_rotation(90, false).unwrap();
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            renderer.render_scroll(&mut surface, "AB", instant())
        }));
        assert!(result.is_err());
        assert_eq!(surface.rotation(), Rotation::Deg90);
        assert_eq!(surface.device().inner.history().len(), 2);
    }
}
