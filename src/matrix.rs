use crate::config::MatrixConfig;
use crate::device::{FrameDevice, FramebufferDevice};
use crate::error::{Error, Result};
use crate::rendering::pixel::Pixel;
use crate::surface::MatrixSurface;
use crate::text::glyphs::GlyphStore;
use crate::text::{ScrollOptions, TextRenderer};
use std::ops::{ControlFlow, Deref, DerefMut};

/// The LED matrix: a [`MatrixSurface`] plus the font used to draw text on it.
///
/// All pixel operations of the surface are available directly through `Deref`.
///
/// ```no_run
/// use senseled::{LedMatrix, MatrixConfig, Pixel, ScrollOptions};
///
/// let config = MatrixConfig::from_file("senseled.json")?;
/// let mut matrix = LedMatrix::open(&config)?;
/// matrix.clear(Pixel::new(0, 0, 64))?;
/// matrix.set_pixel(0, 0, Pixel::WHITE)?;
/// matrix.show_message("Hello", ScrollOptions::default())?;
/// # Ok::<(), senseled::Error>(())
/// ```
pub struct LedMatrix<D> {
    surface: MatrixSurface<D>,
    glyphs: GlyphStore,
}

impl LedMatrix<FramebufferDevice> {
    /// Opens the framebuffer and font named by `config` and applies its rotation.
    pub fn open(config: &MatrixConfig) -> Result<Self> {
        let font = config
            .font
            .as_ref()
            .ok_or_else(|| Error::Config("no font configured".to_owned()))?;
        let glyphs = GlyphStore::from_files(&font.atlas, &font.order)?;
        log::debug!("opening matrix at {}", config.device.display());
        let mut matrix = Self::new(FramebufferDevice::new(&config.device), glyphs);
        matrix.set_rotation(config.rotation.into(), false)?;
        Ok(matrix)
    }
}

impl<D: FrameDevice> LedMatrix<D> {
    pub fn new(device: D, glyphs: GlyphStore) -> Self {
        Self {
            surface: MatrixSurface::new(device),
            glyphs,
        }
    }

    pub fn glyphs(&self) -> &GlyphStore {
        &self.glyphs
    }

    pub fn surface(&self) -> &MatrixSurface<D> {
        &self.surface
    }

    pub fn into_surface(self) -> MatrixSurface<D> {
        self.surface
    }

    /// Shows a single character. An empty string shows `?`.
    pub fn show_letter(&mut self, s: &str, text_color: impl Into<Pixel>, back_color: impl Into<Pixel>) -> Result<()> {
        TextRenderer::new(&self.glyphs).render_letter(
            &mut self.surface,
            s,
            text_color.into(),
            back_color.into(),
        )
    }

    /// Scrolls `text` right to left across the matrix; blocks until it has gone by.
    pub fn show_message(&mut self, text: &str, options: ScrollOptions) -> Result<()> {
        TextRenderer::new(&self.glyphs).render_scroll(&mut self.surface, text, options)
    }

    /// Scrolls `text` while `keep_going` allows it. Returns the number of frames shown.
    pub fn show_message_until(
        &mut self,
        text: &str,
        options: ScrollOptions,
        keep_going: impl FnMut(usize) -> ControlFlow<()>,
    ) -> Result<usize> {
        TextRenderer::new(&self.glyphs).render_scroll_until(&mut self.surface, text, options, keep_going)
    }
}

impl<D> Deref for LedMatrix<D> {
    type Target = MatrixSurface<D>;

    fn deref(&self) -> &Self::Target {
        &self.surface
    }
}

impl<D> DerefMut for LedMatrix<D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FontConfig;
    use crate::device::MemoryDevice;
    use crate::rendering::buffer::MatrixBuffer;
    use crate::rendering::rotation::Rotation;
    use crate::text::glyphs::tests::test_store;
    use std::time::Duration;

    fn matrix() -> LedMatrix<MemoryDevice> {
        LedMatrix::new(MemoryDevice::new(), test_store())
    }

    #[test]
    fn test_surface_operations_through_deref() {
        let mut matrix = matrix();
        matrix.set_rotation(90, false).unwrap();
        matrix.set_pixel(2, 3, Pixel::new(0, 255, 0)).unwrap();
        assert_eq!(matrix.get_pixel(2, 3).unwrap(), Pixel::new(0, 252, 0));
        assert_eq!(matrix.rotation(), Rotation::Deg90);
        assert_eq!(matrix.device().write_count(), 1);
    }

    #[test]
    fn test_show_letter() {
        let mut matrix = matrix();
        matrix.show_letter("", Pixel::WHITE, Pixel::BLACK).unwrap();
        // `?` has its rows 1..=3 lit, drawn on frame rows 2..=4, which end up as columns
        let shown = matrix.get_pixels().unwrap();
        let expected = MatrixBuffer::from_fn(|x, _| {
            if (2..=4).contains(&x) {
                Pixel::WHITE.quantized()
            } else {
                Pixel::BLACK
            }
        });
        assert_eq!(shown, expected);
        assert!(matrix.show_letter("AB", Pixel::WHITE, Pixel::BLACK).is_err());
        assert_eq!(matrix.device().write_count(), 1);
    }

    #[test]
    fn test_show_message() {
        let mut matrix = matrix();
        let options = ScrollOptions::default().with_speed(Duration::ZERO);
        matrix.show_message("B", options).unwrap();
        // 8 + 1 + 1 + 8 rows
        assert_eq!(matrix.device().history().len(), 10);
        assert!(matrix.get_pixels().unwrap().as_slice().iter().all(|p| *p == Pixel::BLACK));

        matrix.device_mut().clear_history();
        let shown = matrix
            .show_message_until("BBB", options, |i| {
                if i == 0 {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                }
            })
            .unwrap();
        assert_eq!(shown, 1);
        assert_eq!(matrix.device().history().len(), 1);
    }

    #[test]
    fn test_open_requires_font() {
        let config = MatrixConfig::default();
        assert!(matches!(LedMatrix::open(&config), Err(Error::Config(_))));

        let dir = tempfile::tempdir().unwrap();
        let config = MatrixConfig {
            font: Some(FontConfig {
                atlas: dir.path().join("missing.png"),
                order: dir.path().join("missing.txt"),
            }),
            ..MatrixConfig::default()
        };
        assert!(matches!(LedMatrix::open(&config), Err(Error::Image(_))));
    }

    #[test]
    fn test_open_applies_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let atlas = dir.path().join("font.png");
        let order = dir.path().join("font.txt");
        image::RgbImage::new(8, 5).save(&atlas).unwrap();
        std::fs::write(&order, "?").unwrap();
        let device = dir.path().join("fb");
        std::fs::write(&device, [0; 128]).unwrap();

        let config = MatrixConfig {
            device,
            rotation: Rotation::Deg180,
            font: Some(FontConfig { atlas, order }),
            ..MatrixConfig::default()
        };
        let mut matrix = LedMatrix::open(&config).unwrap();
        assert_eq!(matrix.rotation(), Rotation::Deg180);
        assert_eq!(matrix.glyphs().len(), 1);
        matrix.set_pixel(0, 0, Pixel::WHITE).unwrap();
        let raw = std::fs::read(&config.device).unwrap();
        assert_eq!(&raw[126..128], &[0xFF, 0xFF]);
    }
}
