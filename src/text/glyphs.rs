//! Bitmap font for the LED matrix.
//!
//! A font comes as two assets: an atlas image and a text file listing the characters in the
//! order they appear in the atlas. Every character takes 40 consecutive atlas pixels, read as
//! 5 rows of 8. The atlas is stored turned a quarter turn clockwise, so each of those rows is
//! one *column* of the upright character, with the character's bottom at index 0. Drawn
//! pixels are pure white.

use crate::error::{Error, Result};
use crate::rendering::pixel::Pixel;
use crate::rendering::rotation::MATRIX_SIZE;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::path::Path;

/// Rows per glyph in the atlas.
pub const GLYPH_ROWS: usize = 5;
/// Atlas pixels per glyph.
pub const GLYPH_PIXELS: usize = GLYPH_ROWS * MATRIX_SIZE;
/// The glyph shown for anything the font does not contain.
pub const FALLBACK_CHAR: char = '?';

/// One row of a glyph, as drawn across the matrix.
pub type GlyphRow = [Pixel; MATRIX_SIZE];

/// The pixels of one character.
///
/// Glyphs straight out of the atlas have exactly 5 rows. [`Glyph::trimmed`] drops blank rows
/// at either end, so a trimmed glyph has 0 to 5.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    rows: SmallVec<[GlyphRow; GLYPH_ROWS]>,
}

impl Glyph {
    pub fn from_rows(rows: impl IntoIterator<Item = GlyphRow>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    fn from_atlas_block(block: &[Pixel]) -> Self {
        debug_assert_eq!(block.len(), GLYPH_PIXELS);
        Self::from_rows(block.chunks_exact(MATRIX_SIZE).map(|chunk| {
            let mut row = [Pixel::BLACK; MATRIX_SIZE];
            row.copy_from_slice(chunk);
            row
        }))
    }

    pub fn rows(&self) -> &[GlyphRow] {
        &self.rows
    }

    /// Number of rows, i.e. how many matrix columns the glyph takes when scrolled.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Strips leading and trailing rows whose pixels are all black.
    ///
    /// A glyph with no lit pixel at all (a space) trims down to nothing.
    pub fn trimmed(&self) -> Glyph {
        let blank = |row: &GlyphRow| row.iter().all(|p| p.channel_sum() == 0);
        let Some(first) = self.rows.iter().position(|row| !blank(row)) else {
            return Glyph::from_rows([]);
        };
        let last = self.rows.iter().rposition(|row| !blank(row)).unwrap_or(first);
        Self::from_rows(self.rows[first..=last].iter().copied())
    }
}

/// Character to glyph lookup, built once from an atlas.
#[derive(Clone, Debug)]
pub struct GlyphStore {
    glyphs: HashMap<char, Glyph>,
}

impl GlyphStore {
    /// Slices `atlas` into one 40-pixel glyph per character of `order`.
    ///
    /// If a character appears more than once, its last block wins. `order` must contain `?`.
    pub fn load(atlas: &[Pixel], order: &str) -> Result<Self> {
        if atlas.len() % GLYPH_PIXELS != 0 {
            return Err(Error::Asset(format!(
                "atlas has {} pixels, which is not a multiple of {}",
                atlas.len(),
                GLYPH_PIXELS
            )));
        }
        let char_count = order.chars().count();
        if atlas.len() < char_count * GLYPH_PIXELS {
            return Err(Error::Asset(format!(
                "atlas holds {} glyphs but the character order lists {}",
                atlas.len() / GLYPH_PIXELS,
                char_count
            )));
        }
        if !order.contains(FALLBACK_CHAR) {
            return Err(Error::Asset(format!(
                "character order must contain the fallback glyph {FALLBACK_CHAR:?}"
            )));
        }

        let glyphs = order
            .chars()
            .zip(atlas.chunks_exact(GLYPH_PIXELS))
            .map(|(c, block)| (c, Glyph::from_atlas_block(block)))
            .collect();
        Ok(Self { glyphs })
    }

    /// Loads the font from an already decoded atlas image.
    pub fn from_image(atlas: &image::RgbImage, order: &str) -> Result<Self> {
        let pixels: Vec<Pixel> = atlas.pixels().map(|p| Pixel::from(*p)).collect();
        Self::load(&pixels, order)
    }

    /// Loads the font from an atlas image file and a character order text file.
    ///
    /// One trailing line break in the text file is ignored.
    pub fn from_files(atlas_path: impl AsRef<Path>, order_path: impl AsRef<Path>) -> Result<Self> {
        let atlas = image::open(atlas_path.as_ref())?.to_rgb8();
        let order = std::fs::read_to_string(order_path.as_ref())?;
        let order = order
            .strip_suffix("\r\n")
            .or_else(|| order.strip_suffix('\n'))
            .unwrap_or(&order);
        let store = Self::from_image(&atlas, order)?;
        log::info!(
            "loaded {} glyphs from {}",
            store.len(),
            atlas_path.as_ref().display()
        );
        Ok(store)
    }

    /// The glyph for `c`, or the `?` glyph if the font does not have one.
    pub fn lookup(&self, c: char) -> &Glyph {
        self.glyphs
            .get(&c)
            .unwrap_or_else(|| &self.glyphs[&FALLBACK_CHAR])
    }

    /// The glyph for a one-character string; anything else gets the `?` glyph.
    pub fn lookup_str(&self, s: &str) -> &Glyph {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.lookup(c),
            _ => self.lookup(FALLBACK_CHAR),
        }
    }

    pub fn contains(&self, c: char) -> bool {
        self.glyphs.contains_key(&c)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
