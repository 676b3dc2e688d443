//! JSON configuration for opening a matrix.
//!
//! Every field is optional:
//!
//! ```json
//! {
//!     "device": "/dev/fb1",
//!     "rotation": 90,
//!     "font": { "atlas": "font/sense_hat_text.png", "order": "font/sense_hat_text.txt" },
//!     "scroll_speed_ms": 80,
//!     "text_color": [255, 0, 0],
//!     "back_color": [0, 0, 0]
//! }
//! ```

use crate::error::{Error, Result};
use crate::rendering::pixel::Pixel;
use crate::rendering::rotation::Rotation;
use crate::text::ScrollOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DEVICE: &str = "/dev/fb1";

/// Where the font atlas and its character order live.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FontConfig {
    pub atlas: PathBuf,
    pub order: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MatrixConfig {
    /// Framebuffer node of the matrix.
    pub device: PathBuf,
    pub rotation: Rotation,
    /// Font used for letters and messages. Text cannot be shown without one.
    pub font: Option<FontConfig>,
    pub scroll_speed_ms: u64,
    pub text_color: Pixel,
    pub back_color: Pixel,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            rotation: Rotation::Deg0,
            font: None,
            scroll_speed_ms: 100,
            text_color: Pixel::WHITE,
            back_color: Pixel::BLACK,
        }
    }
}

impl MatrixConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn scroll_options(&self) -> ScrollOptions {
        ScrollOptions {
            speed: Duration::from_millis(self.scroll_speed_ms),
            text_color: self.text_color,
            back_color: self.back_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = MatrixConfig::from_json("{}").unwrap();
        assert_eq!(config, MatrixConfig::default());
        assert_eq!(config.device, PathBuf::from("/dev/fb1"));
        assert_eq!(config.scroll_options(), ScrollOptions::default());
    }

    #[test]
    fn test_full_config() {
        let config = MatrixConfig::from_json(
            r#"{
                "device": "/dev/fb0",
                "rotation": 270,
                "font": { "atlas": "a.png", "order": "a.txt" },
                "scroll_speed_ms": 20,
                "text_color": [255, 0, 0],
                "back_color": [0, 0, 64]
            }"#,
        )
        .unwrap();
        assert_eq!(config.rotation, Rotation::Deg270);
        assert_eq!(config.font.unwrap().order, PathBuf::from("a.txt"));
        assert_eq!(config.scroll_speed_ms, 20);
        assert_eq!(config.text_color, Pixel::new(255, 0, 0));
        assert_eq!(config.back_color, Pixel::new(0, 0, 64));
    }

    #[test]
    fn test_bad_config() {
        for json in [
            r#"{ "rotation": 45 }"#,
            r#"{ "text_color": [256, 0, 0] }"#,
            r#"{ "colour": [1, 2, 3] }"#,
            "not json",
        ] {
            assert!(matches!(MatrixConfig::from_json(json), Err(Error::Config(_))), "{json}");
        }
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("senseled.json");
        std::fs::write(&path, r#"{ "rotation": 180 }"#).unwrap();
        assert_eq!(MatrixConfig::from_file(&path).unwrap().rotation, Rotation::Deg180);
        assert!(matches!(
            MatrixConfig::from_file(dir.path().join("missing.json")),
            Err(Error::Config(_))
        ));
    }
}
