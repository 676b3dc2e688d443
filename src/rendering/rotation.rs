//! Mapping between logical matrix coordinates and physical device cells.
//!
//! Callers address the matrix in *logical* coordinates: `(0, 0)` is the top-left LED as the
//! viewer sees it. The device stores its cells in *physical* order, which depends on how the
//! board is mounted. A [`Rotation`] of `r` degrees turns the logical image clockwise by `r`
//! on its way to the device.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height of the matrix.
pub const MATRIX_SIZE: usize = 8;

/// One of the four supported orientations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// All rotations, in increasing angle.
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Parses an angle in degrees.
    ///
    /// ```rust
    /// use senseled::rendering::rotation::Rotation;
    ///
    /// assert_eq!(Rotation::from_degrees(180).unwrap(), Rotation::Deg180);
    /// assert!(Rotation::from_degrees(45).is_err());
    /// ```
    pub fn from_degrees(degrees: i64) -> Result<Self> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(Error::InvalidRotation(other)),
        }
    }

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// Number of clockwise quarter turns, `0..4`.
    pub fn quarter_turns(self) -> usize {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    fn from_quarter_turns(turns: usize) -> Self {
        Self::ALL[turns % 4]
    }

    /// The rotation 90 degrees to the left of `self`; `Deg0` wraps to `Deg270`.
    pub fn rotated_left(self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + 3)
    }

    /// The rotation that undoes `self`.
    pub fn inverse(self) -> Self {
        Self::from_quarter_turns(4 - self.quarter_turns())
    }

    /// Physical cell index of the logical coordinate `(x, y)`.
    ///
    /// Both coordinates must be below [`MATRIX_SIZE`]; the result is then in `0..64`.
    pub fn offset(self, x: usize, y: usize) -> usize {
        debug_assert!(x < MATRIX_SIZE && y < MATRIX_SIZE);
        match self {
            Rotation::Deg0 => x + 8 * y,
            Rotation::Deg90 => 7 + 8 * x - y,
            Rotation::Deg180 => 63 - x - 8 * y,
            Rotation::Deg270 => 56 - 8 * x + y,
        }
    }
}

/// Physical cell index of `(x, y)` under a rotation given in degrees.
pub fn offset(x: usize, y: usize, degrees: i64) -> Result<usize> {
    Ok(Rotation::from_degrees(degrees)?.offset(x, y))
}

impl TryFrom<i64> for Rotation {
    type Error = Error;

    fn try_from(degrees: i64) -> Result<Self> {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for i64 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees() as i64
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}
