//! Core data types for SW4 images

use crate::error::{FormatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample precision of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Precision {
    /// 32-bit floating point
    F32 = 4,
    /// 64-bit floating point
    F64 = 8,
}

impl Precision {
    /// Resolve a precision code read from the file header
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            4 => Ok(Precision::F32),
            8 => Ok(Precision::F64),
            other => Err(FormatError::InvalidPrecision(other)),
        }
    }

    /// Code written to the file header
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Size in bytes of one sample
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Precision::F32 => 4,
            Precision::F64 => 8,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Axis held constant by an image slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Plane {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Plane {
    /// Resolve a plane code read from the file header
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Plane::X),
            1 => Ok(Plane::Y),
            2 => Ok(Plane::Z),
            other => Err(FormatError::InvalidPlane(other)),
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Axis label ("X", "Y" or "Z")
    pub fn label(&self) -> &'static str {
        match self {
            Plane::X => "X",
            Plane::Y => "Y",
            Plane::Z => "Z",
        }
    }

    /// Kind of slice produced by holding this axis constant
    pub fn image_type(&self) -> ImageType {
        match self {
            Plane::X | Plane::Y => ImageType::CrossSection,
            Plane::Z => ImageType::Map,
        }
    }

    /// Project a 3-D point onto the plotting axes of this plane
    ///
    /// Cross-sections keep depth on the vertical axis; maps put y on the
    /// horizontal axis and x on the vertical one.
    pub fn project(&self, point: &Point3) -> (f64, f64) {
        match self {
            Plane::X => (point.y, point.z),
            Plane::Y => (point.x, point.z),
            Plane::Z => (point.y, point.x),
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map view or cross-section view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageType {
    CrossSection,
    Map,
}

impl ImageType {
    pub fn is_cross_section(&self) -> bool {
        matches!(self, ImageType::CrossSection)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::CrossSection => "cross-section",
            ImageType::Map => "map",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point in simulation coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Physical bounding box of a patch (left, right, bottom, top)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Extent {
    pub fn new(left: f64, right: f64, bottom: f64, top: f64) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// As a `[left, right, bottom, top]` array
    pub fn to_array(&self) -> [f64; 4] {
        [self.left, self.right, self.bottom, self.top]
    }
}

/// Value range of a patch or image series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range that `include` can grow from
    pub fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Widen the range to cover `other`; a NaN bound on either side stays NaN
    pub fn include(&mut self, other: &ValueRange) {
        self.min = nan_min(self.min, other.min);
        self.max = nan_max(self.max, other.max);
    }

    /// Range centered on zero that covers both ends
    pub fn symmetric(&self) -> Self {
        let abs_max = nan_max(self.min.abs(), self.max.abs());
        Self::new(-abs_max, abs_max)
    }
}

pub(crate) fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

pub(crate) fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// Which ends of a colour bar the data overflows, given explicit limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorbarExtend {
    Neither,
    Min,
    Max,
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_codes() {
        assert_eq!(Precision::from_code(4).unwrap(), Precision::F32);
        assert_eq!(Precision::from_code(8).unwrap(), Precision::F64);
        assert_eq!(Precision::F64.size_in_bytes(), 8);
        assert!(matches!(
            Precision::from_code(2),
            Err(FormatError::InvalidPrecision(2))
        ));
    }

    #[test]
    fn test_plane_codes() {
        assert_eq!(Plane::from_code(0).unwrap().label(), "X");
        assert_eq!(Plane::from_code(1).unwrap().label(), "Y");
        assert_eq!(Plane::from_code(2).unwrap().label(), "Z");
        assert!(matches!(
            Plane::from_code(3),
            Err(FormatError::InvalidPlane(3))
        ));

        assert!(Plane::X.image_type().is_cross_section());
        assert!(Plane::Y.image_type().is_cross_section());
        assert_eq!(Plane::Z.image_type(), ImageType::Map);
        assert_eq!(Plane::Z.image_type().to_string(), "map");
    }

    #[test]
    fn test_plane_projection() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Plane::X.project(&p), (2.0, 3.0));
        assert_eq!(Plane::Y.project(&p), (1.0, 3.0));
        assert_eq!(Plane::Z.project(&p), (2.0, 1.0));
    }

    #[test]
    fn test_value_range() {
        let mut range = ValueRange::empty();
        assert!(!range.is_valid());

        range.include(&ValueRange::new(-2.0, 1.0));
        range.include(&ValueRange::new(0.0, 5.0));
        assert_eq!(range, ValueRange::new(-2.0, 5.0));
        assert_eq!(range.symmetric(), ValueRange::new(-5.0, 5.0));

        range.include(&ValueRange::new(f64::NAN, f64::NAN));
        assert!(range.min.is_nan() && range.max.is_nan());
        assert!(!range.is_valid());
        assert!(range.symmetric().max.is_nan());
    }
}
