//! On-disk record layout of SW4 image files
//!
//! An image file is a packed little-endian stream:
//!
//! ```text
//! image header   61 bytes, once
//! patch header   32 bytes, repeated number_of_patches times
//! sample block   ni * nj * precision bytes, once per patch, in patch order
//! ```

use bytes::{Buf, BufMut};

/// Size in bytes of the image header record
pub const IMAGE_HEADER_SIZE: usize = 61;

/// Size in bytes of one patch header record
pub const PATCH_HEADER_SIZE: usize = 32;

/// Width of the creation-time field at the end of the image header
pub const CREATION_TIME_LEN: usize = 25;

/// Conventional file extension
pub const IMAGE_EXTENSION: &str = "sw4img";

/// Image header exactly as stored
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHeader {
    pub precision: i32,
    pub number_of_patches: i32,
    pub time: f64,
    pub plane: i32,
    pub coordinate: f64,
    pub mode: i32,
    pub gridinfo: i32,
    pub creation_time: [u8; CREATION_TIME_LEN],
}

impl ImageHeader {
    /// Parse from a buffer holding at least [`IMAGE_HEADER_SIZE`] bytes
    pub fn parse(buf: &mut impl Buf) -> Self {
        let precision = buf.get_i32_le();
        let number_of_patches = buf.get_i32_le();
        let time = buf.get_f64_le();
        let plane = buf.get_i32_le();
        let coordinate = buf.get_f64_le();
        let mode = buf.get_i32_le();
        let gridinfo = buf.get_i32_le();
        let mut creation_time = [0u8; CREATION_TIME_LEN];
        buf.copy_to_slice(&mut creation_time);

        Self {
            precision,
            number_of_patches,
            time,
            plane,
            coordinate,
            mode,
            gridinfo,
            creation_time,
        }
    }

    pub fn write(&self, buf: &mut impl BufMut) {
        buf.put_i32_le(self.precision);
        buf.put_i32_le(self.number_of_patches);
        buf.put_f64_le(self.time);
        buf.put_i32_le(self.plane);
        buf.put_f64_le(self.coordinate);
        buf.put_i32_le(self.mode);
        buf.put_i32_le(self.gridinfo);
        buf.put_slice(&self.creation_time);
    }

    /// Creation time with padding stripped
    pub fn creation_time_str(&self) -> String {
        String::from_utf8_lossy(&self.creation_time)
            .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string()
    }

    /// Pack a creation-time string into the fixed-width field, truncating
    /// anything past [`CREATION_TIME_LEN`] bytes
    pub fn encode_creation_time(text: &str) -> [u8; CREATION_TIME_LEN] {
        let mut field = [0u8; CREATION_TIME_LEN];
        let bytes = text.as_bytes();
        let len = bytes.len().min(CREATION_TIME_LEN);
        field[..len].copy_from_slice(&bytes[..len]);
        field
    }
}

/// Patch header exactly as stored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchHeader {
    pub h: f64,
    pub zmin: f64,
    pub ib: i32,
    pub ni: i32,
    pub jb: i32,
    pub nj: i32,
}

impl PatchHeader {
    /// Parse from a buffer holding at least [`PATCH_HEADER_SIZE`] bytes
    pub fn parse(buf: &mut impl Buf) -> Self {
        Self {
            h: buf.get_f64_le(),
            zmin: buf.get_f64_le(),
            ib: buf.get_i32_le(),
            ni: buf.get_i32_le(),
            jb: buf.get_i32_le(),
            nj: buf.get_i32_le(),
        }
    }

    pub fn write(&self, buf: &mut impl BufMut) {
        buf.put_f64_le(self.h);
        buf.put_f64_le(self.zmin);
        buf.put_i32_le(self.ib);
        buf.put_i32_le(self.ni);
        buf.put_i32_le(self.jb);
        buf.put_i32_le(self.nj);
    }
}
