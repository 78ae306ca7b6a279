//! Sequential decoder and encoder for SW4 image streams
//!
//! Decoding is strictly ordered: the image header fixes the precision and the
//! patch count, the patch headers fix each block's dimensions, and only then
//! can the sample blocks be read. Nothing is returned until the whole stream
//! has been consumed successfully.

use crate::config::{resolve_quantity_kind, SimulationConfig};
use crate::error::{FormatError, Result};
use crate::format::{ImageHeader, PatchHeader, IMAGE_HEADER_SIZE, PATCH_HEADER_SIZE};
use crate::image::Image;
use crate::mode::QuantityKind;
use crate::patch::{Patch, PatchData};
use crate::types::{ImageType, Plane, Precision};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Default upper bound on the number of patches in one image
pub const DEFAULT_MAX_PATCHES: usize = 1024;

/// Default upper bound on the number of samples in one patch
pub const DEFAULT_MAX_PATCH_SAMPLES: usize = 1 << 31;

/// Options controlling how an image is decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Quantity kind to use when no configuration declares one
    pub quantity_kind: Option<QuantityKind>,

    /// Reject images declaring more patches than this
    pub max_patches: usize,

    /// Reject patches with more samples than this
    pub max_patch_samples: usize,

    /// Fail the decode when the mode code is not in the quantity table,
    /// instead of failing later on metadata access
    pub strict_mode: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            quantity_kind: None,
            max_patches: DEFAULT_MAX_PATCHES,
            max_patch_samples: DEFAULT_MAX_PATCH_SAMPLES,
            strict_mode: false,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quantity_kind(mut self, kind: QuantityKind) -> Self {
        self.quantity_kind = Some(kind);
        self
    }

    pub fn with_max_patches(mut self, max_patches: usize) -> Self {
        self.max_patches = max_patches;
        self
    }

    pub fn with_max_patch_samples(mut self, max_patch_samples: usize) -> Self {
        self.max_patch_samples = max_patch_samples;
        self
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }
}

/// Decoder over any byte stream
pub struct ImageReader<R> {
    reader: R,
    options: ReadOptions,
}

impl<R: Read> ImageReader<R> {
    pub fn new(reader: R, options: ReadOptions) -> Self {
        Self { reader, options }
    }

    /// Read exactly `len` bytes, growing the buffer only as data arrives
    fn read_block(&mut self, len: usize, what: &str) -> Result<Bytes> {
        let mut buf = Vec::new();
        (&mut self.reader).take(len as u64).read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(FormatError::Truncated(format!(
                "{}: expected {} bytes, got {}",
                what,
                len,
                buf.len()
            )));
        }
        Ok(Bytes::from(buf))
    }

    /// Read the fixed-size image header
    pub fn read_header(&mut self) -> Result<ImageHeader> {
        let mut record = self.read_block(IMAGE_HEADER_SIZE, "image header")?;
        let header = ImageHeader::parse(&mut record);
        debug!(
            "image header: precision={} patches={} time={} plane={} mode={}",
            header.precision, header.number_of_patches, header.time, header.plane, header.mode
        );
        Ok(header)
    }

    /// Read `count` patch headers in one pass
    pub fn read_patch_headers(&mut self, count: usize) -> Result<Vec<PatchHeader>> {
        let len = count
            .checked_mul(PATCH_HEADER_SIZE)
            .ok_or_else(|| FormatError::InvalidDimensions(format!("{} patches", count)))?;
        let mut records = self.read_block(len, "patch headers")?;

        let mut headers = Vec::with_capacity(count);
        for number in 0..count {
            let header = PatchHeader::parse(&mut records);
            if header.ni <= 0 || header.nj <= 0 {
                return Err(FormatError::InvalidDimensions(format!(
                    "patch {}: ni={} nj={}",
                    number, header.ni, header.nj
                )));
            }
            debug!(
                "patch {}: h={} zmin={} ni={} nj={}",
                number, header.h, header.zmin, header.ni, header.nj
            );
            headers.push(header);
        }
        Ok(headers)
    }

    /// Read one sample block as `nj` rows of `ni` columns
    pub fn read_samples(
        &mut self,
        number: usize,
        header: &PatchHeader,
        precision: Precision,
    ) -> Result<PatchData> {
        let ni = header.ni as usize;
        let nj = header.nj as usize;
        let count = ni
            .checked_mul(nj)
            .filter(|&n| n <= self.options.max_patch_samples)
            .ok_or_else(|| {
                FormatError::InvalidDimensions(format!(
                    "patch {}: {} x {} samples exceeds limit of {}",
                    number, ni, nj, self.options.max_patch_samples
                ))
            })?;
        let len = count
            .checked_mul(precision.size_in_bytes())
            .ok_or_else(|| FormatError::InvalidDimensions(format!("patch {}", number)))?;

        let what = format!("patch {} samples", number);
        let mut block = self.read_block(len, &what)?;
        let data = match precision {
            Precision::F32 => {
                let values: Vec<f32> = (0..count).map(|_| block.get_f32_le()).collect();
                PatchData::F32(Array2::from_shape_vec((nj, ni), values).map_err(shape_error)?)
            }
            Precision::F64 => {
                let values: Vec<f64> = (0..count).map(|_| block.get_f64_le()).collect();
                PatchData::F64(Array2::from_shape_vec((nj, ni), values).map_err(shape_error)?)
            }
        };
        Ok(data)
    }

    /// Decode the whole stream into an image
    pub fn read(mut self, quantity_kind: QuantityKind) -> Result<Image> {
        let header = self.read_header()?;

        let precision = Precision::from_code(header.precision)?;
        let plane = Plane::from_code(header.plane)?;
        if self.options.strict_mode {
            quantity_kind.quantity(header.mode)?;
        }

        let count = usize::try_from(header.number_of_patches)
            .ok()
            .filter(|&n| n <= self.options.max_patches)
            .ok_or_else(|| {
                FormatError::InvalidDimensions(format!(
                    "patch count {} outside 0..={}",
                    header.number_of_patches, self.options.max_patches
                ))
            })?;

        let patch_headers = self.read_patch_headers(count)?;
        let image_type = plane.image_type();

        let mut patches = Vec::with_capacity(count);
        for (number, patch_header) in patch_headers.iter().enumerate() {
            let data = self.read_samples(number, patch_header, precision)?;
            patches.push(Patch::new(number, patch_header, data, image_type)?);
        }

        Ok(Image::from_decoded(
            &header,
            precision,
            plane,
            quantity_kind,
            patches,
        ))
    }
}

fn shape_error(err: ndarray::ShapeError) -> FormatError {
    FormatError::InvalidDimensions(err.to_string())
}

/// Decode an image from a stream, resolving the quantity kind from the
/// options and the optional configuration
pub fn read_image<R: Read>(
    reader: R,
    options: &ReadOptions,
    config: Option<&dyn SimulationConfig>,
) -> Result<Image> {
    let kind = resolve_quantity_kind(options.quantity_kind, config)?;
    ImageReader::new(reader, options.clone()).read(kind)
}

/// Decode an image held in memory
pub fn decode_image(
    data: Bytes,
    options: &ReadOptions,
    config: Option<&dyn SimulationConfig>,
) -> Result<Image> {
    read_image(data.reader(), options, config)
}

/// Encode an image back into its on-disk form
///
/// Map patches are transposed back to the stored orientation.
pub fn encode_image(image: &Image) -> Bytes {
    let header = ImageHeader {
        precision: image.precision().code(),
        number_of_patches: image.number_of_patches() as i32,
        time: image.time(),
        plane: image.plane().code(),
        coordinate: image.coordinate(),
        mode: image.mode(),
        gridinfo: image.gridinfo(),
        creation_time: ImageHeader::encode_creation_time(image.creation_time()),
    };

    let capacity = IMAGE_HEADER_SIZE
        + image.number_of_patches() * PATCH_HEADER_SIZE
        + image.sample_bytes();
    let mut buf = BytesMut::with_capacity(capacity);
    header.write(&mut buf);

    for patch in image.patches() {
        PatchHeader {
            h: patch.h(),
            zmin: patch.zmin(),
            ib: patch.ib(),
            ni: patch.ni() as i32,
            jb: patch.jb(),
            nj: patch.nj() as i32,
        }
        .write(&mut buf);
    }

    for patch in image.patches() {
        let stored_order = patch.image_type() == ImageType::CrossSection;
        match patch.data() {
            PatchData::F32(grid) => {
                let grid = if stored_order { grid.view() } else { grid.t() };
                grid.iter().for_each(|&v| buf.put_f32_le(v));
            }
            PatchData::F64(grid) => {
                let grid = if stored_order { grid.view() } else { grid.t() };
                grid.iter().for_each(|&v| buf.put_f64_le(v));
            }
        }
    }

    buf.freeze()
}
