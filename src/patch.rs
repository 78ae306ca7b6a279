//! Patches: one rectangular sample grid of an image

use crate::error::{FormatError, Result};
use crate::format::PatchHeader;
use crate::types::{nan_max, nan_min, ColorbarExtend, Extent, ImageType, Precision, ValueRange};
use ndarray::Array2;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Sample grid at the precision it was stored with
#[derive(Debug, Clone, PartialEq)]
pub enum PatchData {
    F32(Array2<f32>),
    F64(Array2<f64>),
}

impl PatchData {
    pub fn precision(&self) -> Precision {
        match self {
            PatchData::F32(_) => Precision::F32,
            PatchData::F64(_) => Precision::F64,
        }
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        match self {
            PatchData::F32(grid) => grid.dim(),
            PatchData::F64(grid) => grid.dim(),
        }
    }

    pub fn len(&self) -> usize {
        let (rows, cols) = self.shape();
        rows * cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_f32(&self) -> Option<&Array2<f32>> {
        match self {
            PatchData::F32(grid) => Some(grid),
            PatchData::F64(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<&Array2<f64>> {
        match self {
            PatchData::F64(grid) => Some(grid),
            PatchData::F32(_) => None,
        }
    }

    /// Sample at (row, column), widened to f64
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        match self {
            PatchData::F32(grid) => grid.get((row, col)).map(|&v| f64::from(v)),
            PatchData::F64(grid) => grid.get((row, col)).copied(),
        }
    }

    /// Copy of the grid widened to f64
    pub fn to_f64(&self) -> Array2<f64> {
        match self {
            PatchData::F32(grid) => grid.mapv(f64::from),
            PatchData::F64(grid) => grid.clone(),
        }
    }

    /// Swap rows and columns, keeping a standard memory layout
    pub fn transposed(&self) -> Self {
        match self {
            PatchData::F32(grid) => PatchData::F32(grid.t().as_standard_layout().into_owned()),
            PatchData::F64(grid) => PatchData::F64(grid.t().as_standard_layout().into_owned()),
        }
    }

    fn stats(&self) -> PatchStats {
        match self {
            PatchData::F32(grid) => grid_stats(grid),
            PatchData::F64(grid) => grid_stats(grid),
        }
    }
}

/// Summary statistics over every sample of a patch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchStats {
    pub min: f64,
    pub max: f64,
    /// Population standard deviation
    pub std: f64,
    /// Root mean square
    pub rms: f64,
}

fn grid_stats<T: Float>(grid: &Array2<T>) -> PatchStats {
    let n = grid.len();
    if n == 0 {
        return PatchStats {
            min: f64::NAN,
            max: f64::NAN,
            std: f64::NAN,
            rms: f64::NAN,
        };
    }

    // NaN samples poison all four statistics, min and max included
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for value in grid.iter() {
        let v = value.to_f64().unwrap_or(f64::NAN);
        min = nan_min(min, v);
        max = nan_max(max, v);
        sum += v;
        sum_sq += v * v;
    }

    let mean = sum / n as f64;
    let variance = grid
        .iter()
        .map(|value| {
            let d = value.to_f64().unwrap_or(f64::NAN) - mean;
            d * d
        })
        .sum::<f64>()
        / n as f64;

    PatchStats {
        min,
        max,
        std: variance.sqrt(),
        rms: (sum_sq / n as f64).sqrt(),
    }
}

/// One rectangular grid of an image with its spatial placement
///
/// All derived fields are computed in [`Patch::new`]; a patch never changes
/// afterwards.
#[derive(Debug, Clone)]
pub struct Patch {
    number: usize,
    image_type: ImageType,
    h: f64,
    zmin: f64,
    ib: i32,
    ni: usize,
    jb: i32,
    nj: usize,
    data: PatchData,
    extent: Extent,
    stats: PatchStats,
}

impl Patch {
    /// Build a patch from its header and the grid as stored (`nj` rows of
    /// `ni` columns)
    ///
    /// Map images are transposed so that rows run along x; cross-sections
    /// keep the stored orientation with depth along the rows.
    pub fn new(
        number: usize,
        header: &PatchHeader,
        stored: PatchData,
        image_type: ImageType,
    ) -> Result<Self> {
        if header.ni <= 0 || header.nj <= 0 {
            return Err(FormatError::InvalidDimensions(format!(
                "patch {}: ni={} nj={}",
                number, header.ni, header.nj
            )));
        }
        let ni = header.ni as usize;
        let nj = header.nj as usize;
        if stored.shape() != (nj, ni) {
            return Err(FormatError::InvalidDimensions(format!(
                "patch {}: grid shape {:?} does not match nj x ni = ({}, {})",
                number,
                stored.shape(),
                nj,
                ni
            )));
        }

        let h = header.h;
        let half = h / 2.0;
        let stats = stored.stats();

        let (data, extent) = match image_type {
            ImageType::CrossSection => (
                stored,
                Extent::new(
                    0.0 - half,
                    (ni - 1) as f64 * h + half,
                    header.zmin - half,
                    header.zmin + (nj - 1) as f64 * h + half,
                ),
            ),
            ImageType::Map => (
                stored.transposed(),
                Extent::new(
                    0.0 - half,
                    (nj - 1) as f64 * h + half,
                    0.0 - half,
                    (ni - 1) as f64 * h + half,
                ),
            ),
        };

        Ok(Self {
            number,
            image_type,
            h,
            zmin: header.zmin,
            ib: header.ib,
            ni,
            jb: header.jb,
            nj,
            data,
            extent,
            stats,
        })
    }

    /// 0-based position in the image
    pub fn number(&self) -> usize {
        self.number
    }

    /// View type of the owning image
    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    /// Grid spacing
    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn zmin(&self) -> f64 {
        self.zmin
    }

    pub fn ib(&self) -> i32 {
        self.ib
    }

    pub fn jb(&self) -> i32 {
        self.jb
    }

    pub fn ni(&self) -> usize {
        self.ni
    }

    pub fn nj(&self) -> usize {
        self.nj
    }

    pub fn data(&self) -> &PatchData {
        &self.data
    }

    /// Shape of the in-memory grid (after any transpose)
    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }

    pub fn precision(&self) -> Precision {
        self.data.precision()
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn stats(&self) -> PatchStats {
        self.stats
    }

    pub fn min(&self) -> f64 {
        self.stats.min
    }

    pub fn max(&self) -> f64 {
        self.stats.max
    }

    pub fn std(&self) -> f64 {
        self.stats.std
    }

    pub fn rms(&self) -> f64 {
        self.stats.rms
    }

    pub fn value_range(&self) -> ValueRange {
        ValueRange::new(self.stats.min, self.stats.max)
    }

    /// Default colour limits: the data range, centered on zero for
    /// divergent quantities
    pub fn color_limits(&self, divergent: bool) -> ValueRange {
        if divergent {
            self.value_range().symmetric()
        } else {
            self.value_range()
        }
    }

    /// Which colour-bar ends the data overflows for the given limits
    pub fn extend(&self, vmin: Option<f64>, vmax: Option<f64>) -> ColorbarExtend {
        let below = vmin.is_some_and(|v| self.stats.min < v);
        let above = vmax.is_some_and(|v| self.stats.max > v);
        match (below, above) {
            (true, true) => ColorbarExtend::Both,
            (true, false) => ColorbarExtend::Min,
            (false, true) => ColorbarExtend::Max,
            (false, false) => ColorbarExtend::Neither,
        }
    }
}
