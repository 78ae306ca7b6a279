//! Serializable image summaries

use crate::image::Image;
use crate::mode::{Quantity, QuantityKind};
use crate::patch::{Patch, PatchStats};
use crate::types::{Extent, ImageType, Plane, Precision};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Header-level description of an image
#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    /// Source file, if the image was read from one
    pub filename: Option<String>,

    pub image_type: ImageType,
    pub plane: Plane,
    pub coordinate: f64,
    pub time: f64,
    pub precision: Precision,
    pub quantity_kind: QuantityKind,
    pub mode: i32,

    /// `None` when the mode code is not in the quantity table
    pub quantity: Option<Quantity>,

    pub gridinfo: i32,
    pub creation_time: String,
    pub created_at: Option<NaiveDateTime>,
    pub patches: Vec<PatchSummary>,
}

/// Placement and statistics of one patch
#[derive(Debug, Clone, Serialize)]
pub struct PatchSummary {
    pub number: usize,
    pub h: f64,
    pub zmin: f64,
    pub ib: i32,
    pub jb: i32,
    pub ni: usize,
    pub nj: usize,
    pub extent: Extent,
    pub stats: PatchStats,
}

impl From<&Patch> for PatchSummary {
    fn from(patch: &Patch) -> Self {
        Self {
            number: patch.number(),
            h: patch.h(),
            zmin: patch.zmin(),
            ib: patch.ib(),
            jb: patch.jb(),
            ni: patch.ni(),
            nj: patch.nj(),
            extent: patch.extent(),
            stats: patch.stats(),
        }
    }
}

impl From<&Image> for ImageSummary {
    fn from(image: &Image) -> Self {
        Self {
            filename: image.filename().map(|p| p.display().to_string()),
            image_type: image.image_type(),
            plane: image.plane(),
            coordinate: image.coordinate(),
            time: image.time(),
            precision: image.precision(),
            quantity_kind: image.quantity_kind(),
            mode: image.mode(),
            quantity: image.quantity().ok().copied(),
            gridinfo: image.gridinfo(),
            creation_time: image.creation_time().to_string(),
            created_at: image.created_at(),
            patches: image.patches().iter().map(PatchSummary::from).collect(),
        }
    }
}

impl ImageSummary {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
