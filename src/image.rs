//! Decoded images and their derived classification

use crate::config::SimulationConfig;
use crate::error::{FormatError, Result};
use crate::format::{ImageHeader, PatchHeader};
use crate::mode::{ColormapFamily, Quantity, QuantityKind};
use crate::patch::{Patch, PatchData};
use crate::types::{ImageType, Plane, Precision, ValueRange};
use crate::utils::format_bytes;
use chrono::NaiveDateTime;
use ndarray::Array2;
use std::path::{Path, PathBuf};

/// `ctime`-style timestamp the simulator writes into the header
const CREATION_TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// A map or cross-section slice with all of its patches
///
/// Patches are owned and kept in file order. Everything besides the patch
/// list is a pure function of the header codes.
#[derive(Debug, Clone)]
pub struct Image {
    filename: Option<PathBuf>,
    precision: Precision,
    time: f64,
    plane: Plane,
    coordinate: f64,
    mode: i32,
    gridinfo: i32,
    creation_time: String,
    quantity_kind: QuantityKind,
    patches: Vec<Patch>,
}

impl Image {
    /// Assemble an image from a validated header and its decoded patches
    pub(crate) fn from_decoded(
        header: &ImageHeader,
        precision: Precision,
        plane: Plane,
        quantity_kind: QuantityKind,
        patches: Vec<Patch>,
    ) -> Self {
        Self {
            filename: None,
            precision,
            time: header.time,
            plane,
            coordinate: header.coordinate,
            mode: header.mode,
            gridinfo: header.gridinfo,
            creation_time: header.creation_time_str(),
            quantity_kind,
            patches,
        }
    }

    pub(crate) fn with_filename(mut self, path: impl AsRef<Path>) -> Self {
        self.filename = Some(path.as_ref().to_path_buf());
        self
    }

    /// File the image was read from, if any
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn number_of_patches(&self) -> usize {
        self.patches.len()
    }

    /// Simulation time of the snapshot
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Axis held constant
    pub fn plane(&self) -> Plane {
        self.plane
    }

    /// Position of the slice along its normal axis
    pub fn coordinate(&self) -> f64 {
        self.coordinate
    }

    /// Raw mode code, meaningful only together with [`Image::quantity_kind`]
    pub fn mode(&self) -> i32 {
        self.mode
    }

    pub fn gridinfo(&self) -> i32 {
        self.gridinfo
    }

    /// Creation time as written by the simulator
    pub fn creation_time(&self) -> &str {
        &self.creation_time
    }

    /// Creation time parsed from the simulator's `ctime` format
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.creation_time.trim(), CREATION_TIME_FORMAT).ok()
    }

    pub fn quantity_kind(&self) -> QuantityKind {
        self.quantity_kind
    }

    pub fn image_type(&self) -> ImageType {
        self.plane.image_type()
    }

    pub fn is_cross_section(&self) -> bool {
        self.image_type().is_cross_section()
    }

    /// Quantity the samples represent
    pub fn quantity(&self) -> Result<&'static Quantity> {
        self.quantity_kind.quantity(self.mode)
    }

    pub fn quantity_name(&self) -> Result<&'static str> {
        Ok(self.quantity()?.name)
    }

    pub fn quantity_symbol(&self) -> Result<&'static str> {
        Ok(self.quantity()?.symbol)
    }

    pub fn quantity_unit(&self) -> Result<&'static str> {
        Ok(self.quantity()?.unit)
    }

    pub fn cmap_family(&self) -> Result<ColormapFamily> {
        Ok(self.quantity()?.cmap)
    }

    pub fn is_divergent(&self) -> Result<bool> {
        Ok(self.quantity()?.is_divergent())
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn patch(&self, number: usize) -> Option<&Patch> {
        self.patches.get(number)
    }

    /// Range covered by all patches
    pub fn value_range(&self) -> ValueRange {
        let mut range = ValueRange::empty();
        for patch in &self.patches {
            range.include(&patch.value_range());
        }
        range
    }

    /// Total size of all sample blocks in bytes
    pub fn sample_bytes(&self) -> usize {
        self.patches.iter().map(|p| p.data().len()).sum::<usize>() * self.precision.size_in_bytes()
    }

    /// Points from the configuration projected onto this image's plotting
    /// axes, or `None` when the key has no entries
    pub fn plot_coordinates(
        &self,
        config: &dyn SimulationConfig,
        key: &str,
    ) -> Option<(Vec<f64>, Vec<f64>)> {
        let points = config.coordinates(key);
        if points.is_empty() {
            return None;
        }
        Some(points.iter().map(|p| self.plane.project(p)).unzip())
    }

    pub fn source_coordinates(&self, config: &dyn SimulationConfig) -> Option<(Vec<f64>, Vec<f64>)> {
        self.plot_coordinates(config, "source")
    }

    pub fn receiver_coordinates(
        &self,
        config: &dyn SimulationConfig,
    ) -> Option<(Vec<f64>, Vec<f64>)> {
        self.plot_coordinates(config, "rec")
    }

    /// One-line description
    pub fn summary(&self) -> String {
        let quantity = match self.quantity() {
            Ok(q) => q.label(),
            Err(_) => format!("unknown mode {}", self.mode),
        };
        format!(
            "{} {}={} at t={}: {}, {} patches, {} ({})",
            self.image_type(),
            self.plane,
            self.coordinate,
            self.time,
            quantity,
            self.number_of_patches(),
            format_bytes(self.sample_bytes()),
            self.precision,
        )
    }
}

/// Builds images in memory, e.g. for synthetic data or for writing files
///
/// Grids are given in stored orientation: `nj` rows of `ni` columns.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    quantity_kind: QuantityKind,
    plane: Plane,
    precision: Precision,
    time: f64,
    coordinate: f64,
    mode: i32,
    gridinfo: i32,
    creation_time: String,
    patches: Vec<(PatchHeader, Array2<f64>)>,
}

impl ImageBuilder {
    pub fn new(quantity_kind: QuantityKind, plane: Plane) -> Self {
        Self {
            quantity_kind,
            plane,
            precision: Precision::F32,
            time: 0.0,
            coordinate: 0.0,
            mode: 1,
            gridinfo: 0,
            creation_time: String::new(),
            patches: Vec::new(),
        }
    }

    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn coordinate(mut self, coordinate: f64) -> Self {
        self.coordinate = coordinate;
        self
    }

    pub fn mode(mut self, mode: i32) -> Self {
        self.mode = mode;
        self
    }

    pub fn gridinfo(mut self, gridinfo: i32) -> Self {
        self.gridinfo = gridinfo;
        self
    }

    pub fn creation_time(mut self, creation_time: impl Into<String>) -> Self {
        self.creation_time = creation_time.into();
        self
    }

    /// Add a patch; `ni` and `nj` are taken from the grid shape
    pub fn patch(mut self, h: f64, zmin: f64, ib: i32, jb: i32, grid: Array2<f64>) -> Self {
        let (nj, ni) = grid.dim();
        let header = PatchHeader {
            h,
            zmin,
            ib,
            ni: ni as i32,
            jb,
            nj: nj as i32,
        };
        self.patches.push((header, grid));
        self
    }

    pub fn build(self) -> Result<Image> {
        let header = ImageHeader {
            precision: self.precision.code(),
            number_of_patches: i32::try_from(self.patches.len())
                .map_err(|_| FormatError::InvalidDimensions("too many patches".to_string()))?,
            time: self.time,
            plane: self.plane.code(),
            coordinate: self.coordinate,
            mode: self.mode,
            gridinfo: self.gridinfo,
            creation_time: ImageHeader::encode_creation_time(&self.creation_time),
        };

        let image_type = self.plane.image_type();
        let patches = self
            .patches
            .into_iter()
            .enumerate()
            .map(|(number, (patch_header, grid))| {
                let data = match self.precision {
                    Precision::F32 => PatchData::F32(grid.mapv(|v| v as f32)),
                    Precision::F64 => PatchData::F64(grid),
                };
                Patch::new(number, &patch_header, data, image_type)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Image::from_decoded(
            &header,
            self.precision,
            self.plane,
            self.quantity_kind,
            patches,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfig;
    use crate::types::Point3;
    use chrono::{Datelike, Timelike};

    fn map_image(mode: i32) -> Image {
        ImageBuilder::new(QuantityKind::Velocity, Plane::Z)
            .mode(mode)
            .time(2.5)
            .creation_time("Wed Jun 10 12:34:56 2015")
            .patch(50.0, 0.0, 1, 1, Array2::from_elem((2, 3), 1.0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_classification() {
        let image = map_image(3);
        assert!(!image.is_cross_section());
        assert_eq!(image.image_type().as_str(), "map");
        assert_eq!(image.plane().label(), "Z");
        assert_eq!(image.precision().size_in_bytes(), 4);
        assert_eq!(image.number_of_patches(), 1);

        assert_eq!(image.quantity_name().unwrap(), "Z velocity");
        assert_eq!(image.quantity_symbol().unwrap(), "vz");
        assert_eq!(image.quantity_unit().unwrap(), "m/s");
        assert!(image.is_divergent().unwrap());

        let cross = ImageBuilder::new(QuantityKind::Displacement, Plane::Y)
            .mode(29)
            .build()
            .unwrap();
        assert!(cross.is_cross_section());
        assert_eq!(cross.image_type().to_string(), "cross-section");
        assert!(!cross.is_divergent().unwrap());
        assert_eq!(cross.cmap_family().unwrap(), ColormapFamily::Sequential);
    }

    #[test]
    fn test_unknown_mode_deferred_to_metadata() {
        let image = map_image(99);
        assert_eq!(image.number_of_patches(), 1);
        assert!(matches!(
            image.quantity(),
            Err(FormatError::UnknownMode { code: 99, .. })
        ));
        assert!(image.is_divergent().is_err());
        assert!(image.summary().contains("unknown mode 99"));
    }

    #[test]
    fn test_created_at() {
        let image = map_image(1);
        let created = image.created_at().unwrap();
        assert_eq!(created.year(), 2015);
        assert_eq!(created.month(), 6);
        assert_eq!(created.hour(), 12);
        assert_eq!(created.second(), 56);

        let blank = ImageBuilder::new(QuantityKind::Velocity, Plane::Z)
            .build()
            .unwrap();
        assert!(blank.created_at().is_none());
    }

    #[test]
    fn test_plot_coordinates() {
        let mut config = StaticConfig::default();
        config.insert("source", vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)]);

        let map = map_image(1);
        let (x, y) = map.source_coordinates(&config).unwrap();
        assert_eq!(x, vec![2.0, 5.0]);
        assert_eq!(y, vec![1.0, 4.0]);
        assert!(map.receiver_coordinates(&config).is_none());

        let cross = ImageBuilder::new(QuantityKind::Velocity, Plane::X)
            .build()
            .unwrap();
        let (x, y) = cross.source_coordinates(&config).unwrap();
        assert_eq!(x, vec![2.0, 5.0]);
        assert_eq!(y, vec![3.0, 6.0]);
    }

    #[test]
    fn test_summary_and_ranges() {
        let image = ImageBuilder::new(QuantityKind::Displacement, Plane::X)
            .precision(Precision::F64)
            .coordinate(1500.0)
            .patch(10.0, 0.0, 1, 1, Array2::from_elem((2, 2), -3.0))
            .patch(20.0, 100.0, 1, 1, Array2::from_elem((2, 2), 7.0))
            .build()
            .unwrap();

        assert_eq!(image.value_range(), ValueRange::new(-3.0, 7.0));
        assert_eq!(image.sample_bytes(), 64);
        let summary = image.summary();
        assert!(summary.starts_with("cross-section X=1500"));
        assert!(summary.contains("X displacement [m]"));
        assert!(summary.contains("2 patches"));
    }
}
