//! Image series: many snapshots of the same run decoded together
//!
//! A batch driver (e.g. one that renders frames for a movie) needs every
//! image of a run before drawing the first frame, to pick one colour range
//! for the whole sequence. Files are independent, so they are decoded
//! concurrently.

use crate::codec::ReadOptions;
use crate::config::SimulationConfig;
use crate::error::{FormatError, Result};
use crate::image::Image;
use crate::io::{load_image, open_image, IOManager};
use crate::types::ValueRange;
use crate::utils::format_bytes;
use futures::future::try_join_all;
use std::path::PathBuf;
use std::sync::Arc;

/// Decoded images in input order
#[derive(Debug, Clone, Default)]
pub struct ImageSeries {
    images: Vec<Image>,
}

impl ImageSeries {
    pub fn from_images(images: Vec<Image>) -> Self {
        Self { images }
    }

    /// Decode files in parallel on the blocking pool
    pub async fn open(
        paths: &[PathBuf],
        options: &ReadOptions,
        config: Option<Arc<dyn SimulationConfig>>,
    ) -> Result<Self> {
        let handles: Vec<_> = paths
            .iter()
            .cloned()
            .map(|path| {
                let options = options.clone();
                let config = config.clone();
                tokio::task::spawn_blocking(move || open_image(&path, &options, config.as_deref()))
            })
            .collect();

        let results = try_join_all(handles)
            .await
            .map_err(|e| FormatError::Io(std::io::Error::other(e)))?;
        let images = results.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(Self { images })
    }

    /// Load images through an I/O manager concurrently
    pub async fn load(
        io: &dyn IOManager,
        paths: &[String],
        options: &ReadOptions,
        config: Option<&dyn SimulationConfig>,
    ) -> Result<Self> {
        let futures: Vec<_> = paths
            .iter()
            .map(|path| load_image(io, path, options, config))
            .collect();

        let images = try_join_all(futures).await?;
        Ok(Self { images })
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Image> {
        self.images.iter()
    }

    /// Simulation time of every image
    pub fn times(&self) -> Vec<f64> {
        self.images.iter().map(Image::time).collect()
    }

    /// Shared colour range for one patch across the whole series
    ///
    /// Divergent quantities get limits centered on zero.
    pub fn value_range(&self, patch_number: usize) -> Result<ValueRange> {
        let mut range = ValueRange::empty();
        for image in &self.images {
            let patch = image.patch(patch_number).ok_or_else(|| {
                FormatError::NotFound(format!(
                    "patch {} in {}",
                    patch_number,
                    image
                        .filename()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "image".to_string())
                ))
            })?;
            range.include(&patch.value_range());
        }

        let last = self
            .images
            .last()
            .ok_or_else(|| FormatError::NotFound("no images in series".to_string()))?;
        if last.is_divergent()? {
            Ok(range.symmetric())
        } else {
            Ok(range)
        }
    }

    pub fn stats(&self) -> SeriesStats {
        SeriesStats {
            image_count: self.images.len(),
            total_patches: self.images.iter().map(Image::number_of_patches).sum(),
            sample_bytes: self.images.iter().map(Image::sample_bytes).sum(),
            first_time: self.images.first().map(Image::time),
            last_time: self.images.last().map(Image::time),
        }
    }
}

/// Series statistics
#[derive(Debug, Clone)]
pub struct SeriesStats {
    pub image_count: usize,
    pub total_patches: usize,
    pub sample_bytes: usize,
    pub first_time: Option<f64>,
    pub last_time: Option<f64>,
}

impl SeriesStats {
    pub fn summary(&self) -> String {
        let span = match (self.first_time, self.last_time) {
            (Some(first), Some(last)) => format!("t={}..{}", first, last),
            _ => "empty".to_string(),
        };
        format!(
            "{} images, {} patches, {} of samples ({})",
            self.image_count,
            self.total_patches,
            format_bytes(self.sample_bytes),
            span,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageBuilder;
    use crate::io::{store_image, MemoryIOManager};
    use crate::mode::QuantityKind;
    use crate::types::Plane;
    use ndarray::Array2;

    fn snapshot(mode: i32, time: f64, value: f64) -> Image {
        ImageBuilder::new(QuantityKind::Displacement, Plane::Z)
            .mode(mode)
            .time(time)
            .patch(10.0, 0.0, 1, 1, Array2::from_elem((2, 2), value))
            .build()
            .unwrap()
    }

    #[test]
    fn test_divergent_range_is_symmetric() {
        let series = ImageSeries::from_images(vec![
            snapshot(1, 0.0, -1.0),
            snapshot(1, 1.0, 3.0),
        ]);
        assert_eq!(series.value_range(0).unwrap(), ValueRange::new(-3.0, 3.0));
        assert_eq!(series.times(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_sequential_range() {
        let series = ImageSeries::from_images(vec![
            snapshot(29, 0.0, 1.0),
            snapshot(29, 1.0, 3.0),
        ]);
        assert_eq!(series.value_range(0).unwrap(), ValueRange::new(1.0, 3.0));
    }

    #[test]
    fn test_nan_snapshot_spoils_range() {
        let series = ImageSeries::from_images(vec![
            snapshot(1, 0.0, f64::NAN),
            snapshot(1, 1.0, 3.0),
        ]);
        let range = series.value_range(0).unwrap();
        assert!(range.min.is_nan() && range.max.is_nan());
    }

    #[test]
    fn test_range_errors() {
        let empty = ImageSeries::default();
        assert!(matches!(empty.value_range(0), Err(FormatError::NotFound(_))));

        let series = ImageSeries::from_images(vec![snapshot(1, 0.0, 1.0)]);
        assert!(matches!(series.value_range(1), Err(FormatError::NotFound(_))));

        let unknown = ImageSeries::from_images(vec![snapshot(500, 0.0, 1.0)]);
        assert!(matches!(
            unknown.value_range(0),
            Err(FormatError::UnknownMode { code: 500, .. })
        ));
    }

    #[test]
    fn test_stats_summary() {
        let series = ImageSeries::from_images(vec![
            snapshot(1, 0.0, 1.0),
            snapshot(1, 0.5, 1.0),
        ]);
        let stats = series.stats();
        assert_eq!(stats.image_count, 2);
        assert_eq!(stats.total_patches, 2);
        assert_eq!(stats.sample_bytes, 2 * 4 * 4);
        assert_eq!(stats.summary(), "2 images, 2 patches, 32 B of samples (t=0..0.5)");
    }

    #[tokio::test]
    async fn test_load_preserves_order() {
        let io = MemoryIOManager::new();
        let names: Vec<String> = (0..4).map(|i| format!("run/t{}.sw4img", i)).collect();
        for (i, name) in names.iter().enumerate() {
            store_image(&io, name, &snapshot(1, i as f64, i as f64))
                .await
                .unwrap();
        }

        let options = ReadOptions::new().with_quantity_kind(QuantityKind::Displacement);
        let series = ImageSeries::load(&io, &names, &options, None).await.unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.times(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(series.value_range(0).unwrap(), ValueRange::new(-3.0, 3.0));
    }
}
