//! sw4image - SW4/WPP seismic simulation image reader
//!
//! A pure Rust reader for the binary image files written by the SW4 and WPP
//! wave-propagation codes: map views and cross-sections of the 3-D solution
//! at one simulation time.
//!
//! # Features
//!
//! - Sequential decoder for the packed header / patch header / sample layout
//! - 32- and 64-bit sample precision, kept as stored
//! - Patch extents and statistics computed once at decode time
//! - Mode registry for displacement- and velocity-type simulations
//! - Async file and storage-backend I/O, concurrent decoding of image series
//!
//! # Example
//!
//! ```rust,ignore
//! use sw4image::{read_image_file, QuantityKind, ReadOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ReadOptions::new().with_quantity_kind(QuantityKind::Velocity);
//! let image = read_image_file("run/image.cycle=100.z=0.ux.sw4img", &options, None).await?;
//!
//! for patch in image.patches() {
//!     println!("{:?} rms={}", patch.extent(), patch.rms());
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod image;
pub mod io;
pub mod metadata;
pub mod mode;
pub mod patch;
pub mod series;
pub mod types;
pub mod utils;

// Re-exports
pub use codec::{decode_image, encode_image, read_image, ImageReader, ReadOptions};
pub use config::{resolve_quantity_kind, SimulationConfig, StaticConfig};
pub use error::{FormatError, Result};
pub use image::{Image, ImageBuilder};
pub use io::{
    create_io_manager, list_image_files, open_image, read_image_file, write_image_file,
    IOManager, StorageBackend,
};
pub use metadata::{ImageSummary, PatchSummary};
pub use mode::{ColormapFamily, Quantity, QuantityKind};
pub use patch::{Patch, PatchData, PatchStats};
pub use series::ImageSeries;
pub use types::{ColorbarExtend, Extent, ImageType, Plane, Point3, Precision, ValueRange};

/// Version of the sw4image crate
pub const SW4IMAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!SW4IMAGE_VERSION.is_empty());
    }
}
