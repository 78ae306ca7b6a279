//! Storage backends and file-level image I/O

use crate::codec::{decode_image, encode_image, read_image, ReadOptions};
use crate::config::SimulationConfig;
use crate::error::{FormatError, Result};
use crate::format::IMAGE_EXTENSION;
use crate::image::Image;
use async_trait::async_trait;
use bytes::Bytes;
use log::{info, warn};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Storage backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Local file system
    FileSystem,
    /// Process memory
    Memory,
}

impl StorageBackend {
    /// Parse storage backend from URL scheme
    pub fn from_url(url: &str) -> Result<Self> {
        if let Some(scheme_end) = url.find("://") {
            let scheme = &url[..scheme_end];
            match scheme {
                "file" => Ok(StorageBackend::FileSystem),
                "mem" => Ok(StorageBackend::Memory),
                _ => Err(FormatError::InvalidUrl(format!("Unknown scheme: {}", scheme))),
            }
        } else {
            // Assume file system if no scheme
            Ok(StorageBackend::FileSystem)
        }
    }
}

/// Trait for byte-level access to wherever image files live
#[async_trait]
pub trait IOManager: Send + Sync {
    /// Read data from a path
    async fn read(&self, path: &str) -> Result<Bytes>;

    /// Write data to a path
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Check if a path exists
    async fn exists(&self, path: &str) -> Result<bool>;

    /// List items with a given prefix
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Get the size of data at a path
    async fn size(&self, path: &str) -> Result<usize>;

    /// Get the backend type
    fn backend(&self) -> StorageBackend;
}

/// File system I/O manager
pub struct FileSystemIOManager {
    base_path: PathBuf,
}

impl FileSystemIOManager {
    /// Create a new file system I/O manager
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the full path for a relative path
    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

#[async_trait]
impl IOManager for FileSystemIOManager {
    async fn read(&self, path: &str) -> Result<Bytes> {
        let data = fs::read(self.full_path(path)).await?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);

        // Create parent directories if they don't exist
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(path)).await?)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let full_path = self.full_path(prefix);
        let mut entries = Vec::new();

        if fs::metadata(&full_path).await?.is_dir() {
            let mut read_dir = fs::read_dir(&full_path).await?;
            while let Some(entry) = read_dir.next_entry().await? {
                if let Some(name) = entry.file_name().to_str() {
                    entries.push(name.to_string());
                }
            }
        }

        entries.sort();
        Ok(entries)
    }

    async fn size(&self, path: &str) -> Result<usize> {
        let metadata = fs::metadata(self.full_path(path)).await?;
        Ok(metadata.len() as usize)
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::FileSystem
    }
}

/// In-memory I/O manager, e.g. for synthetic image series
#[derive(Default)]
pub struct MemoryIOManager {
    objects: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryIOManager {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IOManager for MemoryIOManager {
    async fn read(&self, path: &str) -> Result<Bytes> {
        self.objects
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| FormatError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        self.objects
            .write()
            .insert(path.to_string(), Bytes::copy_from_slice(data));
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.objects.read().contains_key(path))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .objects
            .read()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn size(&self, path: &str) -> Result<usize> {
        self.objects
            .read()
            .get(path)
            .map(Bytes::len)
            .ok_or_else(|| FormatError::NotFound(path.to_string()))
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

/// Parse URL and create appropriate I/O manager
pub fn create_io_manager(url: &str) -> Result<Box<dyn IOManager>> {
    match StorageBackend::from_url(url)? {
        StorageBackend::FileSystem => {
            // Extract path from file:// URL or use as-is
            let path = url.strip_prefix("file://").unwrap_or(url);
            Ok(Box::new(FileSystemIOManager::new(path)))
        }
        StorageBackend::Memory => Ok(Box::new(MemoryIOManager::new())),
    }
}

fn has_image_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == IMAGE_EXTENSION)
}

fn check_extension(name: &str) {
    if !has_image_extension(name) {
        warn!(
            "Reading image from file with uncommon extension: '{}' (expected .{})",
            name, IMAGE_EXTENSION
        );
    }
}

/// Decode an image from a file, holding the file open only for the call
pub fn open_image(
    path: impl AsRef<Path>,
    options: &ReadOptions,
    config: Option<&dyn SimulationConfig>,
) -> Result<Image> {
    let path = path.as_ref();
    check_extension(&path.to_string_lossy());
    let image = {
        let file = File::open(path)?;
        read_image(BufReader::new(file), options, config)?
    };
    info!("Read {}: {}", path.display(), image.summary());
    Ok(image.with_filename(path))
}

/// Read and decode an image file asynchronously
pub async fn read_image_file(
    path: impl AsRef<Path>,
    options: &ReadOptions,
    config: Option<&dyn SimulationConfig>,
) -> Result<Image> {
    let path = path.as_ref();
    check_extension(&path.to_string_lossy());
    let data = fs::read(path).await?;
    let image = decode_image(Bytes::from(data), options, config)?;
    info!("Read {}: {}", path.display(), image.summary());
    Ok(image.with_filename(path))
}

/// Encode an image and write it to a file
pub async fn write_image_file(path: impl AsRef<Path>, image: &Image) -> Result<()> {
    let mut file = fs::File::create(path.as_ref()).await?;
    file.write_all(&encode_image(image)).await?;
    file.flush().await?;
    Ok(())
}

/// Load an image through an I/O manager
pub async fn load_image(
    io: &dyn IOManager,
    path: &str,
    options: &ReadOptions,
    config: Option<&dyn SimulationConfig>,
) -> Result<Image> {
    check_extension(path);
    let data = io.read(path).await?;
    let image = decode_image(data, options, config)?;
    info!("Loaded {}: {}", path, image.summary());
    Ok(image.with_filename(path))
}

/// Store an image through an I/O manager
pub async fn store_image(io: &dyn IOManager, path: &str, image: &Image) -> Result<()> {
    io.write(path, &encode_image(image)).await
}

/// Image files in a directory, sorted by name
pub async fn list_image_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let io = FileSystemIOManager::new(dir);
    Ok(io
        .list("")
        .await?
        .into_iter()
        .filter(|name| has_image_extension(name))
        .map(|name| dir.join(name))
        .collect())
}
