//! Point-cloud source readers
//!
//! Each source format implements [`PointCloudReader`], returning the header
//! level metadata a catalog item needs. The [`ReaderRegistry`] picks a reader
//! by file extension.

use std::path::Path;

use crate::error::{Result, Stac4dError};
use crate::models::NativeExtent;

pub mod las;

pub use las::LasHeaderReader;

/// Reader trait that all point-cloud source formats implement
pub trait PointCloudReader {
    /// Read header metadata from the given path
    fn read(&self, path: &Path) -> Result<SourceMetadata>;

    /// Get supported file extensions (e.g., ["las", "laz"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name (e.g., "LAS")
    fn format_name(&self) -> &str;
}

/// Header metadata extracted from a point-cloud file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMetadata {
    /// Horizontal extent in native coordinates
    pub extent: NativeExtent,

    /// Vertical range `[min_z, max_z]`
    pub z_range: [f64; 2],

    /// CRS identifier embedded in the file (EPSG code or WKT), if any
    pub crs: Option<String>,

    /// Number of points
    pub point_count: u64,

    /// Format version, e.g. "1.4"
    pub version: Option<String>,
}

/// Central registry for point-cloud readers
pub struct ReaderRegistry {
    readers: Vec<Box<dyn PointCloudReader>>,
}

impl ReaderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { readers: Vec::new() }
    }

    /// Registry with every built-in reader
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(LasHeaderReader));
        registry
    }

    /// Register a reader
    pub fn register(&mut self, reader: Box<dyn PointCloudReader>) {
        self.readers.push(reader);
    }

    /// Detect format and return the matching reader.
    ///
    /// Only the final extension is considered, so `scan.copc.laz` is a `laz` file.
    pub fn detect_format(&self, path: &Path) -> Result<&dyn PointCloudReader> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| Stac4dError::SourceFile {
                path: path.to_path_buf(),
                reason: format!(
                    "File has no extension. Supported: {}",
                    self.supported_formats().join(", ")
                ),
            })?;

        self.readers
            .iter()
            .find(|r| r.supported_extensions().contains(&extension.as_str()))
            .map(|r| r.as_ref())
            .ok_or_else(|| Stac4dError::SourceFile {
                path: path.to_path_buf(),
                reason: format!(
                    "Unsupported extension '{}'. Supported: {}",
                    extension,
                    self.supported_formats().join(", ")
                ),
            })
    }

    /// Whether some registered reader handles this path
    pub fn is_supported(&self, path: &Path) -> bool {
        self.detect_format(path).is_ok()
    }

    /// Read a file with the reader matching its extension
    pub fn read(&self, path: &Path) -> Result<SourceMetadata> {
        self.detect_format(path)?.read(path)
    }

    /// Get list of all supported extensions
    pub fn supported_formats(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions())
            .map(|s| s.to_string())
            .collect()
    }

    /// Get all registered readers
    pub fn readers(&self) -> &[Box<dyn PointCloudReader>] {
        &self.readers
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
