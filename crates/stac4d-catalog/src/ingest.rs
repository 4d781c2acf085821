//! Turn point-cloud files into topo4d items

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Map;
use stac4d_core::config::LayeredConfig;
use stac4d_core::error::{Result, Stac4dError};
use stac4d_core::formats::{ReaderRegistry, SourceMetadata};
use stac4d_core::models::{Item, COPC_MEDIA_TYPE};
use stac4d_core::temporal::extract_acquisition_datetime;
use stac4d_ext::{DataType, Topo4dExtension, Topo4dProperties};
use stac4d_geo::{extract_bbox, BboxExtraction, BboxOptions};

use crate::builder::create_point_cloud_item;

/// Per-file settings for ingestion
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub bbox: BboxOptions,
    pub media_type: String,
    pub data_type: DataType,
    /// Used instead of the date in the file name when set
    pub datetime: Option<DateTime<Utc>>,
    pub sensor: Option<String>,
    pub acquisition_mode: Option<String>,
    pub timezone: Option<String>,
    pub spatial_resolution: Option<f64>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            bbox: BboxOptions::default(),
            media_type: COPC_MEDIA_TYPE.to_string(),
            data_type: DataType::PointCloud,
            datetime: None,
            sensor: None,
            acquisition_mode: None,
            timezone: None,
            spatial_resolution: None,
        }
    }
}

impl IngestOptions {
    /// Options with the target CRS, fallback and media type from configuration
    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        Ok(Self {
            bbox: BboxOptions::from_config(config)?,
            media_type: config.asset_media_type.value.clone(),
            ..Default::default()
        })
    }
}

/// An item built from one file, with what was read along the way
#[derive(Debug, Clone)]
pub struct IngestedItem {
    pub item: Item,
    pub source: SourceMetadata,
    pub extraction: BboxExtraction,
    pub path: PathBuf,
}

/// Progress of a batch ingestion
#[derive(Debug, Clone)]
pub struct IngestProgress {
    pub current: usize,
    pub total: usize,
    pub path: PathBuf,
}

/// Builds items from point-cloud files
pub struct Ingestor {
    registry: ReaderRegistry,
}

impl Ingestor {
    pub fn new() -> Self {
        Self { registry: ReaderRegistry::with_defaults() }
    }

    pub fn with_registry(registry: ReaderRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ReaderRegistry {
        &self.registry
    }

    /// Read one file and build its item.
    ///
    /// 1. Read the header (extent, CRS, point count)
    /// 2. Reproject the extent to a geographic bbox
    /// 3. Date the acquisition from the options or the file name
    /// 4. Build the item and apply the topo4d properties
    pub fn ingest(&self, path: &Path, options: &IngestOptions) -> Result<IngestedItem> {
        let path = fs::canonicalize(path).map_err(|e| Stac4dError::SourceFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let source = self.registry.read(&path)?;
        let extraction = extract_bbox(&source.extent, source.crs.as_deref(), &options.bbox)?;

        let datetime = options.datetime.or_else(|| extract_acquisition_datetime(&path));
        if datetime.is_none() {
            tracing::warn!(path = %path.display(), "No acquisition date in file name");
        }

        let id = item_id(&path)?;
        let href = path.to_string_lossy();
        let mut item = create_point_cloud_item(
            &id,
            &href,
            extraction.bbox,
            datetime,
            Map::new(),
            &options.media_type,
        );

        let mut properties = Topo4dProperties::new(options.data_type, extraction.native_crs.clone());
        properties.point_count = Some(source.point_count);
        properties.sensor = options.sensor.clone();
        properties.acquisition_mode = options.acquisition_mode.clone();
        properties.timezone = options.timezone.clone();
        properties.spatial_resolution = options.spatial_resolution;
        Topo4dExtension::ext(&mut item, true)?.apply(properties)?;

        tracing::info!(
            item = %id,
            points = source.point_count,
            crs = %extraction.native_crs,
            fallback = extraction.fallback_applied,
            "Ingested point cloud"
        );

        Ok(IngestedItem { item, source, extraction, path })
    }

    /// Ingest several files, reporting progress; one failure does not stop the batch
    pub fn ingest_all_with_progress<F>(
        &self,
        paths: &[PathBuf],
        options: &IngestOptions,
        mut progress: F,
    ) -> Vec<(PathBuf, Result<IngestedItem>)>
    where
        F: FnMut(IngestProgress),
    {
        paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                progress(IngestProgress { current: index + 1, total: paths.len(), path: path.clone() });
                (path.clone(), self.ingest(path, options))
            })
            .collect()
    }

    /// Point-cloud files directly inside `dir`, sorted by name
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && self.registry.is_supported(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

/// Item id: the file name up to its first `.`
pub fn item_id(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Stac4dError::SourceFile {
            path: path.to_path_buf(),
            reason: "Cannot derive an item id from the file name".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_stops_at_first_dot() {
        assert_eq!(item_id(Path::new("/d/Isar_20240812_UPH_10cm.copc.laz")).unwrap(), "Isar_20240812_UPH_10cm");
        assert_eq!(item_id(Path::new("scan.las")).unwrap(), "scan");
        assert!(item_id(Path::new("/d/.hidden.laz")).is_err());
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let err = Ingestor::new()
            .ingest(Path::new("/definitely/not/here_20240812.laz"), &IngestOptions::default())
            .unwrap_err();
        assert!(matches!(err, Stac4dError::SourceFile { .. }));
    }

    #[test]
    fn test_discover_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_20240812.copc.laz", "a_20240101.las", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let files = Ingestor::new().discover(dir.path()).unwrap();
        let names: Vec<_> =
            files.iter().map(|p| p.file_name().unwrap().to_str().unwrap().to_string()).collect();
        assert_eq!(names, vec!["a_20240101.las", "b_20240812.copc.laz"]);
    }
}
