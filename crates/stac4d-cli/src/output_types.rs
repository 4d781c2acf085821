use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

/// Output for init command
#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub catalog_path: String,
    pub id: String,
    pub title: String,
}

/// Output for collection command
#[derive(Debug, Serialize)]
pub struct CollectionOutput {
    pub id: String,
    pub title: String,
    pub license: String,
    pub path: String,
}

/// Output for add command
#[derive(Debug, Serialize)]
pub struct AddOutput {
    pub collection: Option<String>,
    pub added: Vec<AddedItem>,
    pub failed: Vec<FailedFile>,
    pub summary: Option<SummaryInfo>,
}

#[derive(Debug, Serialize)]
pub struct AddedItem {
    pub id: String,
    pub path: String,
    pub datetime: Option<DateTime<Utc>>,
    pub bbox: [f64; 4],
    pub native_crs: String,
    pub point_count: u64,
    pub crs_fallback_applied: bool,
}

#[derive(Debug, Serialize)]
pub struct FailedFile {
    pub path: String,
    pub error: String,
}

/// Collection summary as reported to users
#[derive(Debug, Serialize)]
pub struct SummaryInfo {
    pub item_count: u64,
    pub timestamp_list: Vec<String>,
    /// Mean interval between acquisitions, in seconds
    pub temporal_resolution: Option<f64>,
}

/// Output for inspect command
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub path: String,
    pub format: String,
    pub version: Option<String>,
    pub point_count: u64,
    pub native_crs: String,
    pub source_epsg: Option<u32>,
    pub native_bbox: [f64; 4],
    pub z_range: [f64; 2],
    pub bbox: [f64; 4],
    pub target_crs: String,
    pub crs_fallback_applied: bool,
    pub acquisition_date: Option<String>,
    pub item_id: String,
}

/// Output for status command
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub catalog_path: String,
    pub id: String,
    pub title: Option<String>,
    pub root_items: usize,
    pub collections: Vec<CollectionRow>,
}

/// One collection in the status table
#[derive(Debug, Serialize, Tabled)]
pub struct CollectionRow {
    #[tabled(rename = "Collection")]
    pub id: String,
    #[tabled(rename = "Items")]
    pub item_count: u64,
    #[tabled(rename = "First")]
    pub first: String,
    #[tabled(rename = "Last")]
    pub last: String,
    #[tabled(rename = "Resolution")]
    pub temporal_resolution: String,
}

/// One configuration value with its provenance
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
