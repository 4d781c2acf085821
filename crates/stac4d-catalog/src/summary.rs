//! Running statistics kept on every collection.
//!
//! The summary is stored in the collection's `summaries` map so it is saved
//! and loaded with the collection. [`on_item_attached`] is the only code
//! path that mutates it after the collection has been added to a catalog.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use stac4d_core::error::{Result, Stac4dError};
use stac4d_core::models::{Collection, GeoBbox};

pub const ITEM_COUNT_KEY: &str = "topo4d:item_count";
pub const TIMESTAMP_LIST_KEY: &str = "topo4d:timestamp_list";
pub const TEMPORAL_RESOLUTION_KEY: &str = "topo4d:temporal_resolution";

/// Item count and acquisition timestamps of one collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSummary {
    item_count: u64,
    timestamps: Vec<DateTime<Utc>>,
}

impl CollectionSummary {
    /// Summary from explicit values; timestamps are sorted.
    ///
    /// Every counted item contributes one timestamp, so `item_count` must
    /// equal the number of timestamps.
    pub fn new(item_count: u64, mut timestamps: Vec<DateTime<Utc>>) -> Result<Self> {
        if item_count != timestamps.len() as u64 {
            return Err(Stac4dError::SummaryMismatch { item_count, timestamps: timestamps.len() });
        }
        timestamps.sort();
        Ok(Self { item_count, timestamps })
    }

    /// Summary of the given timestamps, one per item
    pub fn from_timestamps(timestamps: Vec<DateTime<Utc>>) -> Self {
        let mut summary = Self::default();
        for timestamp in timestamps {
            summary.record(timestamp);
        }
        summary
    }

    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Timestamps in ascending order, duplicates kept
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// RFC 3339 strings in ascending order
    pub fn timestamp_list(&self) -> Vec<String> {
        self.timestamps.iter().map(|t| t.to_rfc3339()).collect()
    }

    /// Mean gap between consecutive timestamps in seconds.
    ///
    /// `None` with fewer than two timestamps; zero is a real value (all
    /// acquisitions at the same instant).
    pub fn temporal_resolution(&self) -> Option<f64> {
        if self.timestamps.len() < 2 {
            return None;
        }
        let total: f64 = self
            .timestamps
            .windows(2)
            .map(|pair| seconds_between(pair[0], pair[1]))
            .sum();
        Some(total / (self.timestamps.len() - 1) as f64)
    }

    /// Record one more item
    pub fn record(&mut self, timestamp: DateTime<Utc>) {
        self.item_count += 1;
        self.timestamps.push(timestamp);
        // Stable re-sort; insertion order says nothing about acquisition order
        self.timestamps.sort();
    }

    /// Read the summary stored on a collection; missing keys read as empty
    pub fn from_collection(collection: &Collection) -> Result<Self> {
        let summaries = &collection.summaries;

        let item_count = match summaries.get(ITEM_COUNT_KEY) {
            None => 0,
            Some(value) => value.as_u64().ok_or_else(|| {
                Stac4dError::type_mismatch(ITEM_COUNT_KEY, "non-negative integer", value.to_string())
            })?,
        };

        let timestamps = match summaries.get(TIMESTAMP_LIST_KEY) {
            None => Vec::new(),
            Some(Value::Array(values)) => values
                .iter()
                .map(parse_timestamp)
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(Stac4dError::type_mismatch(TIMESTAMP_LIST_KEY, "array", other.to_string()))
            }
        };

        Self::new(item_count, timestamps)
    }

    /// Write the summary into `summaries`, removing the resolution when not computable
    pub fn write_to(&self, summaries: &mut Map<String, Value>) {
        summaries.insert(ITEM_COUNT_KEY.to_string(), Value::from(self.item_count));
        summaries.insert(
            TIMESTAMP_LIST_KEY.to_string(),
            Value::Array(self.timestamp_list().into_iter().map(Value::String).collect()),
        );
        match self.temporal_resolution() {
            Some(seconds) => {
                summaries.insert(TEMPORAL_RESOLUTION_KEY.to_string(), Value::from(seconds));
            }
            None => {
                summaries.remove(TEMPORAL_RESOLUTION_KEY);
            }
        }
    }
}

/// Exact to the microsecond; gaps too wide for that fall back to milliseconds
fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let delta = later - earlier;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1e6,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>> {
    let raw = value
        .as_str()
        .ok_or_else(|| Stac4dError::type_mismatch(TIMESTAMP_LIST_KEY, "string", value.to_string()))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Stac4dError::Serialization(format!("Invalid timestamp '{}': {}", raw, e)))
}

/// Update a collection after an item with `timestamp` (and optional bbox) joined it.
///
/// Increments the count, inserts the timestamp in order, recomputes the
/// resolution and widens the collection extent to cover the item.
pub fn on_item_attached(
    collection: &mut Collection,
    timestamp: DateTime<Utc>,
    bbox: Option<&GeoBbox>,
) -> Result<CollectionSummary> {
    let mut summary = CollectionSummary::from_collection(collection)?;
    summary.record(timestamp);
    summary.write_to(&mut collection.summaries);

    widen_extent(collection, timestamp, bbox);

    tracing::debug!(
        collection = %collection.id,
        items = summary.item_count(),
        resolution = ?summary.temporal_resolution(),
        "Updated collection summary"
    );
    Ok(summary)
}

fn widen_extent(collection: &mut Collection, timestamp: DateTime<Utc>, bbox: Option<&GeoBbox>) {
    let extent = &mut collection.extent;

    if let Some(bbox) = bbox {
        match extent.spatial.bbox.first_mut() {
            Some(overall) => *overall = overall.union(bbox),
            None => extent.spatial.bbox.push(*bbox),
        }
    }

    match extent.temporal.interval.first_mut() {
        Some([start, end]) => {
            // Open ends stay open
            if let Some(s) = start {
                if timestamp < *s {
                    *s = timestamp;
                }
            }
            if let Some(e) = end {
                if timestamp > *e {
                    *e = timestamp;
                }
            }
        }
        None => extent.temporal.interval.push([Some(timestamp), Some(timestamp)]),
    }
}
