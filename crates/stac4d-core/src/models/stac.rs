//! Hierarchical STAC document model: catalog → collections → items → assets.
//!
//! The in-memory tree owns its children directly. Links are not maintained
//! while the tree is being assembled; the store regenerates them on save and
//! follows them on load.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::bbox::GeoBbox;
use crate::error::Stac4dError;

pub const STAC_VERSION: &str = "1.1.0";

/// Media type of cloud-optimized point clouds
pub const COPC_MEDIA_TYPE: &str = "application/vnd.laszip+copc";

/// Media type of STAC JSON documents
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Media type of GeoJSON documents (items)
pub const GEOJSON_MEDIA_TYPE: &str = "application/geo+json";

fn stac_version() -> String {
    STAC_VERSION.to_string()
}

/// Relationship link between STAC documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self { rel: rel.into(), href: href.into(), media_type: None, title: None }
    }

    pub fn json(mut self) -> Self {
        self.media_type = Some(JSON_MEDIA_TYPE.to_string());
        self
    }

    pub fn geojson(mut self) -> Self {
        self.media_type = Some(GEOJSON_MEDIA_TYPE.to_string());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A file referenced by an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl Asset {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into(), title: None, media_type: None, roles: Vec::new() }
    }

    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }
}

/// Spatial extent of a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<GeoBbox>,
}

/// Temporal extent of a collection; open ends are `None`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<DateTime<Utc>>; 2]>,
}

/// Spatial and temporal extent of a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

impl Extent {
    pub fn new(bbox: Option<GeoBbox>, interval: Option<[Option<DateTime<Utc>>; 2]>) -> Self {
        Self {
            spatial: SpatialExtent { bbox: bbox.into_iter().collect() },
            temporal: TemporalExtent { interval: interval.into_iter().collect() },
        }
    }

    /// Overall bounding box (first entry), if any
    pub fn bbox(&self) -> Option<&GeoBbox> {
        self.spatial.bbox.first()
    }

    /// Overall interval (first entry), if any
    pub fn interval(&self) -> Option<&[Option<DateTime<Utc>>; 2]> {
        self.temporal.interval.first()
    }
}

/// Root of a catalog tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Catalog")]
pub struct Catalog {
    #[serde(default = "stac_version")]
    pub stac_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stac_extensions: Vec<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(skip)]
    pub collections: Vec<Collection>,
    #[serde(skip)]
    pub items: Vec<Item>,
}

impl Catalog {
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            stac_version: stac_version(),
            stac_extensions: Vec::new(),
            id: id.into(),
            title: Some(title.into()),
            description: description.into(),
            links: Vec::new(),
            collections: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn collection_mut(&mut self, id: &str) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.id == id)
    }

    /// Every item in the tree, root-level items first
    pub fn all_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().chain(self.collections.iter().flat_map(|c| c.items.iter()))
    }
}

/// A group of related items with summary metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Collection")]
pub struct Collection {
    #[serde(default = "stac_version")]
    pub stac_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stac_extensions: Vec<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    pub license: String,
    pub extent: Extent,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub summaries: Map<String, Value>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(skip)]
    pub items: Vec<Item>,
}

impl Collection {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        license: impl Into<String>,
        extent: Extent,
    ) -> Self {
        Self {
            stac_version: stac_version(),
            stac_extensions: Vec::new(),
            id: id.into(),
            title: None,
            description: description.into(),
            license: license.into(),
            extent,
            summaries: Map::new(),
            links: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }
}

/// A single spatio-temporal record with its assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ItemDocument", try_from = "ItemDocument")]
pub struct Item {
    pub stac_version: String,
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub geometry: Option<geojson::Geometry>,
    pub bbox: Option<GeoBbox>,
    pub datetime: Option<DateTime<Utc>>,
    pub properties: Map<String, Value>,
    pub links: Vec<Link>,
    pub assets: BTreeMap<String, Asset>,
    pub collection: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            stac_version: stac_version(),
            stac_extensions: Vec::new(),
            id: id.into(),
            geometry: None,
            bbox: None,
            datetime: None,
            properties: Map::new(),
            links: Vec::new(),
            assets: BTreeMap::new(),
            collection: None,
        }
    }

    pub fn has_extension(&self, uri: &str) -> bool {
        self.stac_extensions.iter().any(|u| u == uri)
    }

    /// Add an asset under `key`, replacing any previous asset with that key
    pub fn add_asset(&mut self, key: impl Into<String>, asset: Asset) {
        self.assets.insert(key.into(), asset);
    }
}

/// On-disk GeoJSON Feature shape of an item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
struct ItemDocument {
    #[serde(default = "stac_version")]
    stac_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    stac_extensions: Vec<String>,
    id: String,
    geometry: Option<geojson::Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bbox: Option<GeoBbox>,
    properties: Map<String, Value>,
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default)]
    assets: BTreeMap<String, Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    collection: Option<String>,
}

impl From<Item> for ItemDocument {
    fn from(item: Item) -> Self {
        // STAC requires the datetime key, null when unknown
        let mut properties = Map::with_capacity(item.properties.len() + 1);
        properties.insert(
            "datetime".to_string(),
            item.datetime.map(|dt| Value::String(dt.to_rfc3339())).unwrap_or(Value::Null),
        );
        properties.extend(item.properties);

        ItemDocument {
            stac_version: item.stac_version,
            stac_extensions: item.stac_extensions,
            id: item.id,
            geometry: item.geometry,
            bbox: item.bbox,
            properties,
            links: item.links,
            assets: item.assets,
            collection: item.collection,
        }
    }
}

impl TryFrom<ItemDocument> for Item {
    type Error = Stac4dError;

    fn try_from(mut doc: ItemDocument) -> Result<Self, Self::Error> {
        let datetime = match doc.properties.remove("datetime") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(
                DateTime::parse_from_rfc3339(&s)
                    .map_err(|e| {
                        Stac4dError::Serialization(format!("Invalid item datetime '{}': {}", s, e))
                    })?
                    .with_timezone(&Utc),
            ),
            Some(other) => return Err(Stac4dError::type_mismatch("datetime", "string", other.to_string())),
        };

        Ok(Item {
            stac_version: doc.stac_version,
            stac_extensions: doc.stac_extensions,
            id: doc.id,
            geometry: doc.geometry,
            bbox: doc.bbox,
            datetime,
            properties: doc.properties,
            links: doc.links,
            assets: doc.assets,
            collection: doc.collection,
        })
    }
}
