//! Constructors for collections and point-cloud items

use std::env;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use stac4d_core::models::{Asset, Collection, Extent, GeoBbox, Item};
use stac4d_store::fs::normalize;

/// Asset key of the point-cloud file on every item
pub const POINT_CLOUD_ASSET: &str = "point-cloud";

/// Build a collection with an optional initial extent
pub fn create_collection(
    id: &str,
    title: &str,
    description: &str,
    spatial_bounds: Option<GeoBbox>,
    temporal_range: Option<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)>,
    license: &str,
) -> Collection {
    let interval = temporal_range.map(|(start, end)| [start, end]);
    let mut collection = Collection::new(id, description, license, Extent::new(spatial_bounds, interval));
    collection.title = Some(title.to_string());
    collection
}

/// Build an item for one point-cloud file.
///
/// The geometry is the bbox polygon. The file is attached as the
/// `point-cloud` asset with role `data`. A relative local `href` is taken
/// relative to the working directory and stored as an absolute path, which
/// saving then rewrites relative to the item document.
pub fn create_point_cloud_item(
    id: &str,
    href: &str,
    bbox: GeoBbox,
    datetime: Option<DateTime<Utc>>,
    properties: Map<String, Value>,
    media_type: &str,
) -> Item {
    let mut item = Item::new(id);
    item.geometry = Some(bbox.to_polygon());
    item.bbox = Some(bbox);
    item.datetime = datetime;
    item.properties = properties;
    item.add_asset(POINT_CLOUD_ASSET, Asset::new(resolve_href(href)).media_type(media_type).role("data"));
    item
}

fn resolve_href(href: &str) -> String {
    if href.contains("://") || Path::new(href).is_absolute() {
        return href.to_string();
    }
    match env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(href)).to_string_lossy().into_owned(),
        Err(e) => {
            tracing::warn!(href, error = %e, "Cannot resolve relative asset href");
            href.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stac4d_core::models::COPC_MEDIA_TYPE;

    #[test]
    fn test_point_cloud_item() {
        let bbox = GeoBbox::new(11.30, 47.52, 11.32, 47.53).unwrap();
        let dt = Utc.with_ymd_and_hms(2024, 8, 12, 0, 0, 0).unwrap();
        let item = create_point_cloud_item(
            "Isar_20240812_UPH_10cm",
            "/data/Isar_20240812_UPH_10cm.copc.laz",
            bbox,
            Some(dt),
            Map::new(),
            COPC_MEDIA_TYPE,
        );

        let asset = &item.assets[POINT_CLOUD_ASSET];
        assert_eq!(asset.roles, vec!["data"]);
        assert_eq!(asset.media_type.as_deref(), Some(COPC_MEDIA_TYPE));
        assert_eq!(item.bbox, Some(bbox));

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["geometry"]["type"], "Polygon");
        assert_eq!(json["geometry"]["coordinates"][0].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_relative_href_is_anchored_to_working_directory() {
        let bbox = GeoBbox::new(11.30, 47.52, 11.32, 47.53).unwrap();
        let item = create_point_cloud_item(
            "Isar_20240812_ULS",
            "./data/../data/Isar_20240812_ULS.copc.laz",
            bbox,
            None,
            Map::new(),
            COPC_MEDIA_TYPE,
        );

        let expected = env::current_dir().unwrap().join("data").join("Isar_20240812_ULS.copc.laz");
        assert_eq!(item.assets[POINT_CLOUD_ASSET].href, expected.to_string_lossy());

        let remote = create_point_cloud_item(
            "remote",
            "https://example.org/Isar_20240812_ULS.copc.laz",
            bbox,
            None,
            Map::new(),
            COPC_MEDIA_TYPE,
        );
        assert_eq!(remote.assets[POINT_CLOUD_ASSET].href, "https://example.org/Isar_20240812_ULS.copc.laz");
    }

    #[test]
    fn test_collection_extent() {
        let start = Utc.with_ymd_and_hms(2024, 8, 12, 0, 0, 0).unwrap();
        let collection = create_collection(
            "uav-lidar",
            "UAV laser scanning",
            "ULS acquisitions over the Isar",
            None,
            Some((Some(start), None)),
            "CC-BY-4.0",
        );

        assert_eq!(collection.title.as_deref(), Some("UAV laser scanning"));
        assert!(collection.extent.bbox().is_none());
        assert_eq!(collection.extent.interval(), Some(&[Some(start), None]));
    }
}
