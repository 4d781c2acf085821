//! Catalog assembly: collections, items and their summaries

use std::path::{Path, PathBuf};

use stac4d_core::error::{Result, Stac4dError};
use stac4d_core::models::{Catalog, Collection, Item};
use stac4d_store::{CatalogStore, FsCatalogStore};

use crate::summary::{self, CollectionSummary};

/// How to obtain a catalog: create a new one or open a saved one.
///
/// Exactly one of `path` or (`id`, `title`, `description`) must be set.
#[derive(Debug, Clone, Default)]
pub struct CatalogArgs {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub path: Option<PathBuf>,
}

/// A point-cloud catalog under construction.
///
/// Every mutation validates first and only then changes the tree, so a
/// failed call leaves the catalog as it was.
#[derive(Debug, Clone)]
pub struct PcCatalog {
    catalog: Catalog,
}

impl PcCatalog {
    pub fn new(args: CatalogArgs) -> Result<Self> {
        let CatalogArgs { id, title, description, path } = args;
        let has_identity = id.is_some() || title.is_some() || description.is_some();

        match (path, has_identity) {
            (Some(path), false) => Self::open(path),
            (None, true) => match (id, title, description) {
                (Some(id), Some(title), Some(description)) => Self::create(&id, &title, &description),
                _ => Err(Stac4dError::InvalidCatalogArgs {
                    reason: "id, title and description must all be given".to_string(),
                }),
            },
            (Some(_), true) => Err(Stac4dError::InvalidCatalogArgs {
                reason: "path cannot be combined with id, title or description".to_string(),
            }),
            (None, false) => Err(Stac4dError::InvalidCatalogArgs {
                reason: "either a path or an id, title and description is required".to_string(),
            }),
        }
    }

    /// New empty catalog
    pub fn create(id: &str, title: &str, description: &str) -> Result<Self> {
        for (name, value) in [("id", id), ("title", title), ("description", description)] {
            if value.trim().is_empty() {
                return Err(Stac4dError::InvalidCatalogArgs { reason: format!("{} is empty", name) });
            }
        }
        Ok(Self { catalog: Catalog::new(id, title, description) })
    }

    /// Open a saved catalog from its directory or its `catalog.json`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = FsCatalogStore::new(store_root(path.as_ref()));
        Self::load_from(&store)
    }

    pub fn load_from(store: &dyn CatalogStore) -> Result<Self> {
        Ok(Self { catalog: store.load()? })
    }

    pub fn id(&self) -> &str {
        &self.catalog.id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn into_inner(self) -> Catalog {
        self.catalog
    }

    /// Attach a collection under the root.
    ///
    /// The summary written to the collection is `initial_summary` if given,
    /// otherwise one derived from the items the collection already holds.
    pub fn add_collection(
        &mut self,
        mut collection: Collection,
        initial_summary: Option<CollectionSummary>,
    ) -> Result<()> {
        validate_id(&collection.id)?;
        if self.catalog.collection(&collection.id).is_some() {
            return Err(Stac4dError::DuplicateCollection { id: collection.id });
        }

        let summary = match initial_summary {
            Some(summary) => summary,
            None => summary_of_items(&collection.items)?,
        };
        summary.write_to(&mut collection.summaries);

        tracing::info!(collection = %collection.id, items = summary.item_count(), "Added collection");
        self.catalog.collections.push(collection);
        Ok(())
    }

    /// Attach an item to a collection, or to the root when `collection_id` is `None`.
    ///
    /// Items joining a collection need a datetime and update its summary.
    pub fn add_item(&mut self, mut item: Item, collection_id: Option<&str>) -> Result<()> {
        validate_id(&item.id)?;
        let Some(collection_id) = collection_id else {
            if self.catalog.items.iter().any(|i| i.id == item.id) {
                return Err(Stac4dError::DuplicateItem { id: item.id });
            }
            item.collection = None;
            tracing::info!(item = %item.id, "Added item to catalog root");
            self.catalog.items.push(item);
            return Ok(());
        };

        let collection = self.catalog.collection_mut(collection_id).ok_or_else(|| {
            Stac4dError::CollectionNotFound { id: collection_id.to_string() }
        })?;

        let datetime = item.datetime.ok_or_else(|| Stac4dError::missing("datetime"))?;
        if collection.item(&item.id).is_some() {
            return Err(Stac4dError::DuplicateItem { id: item.id });
        }

        summary::on_item_attached(collection, datetime, item.bbox.as_ref())?;

        item.collection = Some(collection.id.clone());
        tracing::info!(item = %item.id, collection = %collection.id, "Added item");
        collection.items.push(item);
        Ok(())
    }

    /// Save as a self-contained tree rooted at `destination` (a directory or `catalog.json` path)
    pub fn save(&self, destination: impl AsRef<Path>) -> Result<()> {
        self.save_to(&FsCatalogStore::new(store_root(destination.as_ref())))
    }

    pub fn save_to(&self, store: &dyn CatalogStore) -> Result<()> {
        store.save(&self.catalog)
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.catalog.collection(id)
    }

    pub fn collections(&self) -> &[Collection] {
        &self.catalog.collections
    }

    /// Items attached directly to the root
    pub fn root_items(&self) -> &[Item] {
        &self.catalog.items
    }

    pub fn all_items(&self) -> impl Iterator<Item = &Item> {
        self.catalog.all_items()
    }

    pub fn summary(&self, collection_id: &str) -> Result<CollectionSummary> {
        let collection = self.collection(collection_id).ok_or_else(|| {
            Stac4dError::CollectionNotFound { id: collection_id.to_string() }
        })?;
        CollectionSummary::from_collection(collection)
    }
}

/// Directory holding `catalog.json` for a path naming either
pub fn store_root(path: &Path) -> PathBuf {
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    } else {
        path.to_path_buf()
    }
}

/// Collection and item ids name directories in a saved catalog, so they
/// must be a single, non-empty path segment.
fn validate_id(id: &str) -> Result<()> {
    let reason = if id.trim().is_empty() {
        "id is empty"
    } else if id == "." || id == ".." {
        "'.' and '..' are reserved path segments"
    } else if id.contains(['/', '\\']) {
        "id contains a path separator"
    } else {
        return Ok(());
    };
    Err(Stac4dError::InvalidId { id: id.to_string(), reason: reason.to_string() })
}

fn summary_of_items(items: &[Item]) -> Result<CollectionSummary> {
    let timestamps = items
        .iter()
        .map(|item| item.datetime.ok_or_else(|| Stac4dError::missing("datetime")))
        .collect::<Result<Vec<_>>>()?;
    Ok(CollectionSummary::from_timestamps(timestamps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stac4d_core::models::Extent;
    use stac4d_store::MemoryCatalogStore;

    fn catalog() -> PcCatalog {
        PcCatalog::create("isar-uav", "Isar UAV", "Multi-sensor UAV observations of the Isar").unwrap()
    }

    fn collection(id: &str) -> Collection {
        Collection::new(id, "test collection", "CC-BY-4.0", Extent::default())
    }

    fn dated_item(id: &str, day: u32) -> Item {
        let mut item = Item::new(id);
        item.datetime = Some(Utc.with_ymd_and_hms(2024, 8, day, 0, 0, 0).unwrap());
        item
    }

    #[test]
    fn test_args_are_mutually_exclusive() {
        let both = CatalogArgs {
            id: Some("isar".to_string()),
            path: Some(PathBuf::from("catalog.json")),
            ..Default::default()
        };
        assert!(matches!(PcCatalog::new(both), Err(Stac4dError::InvalidCatalogArgs { .. })));
        assert!(matches!(
            PcCatalog::new(CatalogArgs::default()),
            Err(Stac4dError::InvalidCatalogArgs { .. })
        ));

        let partial = CatalogArgs { id: Some("isar".to_string()), ..Default::default() };
        assert!(matches!(PcCatalog::new(partial), Err(Stac4dError::InvalidCatalogArgs { .. })));

        let full = CatalogArgs {
            id: Some("isar".to_string()),
            title: Some("Isar".to_string()),
            description: Some("UAV observations".to_string()),
            path: None,
        };
        assert_eq!(PcCatalog::new(full).unwrap().id(), "isar");
    }

    #[test]
    fn test_new_collection_gets_empty_summary() {
        let mut cat = catalog();
        cat.add_collection(collection("uav-lidar"), None).unwrap();

        let summary = cat.summary("uav-lidar").unwrap();
        assert_eq!(summary.item_count(), 0);
        assert!(summary.timestamp_list().is_empty());
        assert_eq!(summary.temporal_resolution(), None);
    }

    #[test]
    fn test_initial_summary_is_written() {
        let mut cat = catalog();
        let t = Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap();
        let initial = CollectionSummary::from_timestamps(vec![t]);
        cat.add_collection(collection("legacy"), Some(initial)).unwrap();

        cat.add_item(dated_item("scan", 12), Some("legacy")).unwrap();
        let summary = cat.summary("legacy").unwrap();
        assert_eq!(summary.item_count(), 2);
        assert_eq!(summary.timestamps().len(), 2);
    }

    #[test]
    fn test_inconsistent_initial_summary_is_rejected() {
        let t = Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            CollectionSummary::new(4, vec![t]),
            Err(Stac4dError::SummaryMismatch { item_count: 4, timestamps: 1 })
        ));
    }

    #[test]
    fn test_path_like_ids_are_rejected() {
        let mut cat = catalog();
        for id in ["", " ", ".", "..", "a/b", "a\\b", "../outside"] {
            let err = cat.add_collection(collection(id), None).unwrap_err();
            assert!(matches!(err, Stac4dError::InvalidId { .. }), "{:?}", id);
        }
        assert!(cat.collections().is_empty());

        cat.add_collection(collection("uav-lidar"), None).unwrap();
        let before = cat.catalog().clone();
        for target in [None, Some("uav-lidar")] {
            let err = cat.add_item(dated_item("../scan", 12), target).unwrap_err();
            assert!(matches!(err, Stac4dError::InvalidId { .. }));
        }
        assert_eq!(cat.catalog(), &before);
    }

    #[test]
    fn test_duplicate_collection_is_rejected() {
        let mut cat = catalog();
        cat.add_collection(collection("uav-lidar"), None).unwrap();
        let err = cat.add_collection(collection("uav-lidar"), None).unwrap_err();
        assert!(matches!(err, Stac4dError::DuplicateCollection { ref id } if id == "uav-lidar"));
        assert_eq!(cat.collections().len(), 1);
    }

    #[test]
    fn test_unknown_collection_leaves_tree_unchanged() {
        let mut cat = catalog();
        cat.add_collection(collection("uav-lidar"), None).unwrap();
        let before = cat.catalog().clone();

        let err = cat.add_item(dated_item("scan", 12), Some("nonexistent")).unwrap_err();
        assert!(matches!(err, Stac4dError::CollectionNotFound { ref id } if id == "nonexistent"));
        assert_eq!(cat.catalog(), &before);
    }

    #[test]
    fn test_undated_item_cannot_join_collection() {
        let mut cat = catalog();
        cat.add_collection(collection("uav-lidar"), None).unwrap();
        let before = cat.catalog().clone();

        let err = cat.add_item(Item::new("nofile"), Some("uav-lidar")).unwrap_err();
        assert!(matches!(err, Stac4dError::MissingRequiredProperty { ref name } if name == "datetime"));
        assert_eq!(cat.catalog(), &before);

        // The root accepts undated items
        cat.add_item(Item::new("nofile"), None).unwrap();
        assert_eq!(cat.root_items().len(), 1);
    }

    #[test]
    fn test_items_update_summary() {
        let mut cat = catalog();
        cat.add_collection(collection("uav-lidar"), None).unwrap();
        cat.add_item(dated_item("b", 14), Some("uav-lidar")).unwrap();
        cat.add_item(dated_item("a", 12), Some("uav-lidar")).unwrap();

        let summary = cat.summary("uav-lidar").unwrap();
        assert_eq!(summary.item_count(), 2);
        assert_eq!(summary.temporal_resolution(), Some(172800.0));
        assert_eq!(cat.collection("uav-lidar").unwrap().item("a").unwrap().collection.as_deref(), Some("uav-lidar"));
        assert_eq!(cat.all_items().count(), 2);
    }

    #[test]
    fn test_duplicate_item_in_collection() {
        let mut cat = catalog();
        cat.add_collection(collection("uav-lidar"), None).unwrap();
        cat.add_item(dated_item("scan", 12), Some("uav-lidar")).unwrap();

        let err = cat.add_item(dated_item("scan", 13), Some("uav-lidar")).unwrap_err();
        assert!(matches!(err, Stac4dError::DuplicateItem { .. }));
        assert_eq!(cat.summary("uav-lidar").unwrap().item_count(), 1);
    }

    #[test]
    fn test_root_items_skip_aggregation() {
        let mut cat = catalog();
        cat.add_collection(collection("uav-lidar"), None).unwrap();
        cat.add_item(dated_item("loose", 12), None).unwrap();

        assert_eq!(cat.summary("uav-lidar").unwrap().item_count(), 0);
        assert!(cat.root_items()[0].collection.is_none());
    }

    #[test]
    fn test_save_to_store() {
        let mut cat = catalog();
        cat.add_collection(collection("uav-lidar"), None).unwrap();
        cat.add_item(dated_item("scan", 12), Some("uav-lidar")).unwrap();

        let store = MemoryCatalogStore::new();
        cat.save_to(&store).unwrap();
        let reopened = PcCatalog::load_from(&store).unwrap();
        assert_eq!(reopened.summary("uav-lidar").unwrap().item_count(), 1);
    }

    #[test]
    fn test_store_root() {
        assert_eq!(store_root(Path::new("out/catalog.json")), PathBuf::from("out"));
        assert_eq!(store_root(Path::new("catalog.json")), PathBuf::from("."));
        assert_eq!(store_root(Path::new("out")), PathBuf::from("out"));
    }
}
