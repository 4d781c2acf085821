//! Self-contained STAC tree on the filesystem.
//!
//! Layout under the store root:
//!
//! ```text
//! catalog.json
//! <collection>/collection.json
//! <collection>/<item>/<item>.json
//! <item>/<item>.json              (items attached to the catalog directly)
//! ```
//!
//! All links are relative, and local asset paths are rewritten relative to
//! the item file, so the tree can be moved as a whole.

use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use stac4d_core::error::{Result, Stac4dError};
use stac4d_core::models::{Catalog, Collection, Item, Link};

use crate::ports::CatalogStore;

pub const CATALOG_FILE: &str = "catalog.json";
pub const COLLECTION_FILE: &str = "collection.json";

/// Kind of STAC document in a saved tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Catalog,
    Collection,
    Item,
}

/// One document a save writes, with its path relative to the store root
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPath {
    pub kind: DocumentKind,
    pub id: String,
    pub path: PathBuf,
}

/// Every document [`FsCatalogStore::save`] writes for `catalog`, parents before children
pub fn document_paths(catalog: &Catalog) -> Vec<DocumentPath> {
    let item_path = |dir: &Path, item: &Item| dir.join(&item.id).join(format!("{}.json", item.id));

    let mut paths = vec![DocumentPath {
        kind: DocumentKind::Catalog,
        id: catalog.id.clone(),
        path: PathBuf::from(CATALOG_FILE),
    }];
    for collection in &catalog.collections {
        let dir = PathBuf::from(&collection.id);
        paths.push(DocumentPath {
            kind: DocumentKind::Collection,
            id: collection.id.clone(),
            path: dir.join(COLLECTION_FILE),
        });
        paths.extend(collection.items.iter().map(|item| DocumentPath {
            kind: DocumentKind::Item,
            id: item.id.clone(),
            path: item_path(&dir, item),
        }));
    }
    paths.extend(catalog.items.iter().map(|item| DocumentPath {
        kind: DocumentKind::Item,
        id: item.id.clone(),
        path: item_path(Path::new(""), item),
    }));
    paths
}

/// Catalog store writing JSON documents below a root directory
#[derive(Debug, Clone)]
pub struct FsCatalogStore {
    root: PathBuf,
}

impl FsCatalogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }

    fn absolute_root(&self) -> Result<PathBuf> {
        if self.root.is_absolute() {
            Ok(normalize(&self.root))
        } else {
            Ok(normalize(&env::current_dir()?.join(&self.root)))
        }
    }

    fn write_item(
        &self,
        item: &Item,
        parent_dir: &Path,
        root_href: &str,
        parent_href: &str,
        collection: Option<&str>,
    ) -> Result<()> {
        let dir = parent_dir.join(&item.id);
        let mut doc = item.clone();
        doc.collection = collection.map(str::to_string);
        doc.links = vec![Link::new("root", root_href).json(), Link::new("parent", parent_href).json()];
        if collection.is_some() {
            doc.links.push(Link::new("collection", parent_href).json());
        }
        for asset in doc.assets.values_mut() {
            asset.href = relative_href(&dir, &asset.href);
        }

        write_json(&dir.join(format!("{}.json", item.id)), &doc)
    }
}

impl CatalogStore for FsCatalogStore {
    fn save(&self, catalog: &Catalog) -> Result<()> {
        let root = self.absolute_root()?;

        if let Some(item) =
            catalog.items.iter().find(|i| catalog.collections.iter().any(|c| c.id == i.id))
        {
            // Both would be written to <root>/<id>/
            return Err(Stac4dError::DuplicateItem { id: item.id.clone() });
        }

        let mut doc = catalog.clone();
        doc.collections.clear();
        doc.items.clear();
        doc.links = vec![Link::new("root", format!("./{}", CATALOG_FILE)).json()];
        for collection in &catalog.collections {
            doc.links.push(
                Link::new("child", format!("./{}/{}", collection.id, COLLECTION_FILE))
                    .json()
                    .title(collection.title.clone().unwrap_or_else(|| collection.id.clone())),
            );
        }
        for item in &catalog.items {
            doc.links.push(Link::new("item", format!("./{0}/{0}.json", item.id)).geojson());
        }
        write_json(&root.join(CATALOG_FILE), &doc)?;

        for collection in &catalog.collections {
            let dir = root.join(&collection.id);
            let mut collection_doc = collection.clone();
            collection_doc.items.clear();
            collection_doc.links = vec![
                Link::new("root", format!("../{}", CATALOG_FILE)).json(),
                Link::new("parent", format!("../{}", CATALOG_FILE)).json(),
            ];
            for item in &collection.items {
                collection_doc
                    .links
                    .push(Link::new("item", format!("./{0}/{0}.json", item.id)).geojson());
            }
            write_json(&dir.join(COLLECTION_FILE), &collection_doc)?;

            for item in &collection.items {
                self.write_item(
                    item,
                    &dir,
                    &format!("../../{}", CATALOG_FILE),
                    &format!("../{}", COLLECTION_FILE),
                    Some(&collection.id),
                )?;
            }
        }

        let catalog_href = format!("../{}", CATALOG_FILE);
        for item in &catalog.items {
            self.write_item(item, &root, &catalog_href, &catalog_href, None)?;
        }

        tracing::info!(
            root = %root.display(),
            collections = catalog.collections.len(),
            items = catalog.all_items().count(),
            "Saved catalog"
        );
        Ok(())
    }

    fn load(&self) -> Result<Catalog> {
        let root = self.absolute_root()?;
        let mut catalog: Catalog = read_json(&root.join(CATALOG_FILE))?;

        for link in catalog.links.iter().filter(|l| l.rel == "child") {
            let path = normalize(&root.join(&link.href));
            let mut collection: Collection = read_json(&path)?;
            let dir = parent_of(&path);

            for item_link in collection.links.iter().filter(|l| l.rel == "item") {
                let item = read_item(&normalize(&dir.join(&item_link.href)))?;
                collection.items.push(item);
            }
            collection.links.clear();
            catalog.collections.push(collection);
        }

        for link in catalog.links.iter().filter(|l| l.rel == "item") {
            let item = read_item(&normalize(&root.join(&link.href)))?;
            catalog.items.push(item);
        }
        catalog.links.clear();

        tracing::debug!(
            root = %root.display(),
            collections = catalog.collections.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    fn exists(&self) -> bool {
        self.catalog_path().is_file()
    }
}

fn read_item(path: &Path) -> Result<Item> {
    let mut item: Item = read_json(path)?;
    let dir = parent_of(path);
    for asset in item.assets.values_mut() {
        if is_local_relative(&asset.href) {
            asset.href = normalize(&dir.join(&asset.href)).to_string_lossy().into_owned();
        }
    }
    item.links.clear();
    Ok(item)
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Stac4dError::SourceFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| Stac4dError::SourceFile {
        path: path.to_path_buf(),
        reason: format!("Invalid STAC JSON: {}", e),
    })
}

fn is_url(href: &str) -> bool {
    href.contains("://")
}

fn is_local_relative(href: &str) -> bool {
    !is_url(href) && !Path::new(href).is_absolute()
}

/// Rewrite an absolute local path relative to `from_dir`; URLs and relative hrefs pass through
fn relative_href(from_dir: &Path, href: &str) -> String {
    if is_url(href) || !Path::new(href).is_absolute() {
        return href.to_string();
    }
    match relative_path(from_dir, Path::new(href)) {
        Some(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
        None => href.to_string(),
    }
}

/// Lexically resolve `.` and `..` components
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path of `to` relative to directory `from`; `None` when they share no root
pub fn relative_path(from: &Path, to: &Path) -> Option<PathBuf> {
    let from = normalize(from);
    let to = normalize(to);
    let from_parts: Vec<_> = from.components().collect();
    let to_parts: Vec<_> = to.components().collect();

    let common = from_parts.iter().zip(&to_parts).take_while(|(a, b)| a == b).count();
    if common == 0 {
        return None;
    }

    let mut relative = PathBuf::new();
    for _ in common..from_parts.len() {
        relative.push("..");
    }
    for part in &to_parts[common..] {
        relative.push(part.as_os_str());
    }
    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stac4d_core::models::{Asset, Extent, GeoBbox, COPC_MEDIA_TYPE};

    fn sample_catalog(data_dir: &Path) -> Catalog {
        let mut catalog = Catalog::new("isar-uav", "Isar UAV", "Multi-sensor UAV observations");

        let mut collection = Collection::new(
            "uav-photogrammetry",
            "UAV photogrammetry",
            "CC-BY-4.0",
            Extent::new(Some(GeoBbox::new(11.30, 47.52, 11.32, 47.53).unwrap()), None),
        );
        let mut item = Item::new("Isar_20240812_UPH_10cm");
        item.datetime = Some(Utc.with_ymd_and_hms(2024, 8, 12, 0, 0, 0).unwrap());
        let asset_path = data_dir.join("Isar_20240812_UPH_10cm.copc.laz");
        item.add_asset(
            "point-cloud",
            Asset::new(asset_path.to_string_lossy()).media_type(COPC_MEDIA_TYPE).role("data"),
        );
        collection.items.push(item);
        collection.summaries.insert("topo4d:item_count".to_string(), 1.into());
        catalog.collections.push(collection);

        let mut loose = Item::new("nofile");
        loose.add_asset("remote", Asset::new("https://example.org/scan.laz"));
        catalog.items.push(loose);

        catalog
    }

    #[test]
    fn test_save_writes_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("catalog");
        let store = FsCatalogStore::new(&root);

        store.save(&sample_catalog(&dir.path().join("data"))).unwrap();

        assert!(store.exists());
        assert!(root.join("uav-photogrammetry/collection.json").is_file());
        assert!(root
            .join("uav-photogrammetry/Isar_20240812_UPH_10cm/Isar_20240812_UPH_10cm.json")
            .is_file());
        assert!(root.join("nofile/nofile.json").is_file());

        let catalog_json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(root.join(CATALOG_FILE)).unwrap()).unwrap();
        let hrefs: Vec<_> = catalog_json["links"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| (l["rel"].as_str().unwrap(), l["href"].as_str().unwrap()))
            .collect();
        assert!(hrefs.contains(&("child", "./uav-photogrammetry/collection.json")));
        assert!(hrefs.contains(&("item", "./nofile/nofile.json")));
    }

    #[test]
    fn test_document_paths_match_saved_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("catalog");
        let catalog = sample_catalog(&dir.path().join("data"));
        FsCatalogStore::new(&root).save(&catalog).unwrap();

        let paths = document_paths(&catalog);
        assert_eq!(paths.len(), 4);
        assert_eq!(paths[0].kind, DocumentKind::Catalog);
        assert_eq!(paths[1].path, Path::new("uav-photogrammetry").join(COLLECTION_FILE));
        assert_eq!(paths[3].path, Path::new("nofile").join("nofile.json"));
        for document in &paths {
            assert!(root.join(&document.path).is_file(), "{}", document.path.display());
        }
    }

    #[test]
    fn test_asset_hrefs_are_relative_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("catalog");
        FsCatalogStore::new(&root).save(&sample_catalog(&dir.path().join("data"))).unwrap();

        let item_path =
            root.join("uav-photogrammetry/Isar_20240812_UPH_10cm/Isar_20240812_UPH_10cm.json");
        let item: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(item_path).unwrap()).unwrap();

        assert_eq!(
            item["assets"]["point-cloud"]["href"],
            "../../../data/Isar_20240812_UPH_10cm.copc.laz"
        );
        assert_eq!(item["collection"], "uav-photogrammetry");
        assert_eq!(item["properties"]["datetime"], "2024-08-12T00:00:00+00:00");
    }

    #[test]
    fn test_load_restores_tree() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = FsCatalogStore::new(dir.path().join("catalog"));
        let original = sample_catalog(&data_dir);
        store.save(&original).unwrap();

        let loaded = store.load().unwrap();

        assert_eq!(loaded.id, "isar-uav");
        assert_eq!(loaded.collections.len(), 1);
        let collection = &loaded.collections[0];
        assert_eq!(collection.summaries["topo4d:item_count"], 1);
        let item = collection.item("Isar_20240812_UPH_10cm").unwrap();
        assert_eq!(
            Path::new(&item.assets["point-cloud"].href),
            data_dir.join("Isar_20240812_UPH_10cm.copc.laz")
        );
        assert_eq!(item.datetime, original.collections[0].items[0].datetime);
        assert_eq!(loaded.items[0].assets["remote"].href, "https://example.org/scan.laz");
        assert!(loaded.links.is_empty());
    }

    #[test]
    fn test_item_and_collection_id_clash() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = sample_catalog(dir.path());
        catalog.items.push(Item::new("uav-photogrammetry"));

        let err = FsCatalogStore::new(dir.path().join("catalog")).save(&catalog).unwrap_err();
        assert!(matches!(err, Stac4dError::DuplicateItem { .. }));
    }

    #[test]
    fn test_missing_catalog_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCatalogStore::new(dir.path());
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(Stac4dError::SourceFile { .. })));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/a/b/c"), Path::new("/a/d/e.laz")),
            Some(PathBuf::from("../../d/e.laz"))
        );
        assert_eq!(
            relative_path(Path::new("/a/b"), Path::new("/a/b/c.laz")),
            Some(PathBuf::from("c.laz"))
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/./../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }
}
