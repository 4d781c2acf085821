//! In-memory catalog store for tests and dry runs

use std::io;
use std::sync::{Arc, PoisonError, RwLock};

use stac4d_core::error::{Result, Stac4dError};
use stac4d_core::models::Catalog;

use crate::ports::CatalogStore;

/// Keeps the last saved catalog; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogStore {
    catalog: Arc<RwLock<Option<Catalog>>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn save(&self, catalog: &Catalog) -> Result<()> {
        let mut slot = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(catalog.clone());
        Ok(())
    }

    fn load(&self) -> Result<Catalog> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                Stac4dError::Io(io::Error::new(io::ErrorKind::NotFound, "no catalog saved in memory"))
            })
    }

    fn exists(&self) -> bool {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stac4d_core::models::Item;

    #[test]
    fn test_load_before_save_fails() {
        let store = MemoryCatalogStore::new();
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(Stac4dError::Io(_))));
    }

    #[test]
    fn test_save_keeps_children() {
        let store = MemoryCatalogStore::new();
        let mut catalog = Catalog::new("isar-uav", "Isar", "UAV observations");
        catalog.items.push(Item::new("Isar_20240812_UPH_10cm"));

        store.clone().save(&catalog).unwrap();

        assert!(store.exists());
        assert_eq!(store.load().unwrap(), catalog);
    }
}
