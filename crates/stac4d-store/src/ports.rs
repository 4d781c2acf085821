use stac4d_core::error::Result;
use stac4d_core::models::Catalog;

/// Port for persisting a whole catalog tree
pub trait CatalogStore {
    /// Write the catalog with all collections and items
    fn save(&self, catalog: &Catalog) -> Result<()>;

    /// Read back a previously saved catalog
    fn load(&self) -> Result<Catalog>;

    /// Whether a catalog has been saved here
    fn exists(&self) -> bool;
}
