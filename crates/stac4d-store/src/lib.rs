//! stac4d store - persistence of catalog trees
//!
//! [`CatalogStore`] is the port; [`FsCatalogStore`] writes a self-contained
//! STAC tree of JSON files and [`MemoryCatalogStore`] keeps a copy in memory.

pub mod fs;
pub mod memory;
pub mod ports;

pub use fs::FsCatalogStore;
pub use memory::MemoryCatalogStore;
pub use ports::CatalogStore;
