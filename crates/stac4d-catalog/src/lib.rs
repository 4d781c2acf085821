//! stac4d catalog - assembling point-cloud catalogs
//!
//! [`PcCatalog`] is the entry point: it creates or opens a catalog, attaches
//! collections and items, keeps collection summaries current and saves the
//! tree through a [`stac4d_store::CatalogStore`].

pub mod builder;
pub mod catalog;
pub mod ingest;
pub mod summary;

pub use builder::{create_collection, create_point_cloud_item, POINT_CLOUD_ASSET};
pub use catalog::{CatalogArgs, PcCatalog};
pub use ingest::{IngestOptions, IngestProgress, IngestedItem, Ingestor};
pub use summary::{on_item_attached, CollectionSummary};
