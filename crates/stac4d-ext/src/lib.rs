//! stac4d ext - the topo4d item extension
//!
//! topo4d describes how a 4D topographic observation was acquired and
//! processed: data type, native CRS, sensor, trajectory, registration and
//! product provenance. Properties live in the item's `properties` map under
//! the `topo4d:` prefix and may only be touched once the schema URI is
//! registered on the item.

pub mod data_type;
pub mod extension;
pub mod meta;
pub mod properties;
pub mod schema;

pub use data_type::DataType;
pub use extension::Topo4dExtension;
pub use meta::{ProductMeta, TrafoMeta};
pub use properties::Topo4dProperties;
pub use schema::{has_extension, register, FieldType, Topo4dField, PREFIX, SCHEMA_URI};
