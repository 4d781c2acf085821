pub mod bbox;
pub mod crs;
pub mod stac;

pub use bbox::{GeoBbox, NativeExtent};
pub use crs::{CrsKind, CrsValue, ReferenceSystem};
pub use stac::{
    Asset, Catalog, Collection, Extent, Item, Link, SpatialExtent, TemporalExtent,
    COPC_MEDIA_TYPE, STAC_VERSION,
};
