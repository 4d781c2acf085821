//! stac4d geo - reprojection and geographic bounding boxes
//!
//! Turns the native extent of a point cloud into a WGS 84 bounding box,
//! reprojecting every corner of the extent through PROJ.

pub mod models;
pub mod transform;
pub mod validation;

pub use transform::{
    bbox_from_corners, extract_bbox, BboxExtraction, BboxOptions, IdentityReprojector,
    ProjReprojector, Reprojector,
};
pub use validation::{validate_geographic_bbox, ValidationResult};
