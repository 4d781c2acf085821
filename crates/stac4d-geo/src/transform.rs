//! Reprojection of native extents into geographic bounding boxes

use proj::Proj;
use stac4d_core::config::{CrsFallback, LayeredConfig};
use stac4d_core::error::{Result, Stac4dError};
use stac4d_core::models::{CrsValue, GeoBbox, NativeExtent, ReferenceSystem};

use crate::models::{envelope, rect_to_bbox};
use crate::validation::validate_geographic_bbox;

/// Maps a single coordinate pair from a source CRS to a target CRS
pub trait Reprojector {
    fn reproject(&self, x: f64, y: f64) -> Result<(f64, f64)>;
}

impl<F> Reprojector for F
where
    F: Fn(f64, f64) -> Result<(f64, f64)>,
{
    fn reproject(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        self(x, y)
    }
}

/// Leaves coordinates untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityReprojector;

impl Reprojector for IdentityReprojector {
    fn reproject(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        Ok((x, y))
    }
}

/// PROJ-backed reprojector.
///
/// Output axis order is normalised for visualisation, so geographic targets
/// yield `(lon, lat)` regardless of the authority's axis order.
pub struct ProjReprojector {
    proj: Proj,
    from: String,
    to: String,
}

impl ProjReprojector {
    pub fn new(from: &ReferenceSystem, to: &ReferenceSystem) -> Result<Self> {
        let proj = Proj::new_known_crs(from.definition(), to.definition(), None).map_err(|e| {
            Stac4dError::Reprojection {
                from: from.definition().to_string(),
                to: to.definition().to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self { proj, from: from.definition().to_string(), to: to.definition().to_string() })
    }
}

impl Reprojector for ProjReprojector {
    fn reproject(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        self.proj.convert((x, y)).map_err(|e| Stac4dError::Reprojection {
            from: self.from.clone(),
            to: self.to.clone(),
            reason: format!("({}, {}): {}", x, y, e),
        })
    }
}

/// Reproject all four corners of `extent` and take their envelope.
///
/// Under rotation or shear the opposite-corner pair alone does not bound
/// the extent, so every corner is transformed.
pub fn bbox_from_corners(extent: &NativeExtent, reprojector: &dyn Reprojector) -> Result<GeoBbox> {
    let corners = extent
        .corners()
        .iter()
        .map(|[x, y]| reprojector.reproject(*x, *y))
        .collect::<Result<Vec<_>>>()?;

    let rect = envelope(&corners)
        .ok_or_else(|| Stac4dError::InvalidBbox { reason: "extent has no corners".to_string() })?;
    rect_to_bbox(&rect)
}

/// Target CRS and fallback policy for bbox extraction
#[derive(Debug, Clone)]
pub struct BboxOptions {
    pub target: ReferenceSystem,
    pub fallback: CrsFallback,
}

impl BboxOptions {
    /// Options from the resolved configuration
    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        Ok(Self {
            target: ReferenceSystem::resolve(&config.target_crs.value)?,
            fallback: config.crs_fallback.value,
        })
    }
}

impl Default for BboxOptions {
    fn default() -> Self {
        Self { target: ReferenceSystem::wgs84(), fallback: CrsFallback::Geographic }
    }
}

/// Result of a bbox extraction
#[derive(Debug, Clone, PartialEq)]
pub struct BboxExtraction {
    pub bbox: GeoBbox,
    /// EPSG code of the source CRS when one could be determined
    pub source_epsg: Option<u32>,
    /// Source CRS as parsed; `Undefined` when missing or unresolvable
    pub native_crs: CrsValue,
    /// True when native coordinates were taken as geographic
    pub fallback_applied: bool,
}

/// Compute the geographic bbox of a native extent.
///
/// A resolvable source CRS is reprojected to `options.target`. A missing,
/// local or unresolvable one is handled by `options.fallback`.
pub fn extract_bbox(
    extent: &NativeExtent,
    source_crs: Option<&str>,
    options: &BboxOptions,
) -> Result<BboxExtraction> {
    let native_crs = match CrsValue::parse(source_crs) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Source CRS could not be resolved");
            CrsValue::Undefined
        }
    };

    if let CrsValue::Defined(source) = &native_crs {
        let bbox = if source.same_as(&options.target) {
            bbox_from_corners(extent, &IdentityReprojector)?
        } else {
            let reprojector = ProjReprojector::new(source, &options.target)?;
            bbox_from_corners(extent, &reprojector)?
        };

        tracing::debug!(
            from = %source.definition(),
            to = %options.target.definition(),
            bbox = ?bbox.to_array(),
            "Reprojected extent"
        );

        return Ok(BboxExtraction {
            bbox,
            source_epsg: source.epsg(),
            native_crs,
            fallback_applied: false,
        });
    }

    match options.fallback {
        CrsFallback::Reject => Err(Stac4dError::InvalidCrs {
            input: source_crs.map(str::to_string).unwrap_or_else(|| native_crs.to_string()),
        }),
        CrsFallback::Geographic => {
            tracing::warn!(
                crs = %native_crs,
                "No usable source CRS, treating native coordinates as geographic"
            );

            let bbox = bbox_from_corners(extent, &IdentityReprojector)?;
            let validation = validate_geographic_bbox(&bbox);
            for error in &validation.errors {
                tracing::warn!(location = %error.location, "{}", error.reason);
            }

            Ok(BboxExtraction { bbox, source_epsg: None, native_crs, fallback_applied: true })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rotate_45(x: f64, y: f64) -> Result<(f64, f64)> {
        let (s, c) = std::f64::consts::FRAC_PI_4.sin_cos();
        Ok((x * c - y * s, x * s + y * c))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-4, "{} != {}", actual, expected);
    }

    #[test]
    fn test_rotation_uses_all_corners() {
        let extent = NativeExtent::new([0.0, 0.0], [2.0, 1.0]);
        let bbox = bbox_from_corners(&extent, &rotate_45).unwrap();

        assert_close(bbox.min_lon, -0.7071);
        assert_close(bbox.max_lon, 1.4142);
        assert_close(bbox.min_lat, 0.0);
        assert_close(bbox.max_lat, 2.1213);

        // The diagonal pair alone would give [0, 0.7071] for x
        let (dx, _) = rotate_45(2.0, 1.0).unwrap();
        assert!(bbox.min_lon < 0.0);
        assert!(bbox.max_lon > dx);
    }

    #[test]
    fn test_reprojection_error_propagates() {
        let failing = |_x: f64, _y: f64| -> Result<(f64, f64)> {
            Err(Stac4dError::Reprojection {
                from: "a".to_string(),
                to: "b".to_string(),
                reason: "out of domain".to_string(),
            })
        };
        let extent = NativeExtent::new([0.0, 0.0], [1.0, 1.0]);
        assert!(matches!(
            bbox_from_corners(&extent, &failing),
            Err(Stac4dError::Reprojection { .. })
        ));
    }

    #[test]
    fn test_utm_extent_to_wgs84() {
        let extent = NativeExtent::new([673000.0, 5265000.0], [674000.0, 5266000.0]);
        let result = extract_bbox(&extent, Some("EPSG:32632"), &BboxOptions::default()).unwrap();

        assert!(!result.fallback_applied);
        assert_eq!(result.source_epsg, Some(32632));
        assert!(result.bbox.min_lon > 11.0 && result.bbox.max_lon < 11.6, "{:?}", result.bbox);
        assert!(result.bbox.min_lat > 47.3 && result.bbox.max_lat < 47.8, "{:?}", result.bbox);
        assert!(result.bbox.min_lon < result.bbox.max_lon);
    }

    #[test]
    fn test_same_crs_is_identity() {
        let extent = NativeExtent::new([11.2, 47.3], [11.6, 47.8]);
        let result = extract_bbox(&extent, Some("EPSG:4326"), &BboxOptions::default()).unwrap();
        assert_eq!(result.bbox.to_array(), [11.2, 47.3, 11.6, 47.8]);
        assert_eq!(result.source_epsg, Some(4326));
    }

    #[test]
    fn test_missing_crs_falls_back_to_geographic() {
        let extent = NativeExtent::new([11.2, 47.3], [11.6, 47.8]);
        let result = extract_bbox(&extent, None, &BboxOptions::default()).unwrap();

        assert!(result.fallback_applied);
        assert!(result.native_crs.is_undefined());
        assert_eq!(result.source_epsg, None);
        assert_eq!(result.bbox.to_array(), [11.2, 47.3, 11.6, 47.8]);
    }

    #[test]
    fn test_unresolvable_crs_falls_back() {
        let extent = NativeExtent::new([1.0, 2.0], [3.0, 4.0]);
        let result = extract_bbox(&extent, Some("EPSG:99999999"), &BboxOptions::default()).unwrap();
        assert!(result.fallback_applied);
    }

    #[test]
    fn test_reject_policy() {
        let options = BboxOptions { fallback: CrsFallback::Reject, ..Default::default() };
        let extent = NativeExtent::new([1.0, 2.0], [3.0, 4.0]);

        let err = extract_bbox(&extent, Some("local"), &options).unwrap_err();
        assert!(matches!(err, Stac4dError::InvalidCrs { ref input } if input == "local"));

        let err = extract_bbox(&extent, None, &options).unwrap_err();
        assert!(matches!(err, Stac4dError::InvalidCrs { ref input } if input == "Undefined"));
    }

    proptest! {
        #[test]
        fn identity_bbox_matches_extent(
            x in -1.0e6f64..1.0e6, y in -1.0e6f64..1.0e6,
            w in 0.0f64..1.0e4, h in 0.0f64..1.0e4,
        ) {
            let extent = NativeExtent::new([x, y], [x + w, y + h]);
            let bbox = bbox_from_corners(&extent, &IdentityReprojector).unwrap();
            prop_assert_eq!(bbox.to_array(), [x, y, x + w, y + h]);
        }

        #[test]
        fn rotated_bbox_bounds_every_corner(
            w in 0.1f64..100.0, h in 0.1f64..100.0,
        ) {
            let extent = NativeExtent::new([0.0, 0.0], [w, h]);
            let bbox = bbox_from_corners(&extent, &rotate_45).unwrap();
            for [cx, cy] in extent.corners() {
                let (x, y) = rotate_45(cx, cy).unwrap();
                prop_assert!(x >= bbox.min_lon && x <= bbox.max_lon);
                prop_assert!(y >= bbox.min_lat && y <= bbox.max_lat);
            }
        }
    }
}
