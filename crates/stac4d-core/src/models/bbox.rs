//! Native extents and geographic bounding boxes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, Stac4dError};

/// Axis-aligned extent in a source file's native coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NativeExtent {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl NativeExtent {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// The four corners of the rectangle, counter-clockwise from the minimum corner
    pub fn corners(&self) -> [[f64; 2]; 4] {
        [
            [self.min[0], self.min[1]],
            [self.min[0], self.max[1]],
            [self.max[0], self.max[1]],
            [self.max[0], self.min[1]],
        ]
    }
}

/// Bounding box in the canonical geographic frame (degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBbox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBbox {
    /// Create a bounding box, rejecting non-finite or inverted bounds
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        let values = [min_lon, min_lat, max_lon, max_lat];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Stac4dError::InvalidBbox {
                reason: format!("coordinates must be finite, got {:?}", values),
            });
        }
        if min_lon > max_lon || min_lat > max_lat {
            return Err(Stac4dError::InvalidBbox {
                reason: format!("minimum exceeds maximum in {:?}", values),
            });
        }
        Ok(Self { min_lon, min_lat, max_lon, max_lat })
    }

    pub fn from_array(values: [f64; 4]) -> Result<Self> {
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    /// Smallest box covering both
    pub fn union(&self, other: &GeoBbox) -> GeoBbox {
        GeoBbox {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// Closed polygon footprint of the box
    pub fn to_polygon(&self) -> geojson::Geometry {
        let ring = vec![
            vec![self.min_lon, self.min_lat],
            vec![self.min_lon, self.max_lat],
            vec![self.max_lon, self.max_lat],
            vec![self.max_lon, self.min_lat],
            vec![self.min_lon, self.min_lat],
        ];
        geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))
    }
}

impl Serialize for GeoBbox {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GeoBbox {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let values = <[f64; 4]>::deserialize(deserializer)?;
        GeoBbox::from_array(values).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_bounds() {
        assert!(GeoBbox::new(11.3, 47.5, 11.2, 47.6).is_err());
        assert!(GeoBbox::new(11.2, 47.6, 11.3, 47.5).is_err());
        assert!(GeoBbox::new(f64::NAN, 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_degenerate_box_is_valid() {
        let bbox = GeoBbox::new(11.3, 47.5, 11.3, 47.5).unwrap();
        assert_eq!(bbox.to_array(), [11.3, 47.5, 11.3, 47.5]);
    }

    #[test]
    fn test_union() {
        let a = GeoBbox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let b = GeoBbox::new(-1.0, 0.5, 0.5, 2.0).unwrap();
        let u = a.union(&b);
        assert_eq!(u.to_array(), [-1.0, 0.0, 1.0, 2.0]);
        assert_eq!(b.union(&a), u);
    }

    #[test]
    fn test_polygon_ring_is_closed() {
        let bbox = GeoBbox::new(11.30, 47.52, 11.32, 47.53).unwrap();
        let geometry = bbox.to_polygon();
        match geometry.value {
            geojson::Value::Polygon(rings) => {
                assert_eq!(rings.len(), 1);
                assert_eq!(rings[0].len(), 5);
                assert_eq!(rings[0].first(), rings[0].last());
            }
            other => panic!("Expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_serializes_as_array() {
        let bbox = GeoBbox::new(1.0, 2.0, 3.0, 4.0).unwrap();
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");
        let back: GeoBbox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bbox);
        assert!(serde_json::from_str::<GeoBbox>("[3.0,2.0,1.0,4.0]").is_err());
    }

    #[test]
    fn test_native_corners() {
        let extent = NativeExtent::new([0.0, 0.0], [2.0, 1.0]);
        assert_eq!(extent.corners(), [[0.0, 0.0], [0.0, 1.0], [2.0, 1.0], [2.0, 0.0]]);
    }
}
