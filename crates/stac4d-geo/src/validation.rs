//! Range checks for geographic bounding boxes

use stac4d_core::models::GeoBbox;

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }
}

/// Check that a bbox lies within lon [-180, 180] and lat [-90, 90].
///
/// Coordinates outside these ranges usually mean projected values were
/// taken as degrees.
pub fn validate_geographic_bbox(bbox: &GeoBbox) -> ValidationResult {
    let mut result = ValidationResult::valid();

    for (name, value) in [("min_lon", bbox.min_lon), ("max_lon", bbox.max_lon)] {
        if !(-180.0..=180.0).contains(&value) {
            result.add_error(
                format!("bbox.{}", name),
                format!("Longitude {} is outside [-180, 180]", value),
            );
        }
    }

    for (name, value) in [("min_lat", bbox.min_lat), ("max_lat", bbox.max_lat)] {
        if !(-90.0..=90.0).contains(&value) {
            result.add_error(
                format!("bbox.{}", name),
                format!("Latitude {} is outside [-90, 90]", value),
            );
        }
    }

    result
}
